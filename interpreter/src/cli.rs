use std::path::PathBuf;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "Interpret the Set language.")]
pub struct Cli {
    #[arg(help = "Path to file with source code; '.set' is appended if missing")]
    pub file: Option<PathBuf>,

    #[arg(short, long, help = "Source code given inline instead of a file")]
    pub code: Option<String>,

    #[arg(short, long, help = "Program input; read from stdin when absent")]
    pub input: Option<String>,

    #[arg(short, long, help = "Show parse errors")]
    pub debug: bool,

    #[arg(long, help = "Show parse errors and exit without running")]
    pub only_debug: bool,
}
