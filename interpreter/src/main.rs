use std::path::Path;
use std::sync::LazyLock;

use clap::Parser as _;
use cli::Cli;
use color_eyre::{eyre::Context as _, Result};

mod cli;
mod machine;

pub static ARGS: LazyLock<Cli> = LazyLock::new(Cli::parse);

fn main() -> Result<()> {
    color_eyre::install()?;

    let mut live = false;
    let source = match (&ARGS.code, &ARGS.file) {
        (Some(code), _) => code.clone().into_bytes(),
        (None, Some(path)) => read_source(path)?,
        (None, None) => {
            use std::io::{stdin, Read};

            println!("! Live mode. Press ^D to finish.");
            live = true;

            let mut source = Vec::new();
            stdin()
                .read_to_end(&mut source)
                .wrap_err("failed to read from stdin")?;

            source
        }
    };

    let parsed = parser::Parser::new(&source).parse();
    if ARGS.debug || ARGS.only_debug {
        for error in &parsed.errors {
            eprintln!("{error}");
        }
    }
    if ARGS.only_debug {
        return Ok(());
    }

    let input = match ARGS.input {
        Some(ref input) => input.clone(),
        None if live => String::new(),
        None => {
            use std::io::{stdin, Read};

            let mut input = String::new();
            stdin()
                .read_to_string(&mut input)
                .wrap_err("failed to read from stdin")?;

            input
        }
    };

    let mut machine = machine::Machine::new(parsed.statements);
    machine
        .run(&input, &mut std::io::stdout().lock())
        .wrap_err("failed to interpret")?;

    Ok(())
}

fn read_source(path: &Path) -> Result<Vec<u8>> {
    if path.is_file() {
        return std::fs::read(path).wrap_err("failed to read source file");
    }

    let mut with_suffix = path.as_os_str().to_owned();
    with_suffix.push(".set");

    std::fs::read(&with_suffix).wrap_err("source file does not exist")
}
