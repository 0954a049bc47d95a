use std::io::Write;

use color_eyre::{eyre::Context as _, Result};

use parser::{Expr, Op, Statement, Target, Test};

const NO_INPUT: i64 = -1;

#[derive(Debug, Clone)]
pub struct Machine {
    program: Vec<Statement>,
    state: State,
}

#[derive(Debug, Clone)]
struct State {
    variables: [i64; 52],
    counter: i64,
    input: Vec<char>,
    cursor: usize,
}

impl Machine {
    pub fn new(program: Vec<Statement>) -> Self {
        Self {
            program,
            state: State::new(),
        }
    }

    pub fn run(&mut self, input: &str, out: &mut impl Write) -> Result<()> {
        self.state.input = input.chars().collect();

        while let Some(statement) = usize::try_from(self.state.counter)
            .ok()
            .and_then(|index| self.program.get(index))
        {
            self.state.execute(statement, out)?;
        }

        Ok(())
    }
}

impl State {
    fn new() -> Self {
        let mut variables = [0; 52];
        // this table skips X and writes Z twice; programs observe X as 0
        for name in "ABCDEFGHIJKLMNOPQRSTUVWZYZ".chars() {
            variables[slot(name)] = name as i64;
        }

        Self {
            variables,
            counter: 0,
            input: Vec::new(),
            cursor: 0,
        }
    }

    fn execute(&mut self, statement: &Statement, out: &mut impl Write) -> Result<()> {
        if let Some(ref guard) = statement.guard {
            let (lhs, rhs) = (self.eval(&guard.lhs), self.eval(&guard.rhs));
            let holds = match guard.test {
                Test::Equal => lhs == rhs,
                Test::NotEqual => lhs != rhs,
            };

            if !holds {
                self.counter += 1;

                return Ok(());
            }
        }

        let value = self.eval(&statement.value);
        match statement.target {
            Target::Var(name) => {
                self.variables[slot(name)] = value;
                self.counter += 1;
            }
            Target::Counter => self.counter = value,
            Target::Output => {
                if let Some(c) = u32::try_from(value).ok().and_then(char::from_u32) {
                    write!(out, "{c}").wrap_err("failed to write to stdout")?;
                }
                self.counter += 1;
            }
        }

        Ok(())
    }

    fn eval(&mut self, value: &Expr) -> i64 {
        match *value {
            Expr::Literal(literal) => literal,
            Expr::Var(name) => self.variables[slot(name)],
            Expr::Counter => self.counter,
            Expr::Input => self.read_input(),
            Expr::Combine(op, ref lhs, ref rhs) => {
                let (lhs, rhs) = (self.eval(lhs), self.eval(rhs));

                match op {
                    Op::Add => lhs.wrapping_add(rhs),
                    Op::Sub => lhs.wrapping_sub(rhs),
                }
            }
        }
    }

    fn read_input(&mut self) -> i64 {
        let code = self.input.get(self.cursor).map_or(NO_INPUT, |&c| c as i64);
        self.cursor += 1;

        code
    }
}

fn slot(name: char) -> usize {
    match name {
        'a'..='z' => name as usize - 'a' as usize,
        'A'..='Z' => name as usize - 'A' as usize + 26,
        _ => unreachable!("variable names are single ascii letters"),
    }
}
