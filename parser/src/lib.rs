pub use error::{LineError, ParseError};
pub use statement::{Expr, Guard, Op, Statement, Target, Test};

use std::fmt::Display;

mod error;
mod statement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parser<'a> {
    contents: &'a [u8],
    idx: usize,
    line: usize,
    statements: Vec<Statement>,
    errors: Vec<LineError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parsed {
    pub statements: Vec<Statement>,
    pub errors: Vec<LineError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(i64),
    Byte(u8),
    Eof,
}

impl<'a> Parser<'a> {
    pub fn new(contents: &'a [u8]) -> Self {
        Self {
            contents,
            idx: 0,
            line: 0,
            statements: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Parsed {
        self.skip_blank();

        while self.idx < self.contents.len() {
            self.line += 1;

            match self.statement() {
                Ok(statement) => self.statements.push(statement),
                Err(error) => {
                    self.errors.push(LineError {
                        line: self.line,
                        error,
                    });
                    self.resynchronize();
                }
            }

            self.skip_blank();
        }

        Parsed {
            statements: self.statements,
            errors: self.errors,
        }
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        let guard = if self.peek() == Some(b'[') {
            self.idx += 1;

            Some(self.guard()?)
        } else {
            None
        };

        self.skip_ws();
        if !self.contents[self.idx..].starts_with(b"set") {
            let found = match self.peek() {
                Some(byte) => Token::Byte(byte),
                None => Token::Eof,
            };

            return Err(ParseError::ExpectedSet(found.to_string()));
        }
        self.idx += 3;

        let target = self.target()?;
        let value = self.value()?;

        Ok(Statement {
            guard,
            target,
            value,
        })
    }

    fn guard(&mut self) -> Result<Guard, ParseError> {
        let lhs = self.operand()?;
        let test = match self.token()? {
            Token::Byte(b'=') => Test::Equal,
            Token::Byte(b'/') => Test::NotEqual,
            token => return Err(ParseError::InvalidConditional(token.to_string())),
        };
        let rhs = self.operand()?;

        match self.token()? {
            Token::Byte(b']') => Ok(Guard { test, lhs, rhs }),
            token => Err(ParseError::UnclosedConditional(token.to_string())),
        }
    }

    fn target(&mut self) -> Result<Target, ParseError> {
        match self.token()? {
            Token::Number(_) => Err(ParseError::AssignToNumber),
            Token::Byte(byte @ (b'a'..=b'z' | b'A'..=b'Z')) => Ok(Target::Var(char::from(byte))),
            Token::Byte(b'?') => Ok(Target::Counter),
            Token::Byte(b'!') => Ok(Target::Output),
            token => Err(ParseError::UnexpectedToken(token.to_string())),
        }
    }

    fn value(&mut self) -> Result<Expr, ParseError> {
        self.skip_ws();
        if self.peek() != Some(b'(') {
            return match self.token()? {
                Token::Number(value) => Ok(Expr::Literal(value)),
                Token::Byte(byte @ (b'a'..=b'z' | b'A'..=b'Z')) => Ok(Expr::Var(char::from(byte))),
                Token::Byte(b'?') => Ok(Expr::Counter),
                Token::Byte(b'!') => Ok(Expr::Input),
                token => Err(ParseError::UnexpectedToken(token.to_string())),
            };
        }
        self.idx += 1;

        let lhs = self.operand()?;
        let op = match self.token()? {
            Token::Byte(b'+') => Op::Add,
            Token::Byte(b'-') => Op::Sub,
            token => return Err(ParseError::InvalidCombiner(token.to_string())),
        };
        let rhs = self.operand()?;

        match self.token()? {
            Token::Byte(b')') => Ok(Expr::Combine(op, Box::new(lhs), Box::new(rhs))),
            token => Err(ParseError::UnclosedCombiner(token.to_string())),
        }
    }

    fn operand(&mut self) -> Result<Expr, ParseError> {
        self.skip_ws();

        match self.next() {
            Some(byte @ b'0'..=b'9') => Ok(Expr::Literal(i64::from(byte - b'0'))),
            Some(byte @ (b'a'..=b'z' | b'A'..=b'Z')) => Ok(Expr::Var(char::from(byte))),
            Some(b'?') => Ok(Expr::Counter),
            Some(b'!') => Ok(Expr::Input),
            Some(byte) => Err(ParseError::UnexpectedToken(Token::Byte(byte).to_string())),
            None => Err(ParseError::UnexpectedToken(Token::Eof.to_string())),
        }
    }

    fn token(&mut self) -> Result<Token, ParseError> {
        self.skip_ws();

        let Some(byte) = self.peek() else {
            return Ok(Token::Eof);
        };

        if byte.is_ascii_digit() {
            let start = self.idx;
            while self.peek().is_some_and(|byte| byte.is_ascii_digit()) {
                self.idx += 1;
            }

            let digits: String = self.contents[start..self.idx]
                .iter()
                .map(|&byte| char::from(byte))
                .collect();

            return digits
                .parse()
                .map(Token::Number)
                .map_err(|_| ParseError::NumberTooLarge(digits));
        }

        self.idx += 1;

        Ok(Token::Byte(byte))
    }

    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t') = self.peek() {
            self.idx += 1;
        }
    }

    fn skip_blank(&mut self) {
        while let Some(byte) = self.peek() {
            match byte {
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c' => self.idx += 1,
                b'>' => {
                    self.idx += 1;
                    while !matches!(self.next(), Some(b'\n') | None) {}
                }
                _ => break,
            }
        }
    }

    // advances just past the next end-of-line, unless the failing token
    // already consumed it
    fn resynchronize(&mut self) {
        while self.idx < self.contents.len() {
            if self.idx > 0 && self.contents[self.idx - 1] == b'\n' {
                break;
            }

            self.idx += 1;
        }
    }

    fn next(&mut self) -> Option<u8> {
        let byte = self.peek();
        self.idx += 1;

        byte
    }

    fn peek(&mut self) -> Option<u8> {
        self.contents.get(self.idx).copied()
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Token::Number(value) => write!(f, "{value}"),
            Token::Byte(byte) => write!(f, "'{}'", char::from(byte).escape_default()),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assign(target: Target, value: Expr) -> Statement {
        Statement {
            guard: None,
            target,
            value,
        }
    }

    fn guarded(test: Test, lhs: Expr, rhs: Expr, target: Target, value: Expr) -> Statement {
        Statement {
            guard: Some(Guard { test, lhs, rhs }),
            target,
            value,
        }
    }

    fn combine(op: Op, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Combine(op, Box::new(lhs), Box::new(rhs))
    }

    macro_rules! test {
        ($name:ident, $input:expr => $statements:expr) => {
            #[test]
            fn $name() {
                let parsed = Parser::new($input).parse();
                let expected: &[Statement] = &$statements;

                assert!(parsed.errors.is_empty(), "unexpected errors: {:?}", parsed.errors);
                assert_eq!(parsed.statements, expected);
            }
        };
    }

    macro_rules! test_error {
        ($name:ident, $input:expr => $compiled:expr, $errors:expr) => {
            #[test]
            fn $name() {
                let parsed = Parser::new($input).parse();
                let expected: &[(usize, ParseError)] = &$errors;
                let errors: Vec<_> = parsed
                    .errors
                    .iter()
                    .map(|error| (error.line, error.error.clone()))
                    .collect();

                assert_eq!(parsed.statements.len(), $compiled);
                assert_eq!(errors, expected);
            }
        };
    }

    test!(parse_empty, b"" => []);
    test!(
        parse_assign_literal,
        b"set a 5" =>
        [assign(Target::Var('a'), Expr::Literal(5))]
    );
    test!(
        parse_multi_digit_literal,
        b"set a 123" =>
        [assign(Target::Var('a'), Expr::Literal(123))]
    );
    test!(
        parse_free_whitespace,
        b"  set\ta   9  " =>
        [assign(Target::Var('a'), Expr::Literal(9))]
    );
    test!(
        parse_counter_target,
        b"set ? 3" =>
        [assign(Target::Counter, Expr::Literal(3))]
    );
    test!(
        parse_output_target,
        b"set ! 72" =>
        [assign(Target::Output, Expr::Literal(72))]
    );
    test!(
        parse_input_value,
        b"set a !" =>
        [assign(Target::Var('a'), Expr::Input)]
    );
    test!(
        parse_counter_value,
        b"set a ?" =>
        [assign(Target::Var('a'), Expr::Counter)]
    );
    test!(
        parse_uppercase_variable,
        b"set a H" =>
        [assign(Target::Var('a'), Expr::Var('H'))]
    );
    test!(
        parse_combiner_add,
        b"set c (a+b)" =>
        [assign(Target::Var('c'), combine(Op::Add, Expr::Var('a'), Expr::Var('b')))]
    );
    test!(
        parse_combiner_sub_literals,
        b"set c (0-1)" =>
        [assign(Target::Var('c'), combine(Op::Sub, Expr::Literal(0), Expr::Literal(1)))]
    );
    test!(
        parse_combiner_special_operands,
        b"set c (!+?)" =>
        [assign(Target::Var('c'), combine(Op::Add, Expr::Input, Expr::Counter))]
    );
    test!(
        parse_guarded_equal,
        b"[a=b] set c 5" =>
        [guarded(
            Test::Equal,
            Expr::Var('a'),
            Expr::Var('b'),
            Target::Var('c'),
            Expr::Literal(5),
        )]
    );
    test!(
        parse_guarded_not_equal,
        b"[a/0] set ? 0" =>
        [guarded(
            Test::NotEqual,
            Expr::Var('a'),
            Expr::Literal(0),
            Target::Counter,
            Expr::Literal(0),
        )]
    );
    test!(
        parse_packed_statement,
        b"[a=0]set?3" =>
        [guarded(
            Test::Equal,
            Expr::Var('a'),
            Expr::Literal(0),
            Target::Counter,
            Expr::Literal(3),
        )]
    );
    test!(
        parse_comment_lines,
        b"> greet the reader\nset a 1\n> done" =>
        [assign(Target::Var('a'), Expr::Literal(1))]
    );
    test!(
        parse_adjacent_comments,
        b">one\n>two\nset a 1" =>
        [assign(Target::Var('a'), Expr::Literal(1))]
    );
    test!(
        parse_trailing_comment,
        b"set a 1 > note\nset b 2" =>
        [
            assign(Target::Var('a'), Expr::Literal(1)),
            assign(Target::Var('b'), Expr::Literal(2)),
        ]
    );
    test!(
        parse_two_statements_one_line,
        b"set a 1 set b 2" =>
        [
            assign(Target::Var('a'), Expr::Literal(1)),
            assign(Target::Var('b'), Expr::Literal(2)),
        ]
    );
    test!(
        parse_blank_lines,
        b"\n\n  \nset a 1\n\n" =>
        [assign(Target::Var('a'), Expr::Literal(1))]
    );

    test_error!(
        parse_fail_missing_set,
        b"a = 5" =>
        0, [(1, ParseError::ExpectedSet("'a'".into()))]
    );
    test_error!(
        parse_fail_assign_to_number,
        b"set 5 a" =>
        0, [(1, ParseError::AssignToNumber)]
    );
    test_error!(
        parse_fail_invalid_combiner,
        b"set a (b*c)" =>
        0, [(1, ParseError::InvalidCombiner("'*'".into()))]
    );
    test_error!(
        parse_fail_invalid_conditional,
        b"[a<b] set c 1" =>
        0, [(1, ParseError::InvalidConditional("'<'".into()))]
    );
    test_error!(
        parse_fail_unclosed_combiner,
        b"set a (b+c" =>
        0, [(1, ParseError::UnclosedCombiner("EOF".into()))]
    );
    test_error!(
        parse_fail_unclosed_conditional,
        b"[a=b set c 1" =>
        0, [(1, ParseError::UnclosedConditional("'s'".into()))]
    );
    test_error!(
        parse_fail_number_too_large,
        b"set a 99999999999999999999" =>
        0, [(1, ParseError::NumberTooLarge("99999999999999999999".into()))]
    );
    test_error!(
        parse_recovers_at_next_line,
        b"set a 1\nset 5 b\nset c 3" =>
        2, [(2, ParseError::AssignToNumber)]
    );
    test_error!(
        parse_reports_statement_ordinals,
        b"bogus\nset a 1\nbogus" =>
        1, [
            (1, ParseError::ExpectedSet("'b'".into())),
            (3, ParseError::ExpectedSet("'b'".into())),
        ]
    );

    #[test]
    fn statements_render_back_to_source() {
        let parsed = Parser::new(b"[a/b] set c (a+1)").parse();

        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.statements[0].to_string(), "[a/b] set c (a+1)");
    }

    #[test]
    fn line_errors_render_with_ordinal() {
        let parsed = Parser::new(b"set 5 a").parse();

        assert_eq!(
            parsed.errors[0].to_string(),
            "cannot assign to a number on line 1"
        );
    }
}
