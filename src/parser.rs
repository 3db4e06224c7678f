use crate::command::Invocation;
use crate::env::{Lookup, ProcessEnv};
use crate::error::ParseError;
use crate::lexer::Lexer;
use tracing::debug;

/// Knobs controlling which constructs the parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Reject unquoted `*`, `?`, `[`, `#` and `~`, which a real shell would treat
    /// as glob, comment or tilde syntax.
    pub strict: bool,
    /// Expand `$NAME`. When disabled, an unescaped `$` is an error instead.
    pub expand_variables: bool,
}

impl ParserOptions {
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_expand_variables(mut self, expand: bool) -> Self {
        self.expand_variables = expand;
        self
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            strict: true,
            expand_variables: true,
        }
    }
}

/// Turns a line into an [`Invocation`].
///
/// The parser itself only holds configuration; all scanning state lives in the
/// call to [`Parser::parse`].
///
/// Example
/// ```
/// use shell_line::{Parser, ParserOptions};
/// use std::collections::HashMap;
///
/// let vars = HashMap::from([("USER".to_string(), "ada".to_string())]);
/// let parser = Parser::new(ParserOptions::default());
/// let inv = parser.parse("LANG=C greet \"$USER\" --loud", &vars).unwrap();
/// assert_eq!(inv.environment_assignments, ["LANG=C"]);
/// assert_eq!(inv.command, "greet");
/// assert_eq!(inv.arguments, ["ada", "--loud"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Parse `line`, resolving `$NAME` through `lookup`.
    ///
    /// Leading `NAME=value` fields become environment assignments until the first
    /// field that is not one; that field is the command and every later field is an
    /// argument, `=` or not.
    pub fn parse<L: Lookup + ?Sized>(
        &self,
        line: &str,
        lookup: &L,
    ) -> Result<Invocation, ParseError> {
        let mut lexer = Lexer::new(line, lookup, self.options);
        let mut environment_assignments = Vec::new();
        let mut command: Option<String> = None;
        let mut arguments = Vec::new();

        loop {
            lexer.skip_whitespace();
            if lexer.at_end() {
                break;
            }

            if command.is_some() {
                arguments.push(lexer.parse_field()?);
                continue;
            }

            match lexer.parse_assignment_name() {
                Some(name) => {
                    let value = lexer.parse_field()?;
                    debug!(name = %name, value = %value, "environment assignment");
                    environment_assignments.push(format!("{name}={value}"));
                }
                None => {
                    let field = lexer.finish_field()?;
                    if field.is_empty() {
                        return Err(ParseError::EmptyCommand);
                    }
                    debug!(command = %field, "command");
                    command = Some(field);
                }
            }
        }

        if lexer.ended_in_continuation() {
            return Err(ParseError::UnterminatedString);
        }
        let command = command.ok_or(ParseError::EmptyCommand)?;

        Ok(Invocation {
            command,
            arguments,
            environment_assignments,
        })
    }
}

/// Parse `line` with the default options, expanding variables from the process environment.
pub fn parse_line(line: &str) -> Result<Invocation, ParseError> {
    parse_line_with(line, &ProcessEnv)
}

/// Parse `line` with the default options, expanding variables through `lookup`.
pub fn parse_line_with<L: Lookup + ?Sized>(
    line: &str,
    lookup: &L,
) -> Result<Invocation, ParseError> {
    Parser::default().parse(line, lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(line: &str) -> Result<Invocation, ParseError> {
        let vars = HashMap::from([("PATH".to_string(), "/bin".to_string())]);
        parse_line_with(line, &vars)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn command_and_arguments() {
        let inv = parse("  ls   -l\t/tmp  ").unwrap();
        assert_eq!(inv.command, "ls");
        assert_eq!(inv.arguments, strings(&["-l", "/tmp"]));
        assert!(inv.environment_assignments.is_empty());
    }

    #[test]
    fn assignments_only_before_command() {
        let inv = parse("X=1 Y=2 echo Z=3").unwrap();
        assert_eq!(inv.environment_assignments, strings(&["X=1", "Y=2"]));
        assert_eq!(inv.command, "echo");
        assert_eq!(inv.arguments, strings(&["Z=3"]));
    }

    #[test]
    fn assignment_values_are_lexed() {
        let inv = parse("A='x y' B=\"$PATH:/usr/bin\" C= D=a=b env").unwrap();
        assert_eq!(
            inv.environment_assignments,
            strings(&["A=x y", "B=/bin:/usr/bin", "C=", "D=a=b"])
        );
        assert_eq!(inv.command, "env");
    }

    #[test]
    fn non_identifier_left_hand_sides_are_commands() {
        for line in ["1=1", "é=1", "-x=1", "'A'=1", "A\\=1", "=1"] {
            let inv = parse(line).unwrap();
            assert!(inv.environment_assignments.is_empty(), "{line}");
            assert!(inv.arguments.is_empty(), "{line}");
        }
        assert_eq!(parse("1=1").unwrap().command, "1=1");
        assert_eq!(parse("'A'=1").unwrap().command, "A=1");
    }

    #[test]
    fn identifier_prefix_without_equals_is_kept() {
        let inv = parse("abc'def' A=1").unwrap();
        assert_eq!(inv.command, "abcdef");
        assert_eq!(inv.arguments, strings(&["A=1"]));
    }

    #[test]
    fn empty_commands() {
        for line in ["", "   ", "\t\n", "A=1", "A=1 B=2  ", "''", "A=1 \"\" x", "$MISSING"] {
            assert_eq!(parse(line), Err(ParseError::EmptyCommand), "{line:?}");
        }
    }

    #[test]
    fn line_continuation() {
        let inv = parse("ec\\\nho foo\\\n bar").unwrap();
        assert_eq!(inv.command, "echo");
        assert_eq!(inv.arguments, strings(&["foo", "bar"]));
    }

    #[test]
    fn trailing_continuation_is_unterminated() {
        assert_eq!(parse("echo foo \\\n"), Err(ParseError::UnterminatedString));
        assert_eq!(parse("echo foo\\\n"), Err(ParseError::UnterminatedString));
    }

    #[test]
    fn errors_short_circuit() {
        assert_eq!(parse("echo ok; rm -rf /"), Err(ParseError::UnsupportedCharacter(';')));
        assert_eq!(
            parse("X=$(id) echo"),
            Err(ParseError::CommandSubstitutionOrArithmeticExpansionNotSupported)
        );
    }

    #[test]
    fn lenient_parser() {
        let parser = Parser::new(ParserOptions::default().with_strict(false));
        let inv = parser.parse("ls *.rs", &HashMap::<String, String>::new()).unwrap();
        assert_eq!(inv.arguments, strings(&["*.rs"]));
        assert!(!parser.options().strict);
    }
}
