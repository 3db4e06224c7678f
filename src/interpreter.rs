use crate::command::{ExitCode, Invocation};
use crate::env::Environment;
use crate::error::ParseError;
use crate::external;
use crate::parser::Parser;
use anyhow::Context;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;
use tracing::debug;

/// Exit code reported for lines that fail to parse, as POSIX shells do for syntax errors.
pub const PARSE_ERROR_EXIT_CODE: ExitCode = 2;

/// Exit code reported when a parsed command cannot be found or started.
pub const COMMAND_FAILED_EXIT_CODE: ExitCode = 127;

/// Map an error from [`Interpreter::run_line`] to the exit code a shell would report.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if err.downcast_ref::<ParseError>().is_some() {
        PARSE_ERROR_EXIT_CODE
    } else {
        COMMAND_FAILED_EXIT_CODE
    }
}

/// What to do with a line once it has been parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Print the parsed invocation.
    #[default]
    Describe,
    /// Spawn the command and wait for it.
    Execute,
}

/// Parses lines and describes or runs them against an [`Environment`].
///
/// Example
/// ```
/// use shell_line::{Environment, Interpreter, Parser};
/// let env: Environment = [("NAME", "world")].into_iter().collect();
/// let mut sh = Interpreter::new(Parser::default(), env);
/// let mut out = Vec::new();
/// let code = sh.run_line("greet \"hello $NAME\"", &mut out).unwrap();
/// assert_eq!(code, 0);
/// assert_eq!(String::from_utf8(out).unwrap(), "command  greet\narg[0]   hello world\n");
/// ```
pub struct Interpreter {
    parser: Parser,
    env: Environment,
    action: Action,
}

impl Interpreter {
    pub fn new(parser: Parser, env: Environment) -> Self {
        Self {
            parser,
            env,
            action: Action::default(),
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Parse `line` and describe it to `out` or execute it, depending on the action.
    ///
    /// Parse failures are returned as errors; the caller decides how to report them.
    pub fn run_line(&mut self, line: &str, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
        let invocation = self
            .parser
            .parse(line, &self.env)
            .with_context(|| format!("cannot parse {line:?}"))?;
        debug!(%invocation, "parsed");
        match self.action {
            Action::Describe => {
                describe(&invocation, out)?;
                Ok(0)
            }
            Action::Execute => external::run(&invocation, &self.env),
        }
    }

    /// Interactive loop reading lines with `rustyline` until EOF or Ctrl-C.
    ///
    /// Returns the exit code of the last line.
    pub fn repl(&mut self) -> rustyline::Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;
        let mut last_exit = 0;

        loop {
            match rl.readline("$ ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;
                    let mut stdout = std::io::stdout();
                    last_exit = match self.run_line(&line, &mut stdout) {
                        Ok(code) => code,
                        Err(err) => {
                            debug!(error = %format!("{err:#}"), "line failed");
                            eprintln!("shell_line: {err:#}");
                            exit_code_for(&err)
                        }
                    };
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(last_exit)
    }
}

/// Write one line per part of the invocation.
pub fn describe(invocation: &Invocation, out: &mut dyn Write) -> std::io::Result<()> {
    for assignment in &invocation.environment_assignments {
        writeln!(out, "env      {assignment}")?;
    }
    writeln!(out, "command  {}", invocation.command)?;
    for (i, arg) in invocation.arguments.iter().enumerate() {
        writeln!(out, "{:<9}{arg}", format!("arg[{i}]"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter() -> Interpreter {
        let env: Environment = [("HOME", "/home/ada")].into_iter().collect();
        Interpreter::new(Parser::default(), env)
    }

    #[test]
    fn describes_parsed_line() {
        let mut sh = interpreter();
        let mut out = Vec::new();
        let code = sh.run_line("LANG=C ls -l $HOME", &mut out).unwrap();
        assert_eq!(code, 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "env      LANG=C\ncommand  ls\narg[0]   -l\narg[1]   /home/ada\n"
        );
    }

    #[test]
    fn parse_errors_keep_their_kind() {
        let mut sh = interpreter();
        let err = sh.run_line("echo `id`", &mut Vec::new()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ParseError>(),
            Some(&ParseError::UnsupportedCharacter('`'))
        );
        assert!(format!("{err:#}").contains("unsupported character: `"));
        assert_eq!(exit_code_for(&err), PARSE_ERROR_EXIT_CODE);
    }

    #[test]
    fn expansion_uses_interpreter_environment() {
        let mut sh = interpreter();
        sh.env_mut().set_var("WHO", "me");
        let mut out = Vec::new();
        sh.run_line("hi $WHO", &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("arg[0]   me\n"));
        assert_eq!(sh.env().get_var("WHO").as_deref(), Some("me"));
    }

    #[test]
    #[cfg(unix)]
    fn executes_when_asked() {
        let mut sh = Interpreter::new(Parser::default(), Environment::new())
            .with_action(Action::Execute);
        let code = sh.run_line("sh -c 'exit 5'", &mut Vec::new()).unwrap();
        assert_eq!(code, 5);

        let err = sh.run_line("no-such-program-here", &mut Vec::new()).unwrap_err();
        assert_eq!(exit_code_for(&err), COMMAND_FAILED_EXIT_CODE);
    }
}
