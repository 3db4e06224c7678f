//! Parse shell-like one-liners without a shell.
//!
//! A line such as `LANG=C grep -n "$PATTERN" 'my file'` is split into an
//! [`Invocation`]: the leading `NAME=value` environment assignments, the command
//! and its arguments. Only a small subset of shell syntax is understood: field
//! splitting, single and double quotes, backslash escapes, backslash-newline line
//! continuation and `$NAME` expansion. Anything that would need a real shell
//! (pipes, redirections, globbing, `$(...)`, `${...}` and so on) is rejected with
//! a [`ParseError`].
//!
//! Variable values come from a [`Lookup`]; [`parse_line`] uses the process
//! environment, [`parse_line_with`] takes any lookup, so tests stay deterministic.
//!
//! ```
//! use std::collections::HashMap;
//!
//! let vars = HashMap::from([("PATH".to_string(), "/bin".to_string())]);
//! let inv = shell_line::parse_line_with("X=1 echo $PATH $MISSING", &vars).unwrap();
//! assert_eq!(inv.environment_assignments, ["X=1"]);
//! assert_eq!(inv.command, "echo");
//! assert_eq!(inv.arguments, ["/bin", ""]);
//! ```

pub mod command;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
mod lexer;
mod parser;
mod scanner;

pub use command::{ExitCode, Invocation, quote};
pub use env::{Environment, Lookup, ProcessEnv, split_assignment};
pub use error::ParseError;
pub use interpreter::{
    Action, COMMAND_FAILED_EXIT_CODE, Interpreter, PARSE_ERROR_EXIT_CODE, describe, exit_code_for,
};
pub use parser::{Parser, ParserOptions, parse_line, parse_line_with};
