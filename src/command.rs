use std::borrow::Cow;
use std::fmt;
use std::process::Command;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// The result of parsing a line: what to run, with which arguments and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path. Never empty.
    pub command: String,
    /// Arguments in order, not including the command itself.
    pub arguments: Vec<String>,
    /// Leading `NAME=value` assignments, in the order they appeared.
    pub environment_assignments: Vec<String>,
}

impl Invocation {
    /// Assignments split into `(name, value)` pairs.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.environment_assignments
            .iter()
            .filter_map(|a| a.split_once('='))
    }

    /// Build a [`Command`] running this invocation.
    ///
    /// The child inherits the process environment with the assignments applied on
    /// top, in order, so a later assignment to the same name wins.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.arguments);
        for (name, value) in self.assignments() {
            cmd.env(name, value);
        }
        cmd
    }

    /// Render the invocation back into a line that parses to an equal value.
    ///
    /// Expansion is not reversed: values are rendered literally, so the result
    /// parses back the same under any lookup.
    pub fn to_line(&self) -> String {
        let mut words =
            Vec::with_capacity(self.environment_assignments.len() + self.arguments.len() + 1);
        for (name, value) in self.assignments() {
            words.push(format!("{name}={}", quote(value)));
        }
        words.push(quote_command(&self.command).into_owned());
        words.extend(self.arguments.iter().map(|arg| quote(arg).into_owned()));
        words.join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

fn is_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(ch, '-' | '_' | '.' | '/' | ':' | ',' | '+' | '@' | '%' | '=')
}

/// Quote a single field so that the parser reads it back unchanged.
///
/// Fields made only of safe characters are returned as is; anything else is
/// wrapped in single quotes, with embedded single quotes written as `'\''`.
/// A backslash directly followed by a newline gets an empty `''` between the two,
/// so the pair is not read back as a line continuation.
pub fn quote(field: &str) -> Cow<'_, str> {
    if !field.is_empty() && field.chars().all(is_safe) {
        return Cow::Borrowed(field);
    }
    Cow::Owned(single_quote(field))
}

fn single_quote(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    out.push('\'');
    let mut chars = field.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' => out.push_str("'\\''"),
            '\\' if chars.peek() == Some(&'\n') => out.push_str("\\''"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

// A bare `NAME=...` in command position would be read back as an assignment.
fn quote_command(command: &str) -> Cow<'_, str> {
    if command.contains('=') {
        Cow::Owned(single_quote(command))
    } else {
        quote(command)
    }
}
