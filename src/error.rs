use thiserror::Error;

/// Errors that can occur while turning a line into an [`Invocation`](crate::Invocation).
///
/// Every error stops parsing immediately; no partial descriptor is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line held only whitespace and/or assignments, or the command field was empty.
    #[error("empty command")]
    EmptyCommand,
    /// A backslash was followed by a character outside the allow-list for its context.
    #[error("unknown escape sequence: \\{0}")]
    UnknownEscapeSequence(char),
    /// A quote was opened but never closed, or the line ended mid-escape.
    #[error("string not terminated")]
    UnterminatedString,
    /// A shell metacharacter appeared unescaped and unquoted.
    #[error("unsupported character: {0}")]
    UnsupportedCharacter(char),
    /// A forbidden character appeared inside a double-quoted string.
    #[error("unsupported character in string: {0}")]
    UnsupportedCharacterInString(char),
    /// `$(...)` or `$((...))`.
    #[error("command substitution and arithmetic expansion are not supported")]
    CommandSubstitutionOrArithmeticExpansionNotSupported,
    /// `${...}`.
    #[error("parameter expansion is not supported")]
    ParameterExpansionNotSupported,
    /// `$@`, `$*`, `$#`, `$?`, `$-`, `$$`, `$!` or `$0`.
    #[error("special parameters are not supported: ${0}")]
    SpecialParametersNotSupported(char),
    /// `$1` through `$9`.
    #[error("positional parameters are not supported: ${0}")]
    PositionalParametersNotSupported(char),
}
