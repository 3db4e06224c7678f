//! Field lexing: quoting, escaping and `$NAME` expansion for a single field.

use crate::env::Lookup;
use crate::error::ParseError;
use crate::parser::ParserOptions;
use crate::scanner::Scanner;
use tracing::trace;

/// Characters a backslash may escape outside of quotes.
const BARE_ESCAPES: &[char] = &[
    '|', '&', ';', '<', '>', '(', ')', '$', '`', '\\', '"', '\'', ' ', '\t', '\n', '*', '?', '[',
    '#', '~', '=', '%',
];

/// Characters a backslash escapes inside double quotes. Any other escaped
/// character keeps its backslash.
const QUOTED_ESCAPES: &[char] = &['$', '`', '"', '\\'];

/// Always rejected when unquoted and unescaped.
const METACHARACTERS: &[char] = &['|', '&', ';', '<', '>', '(', ')', '`'];

/// Rejected when unquoted and unescaped in strict mode.
const GLOB_CHARACTERS: &[char] = &['*', '?', '[', '#', '~'];

const SPECIAL_PARAMETERS: &[char] = &['@', '*', '#', '?', '-', '$', '!', '0'];

/// Where an escape was started, which decides its allow-list and the mode to return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EscapeContext {
    Bare,
    DoubleQuoted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Bare,
    SingleQuoted,
    DoubleQuoted,
    Escaped(EscapeContext),
}

/// True if `ch` may appear in an identifier; `first` selects the stricter rule
/// for the leading character.
fn is_identifier_char(ch: char, first: bool) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || (!first && ch.is_ascii_digit())
}

/// True if `name` is a valid variable name: `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => is_identifier_char(first, true) && chars.all(|c| is_identifier_char(c, false)),
        None => false,
    }
}

/// Turns the characters of a line into fields, one [`Lexer::parse_field`] call at a time.
pub(crate) struct Lexer<'a, L: Lookup + ?Sized> {
    scanner: Scanner,
    lookup: &'a L,
    options: ParserOptions,
    buffer: String,
}

impl<'a, L: Lookup + ?Sized> Lexer<'a, L> {
    pub(crate) fn new(line: &str, lookup: &'a L, options: ParserOptions) -> Self {
        Lexer {
            scanner: Scanner::new(line),
            lookup,
            options,
            buffer: String::new(),
        }
    }

    /// Consumes whitespace up to the next field.
    pub(crate) fn skip_whitespace(&mut self) {
        while let Some(ch) = self.scanner.next() {
            if !ch.is_whitespace() {
                self.scanner.backup();
                break;
            }
        }
    }

    pub(crate) fn at_end(&mut self) -> bool {
        self.scanner.peek().is_none()
    }

    pub(crate) fn ended_in_continuation(&self) -> bool {
        self.scanner.ended_in_continuation()
    }

    /// Scans one field starting at the cursor.
    pub(crate) fn parse_field(&mut self) -> Result<String, ParseError> {
        self.buffer.clear();
        self.lex_field()
    }

    /// Tries to read `NAME=` at the start of a field.
    ///
    /// On success the name is returned and the cursor sits on the first character
    /// of the value. Otherwise the characters already read stay in the field buffer
    /// and [`Lexer::finish_field`] completes the field from there.
    pub(crate) fn parse_assignment_name(&mut self) -> Option<String> {
        self.buffer.clear();
        while let Some(ch) = self.scanner.next() {
            if is_identifier_char(ch, self.buffer.is_empty()) {
                self.buffer.push(ch);
                continue;
            }
            if ch == '=' && !self.buffer.is_empty() {
                return Some(std::mem::take(&mut self.buffer));
            }
            self.scanner.backup();
            break;
        }
        None
    }

    /// Completes a field whose leading characters are already buffered.
    pub(crate) fn finish_field(&mut self) -> Result<String, ParseError> {
        self.lex_field()
    }

    fn lex_field(&mut self) -> Result<String, ParseError> {
        let mut mode = Mode::Bare;
        loop {
            let Some(ch) = self.scanner.next() else {
                return match mode {
                    Mode::Bare => Ok(std::mem::take(&mut self.buffer)),
                    Mode::SingleQuoted | Mode::DoubleQuoted | Mode::Escaped(_) => {
                        Err(ParseError::UnterminatedString)
                    }
                };
            };
            mode = match mode {
                Mode::Bare => match self.handle_bare(ch)? {
                    Some(next) => next,
                    None => return Ok(std::mem::take(&mut self.buffer)),
                },
                Mode::SingleQuoted => self.handle_single_quote(ch),
                Mode::DoubleQuoted => self.handle_double_quote(ch)?,
                Mode::Escaped(context) => self.handle_escape(ch, context)?,
            };
        }
    }

    /// Returns `None` when `ch` ends the field.
    fn handle_bare(&mut self, ch: char) -> Result<Option<Mode>, ParseError> {
        if ch.is_whitespace() {
            self.scanner.backup();
            return Ok(None);
        }
        let mode = match ch {
            '\'' => Mode::SingleQuoted,
            '"' => Mode::DoubleQuoted,
            '\\' => Mode::Escaped(EscapeContext::Bare),
            '$' if self.options.expand_variables => {
                self.parse_var_expr()?;
                Mode::Bare
            }
            c if self.is_forbidden(c) => return Err(ParseError::UnsupportedCharacter(c)),
            c => {
                self.buffer.push(c);
                Mode::Bare
            }
        };
        Ok(Some(mode))
    }

    fn is_forbidden(&self, ch: char) -> bool {
        METACHARACTERS.contains(&ch)
            || ch == '$'
            || (self.options.strict && GLOB_CHARACTERS.contains(&ch))
    }

    fn handle_single_quote(&mut self, ch: char) -> Mode {
        match ch {
            '\'' => Mode::Bare,
            c => {
                self.buffer.push(c);
                Mode::SingleQuoted
            }
        }
    }

    fn handle_double_quote(&mut self, ch: char) -> Result<Mode, ParseError> {
        match ch {
            '"' => Ok(Mode::Bare),
            '\\' => Ok(Mode::Escaped(EscapeContext::DoubleQuoted)),
            '`' => Err(ParseError::UnsupportedCharacterInString('`')),
            '$' if self.options.expand_variables => {
                self.parse_var_expr()?;
                Ok(Mode::DoubleQuoted)
            }
            '$' => Err(ParseError::UnsupportedCharacterInString('$')),
            c => {
                self.buffer.push(c);
                Ok(Mode::DoubleQuoted)
            }
        }
    }

    fn handle_escape(&mut self, ch: char, context: EscapeContext) -> Result<Mode, ParseError> {
        match context {
            EscapeContext::Bare => {
                if !BARE_ESCAPES.contains(&ch) {
                    return Err(ParseError::UnknownEscapeSequence(ch));
                }
                self.buffer.push(ch);
                Ok(Mode::Bare)
            }
            EscapeContext::DoubleQuoted => {
                if !QUOTED_ESCAPES.contains(&ch) {
                    self.buffer.push('\\');
                }
                self.buffer.push(ch);
                Ok(Mode::DoubleQuoted)
            }
        }
    }

    /// Expands the variable reference following a `$` into the field buffer.
    fn parse_var_expr(&mut self) -> Result<(), ParseError> {
        match self.scanner.peek() {
            Some('(') => return Err(ParseError::CommandSubstitutionOrArithmeticExpansionNotSupported),
            Some('{') => return Err(ParseError::ParameterExpansionNotSupported),
            Some(c) if SPECIAL_PARAMETERS.contains(&c) => {
                return Err(ParseError::SpecialParametersNotSupported(c));
            }
            Some(c @ '1'..='9') => return Err(ParseError::PositionalParametersNotSupported(c)),
            _ => {}
        }

        let name = self.scan_identifier();
        if name.is_empty() {
            self.buffer.push('$');
            return Ok(());
        }
        let value = self.lookup.lookup(&name);
        trace!(name = %name, set = value.is_some(), "expanding variable");
        if let Some(value) = value {
            self.buffer.push_str(&value);
        }
        Ok(())
    }

    fn scan_identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.scanner.next() {
            if !is_identifier_char(ch, name.is_empty()) {
                self.scanner.backup();
                break;
            }
            name.push(ch);
        }
        name
    }
}
