//! Character cursor over a single input line.

/// Cursor over the decoded characters of a line with a one-step pushback.
///
/// A backslash immediately followed by a newline is a line continuation: both
/// characters are dropped here, so the lexer above never sees them.
pub(crate) struct Scanner {
    input: Vec<char>,
    pos: usize,
    // Position before the last `next()`, present while a backup is allowed.
    prev: Option<usize>,
    dangling_continuation: bool,
}

impl Scanner {
    pub(crate) fn new(line: &str) -> Self {
        Scanner {
            input: line.chars().collect(),
            pos: 0,
            prev: None,
            dangling_continuation: false,
        }
    }

    /// Returns the next character, or `None` at end of input.
    pub(crate) fn next(&mut self) -> Option<char> {
        self.prev = Some(self.pos);
        while self.input.get(self.pos) == Some(&'\\') && self.input.get(self.pos + 1) == Some(&'\n')
        {
            self.pos += 2;
            if self.pos == self.input.len() {
                self.dangling_continuation = true;
            }
        }
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Rewinds the character returned by the last call to [`Scanner::next`].
    ///
    /// # Panics
    ///
    /// Panics when called twice without an intervening `next()`.
    pub(crate) fn backup(&mut self) {
        match self.prev.take() {
            Some(pos) => self.pos = pos,
            None => panic!("Scanner::backup called without a preceding next()"),
        }
    }

    pub(crate) fn peek(&mut self) -> Option<char> {
        let ch = self.next();
        self.backup();
        ch
    }

    /// True once a line continuation was found with nothing after it.
    pub(crate) fn ended_in_continuation(&self) -> bool {
        self.dangling_continuation
    }
}
