use crate::lexer::is_identifier;
use std::collections::HashMap;
use std::env as stdenv;

/// Split `NAME=value` into its parts, provided `NAME` is a valid variable name.
pub fn split_assignment(assignment: &str) -> Option<(&str, &str)> {
    assignment
        .split_once('=')
        .filter(|(name, _)| is_identifier(name))
}

/// Read-only source of values for `$NAME` expansion.
///
/// The parser never writes through a lookup. A name that resolves to `None`
/// expands to the empty string.
pub trait Lookup {
    /// Resolve `name` to its value, if set.
    fn lookup(&self, name: &str) -> Option<String>;
}

impl<F> Lookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self(name)
    }
}

impl Lookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Lookup that reads the ambient process environment on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        stdenv::var(name).ok()
    }
}

/// Snapshot of environment variables used to expand lines and to launch commands.
///
/// Variables set through [`Environment::set_var`] shadow the ones captured from
/// the process.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment.
    pub fn new() -> Self {
        Self {
            vars: stdenv::vars().collect(),
        }
    }

    /// An environment with no variables at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the value of an environment variable.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override an environment variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Apply `NAME=value` assignments in order; later ones override earlier ones.
    ///
    /// Entries without `=` are ignored.
    pub fn apply_assignments<S: AsRef<str>>(&mut self, assignments: &[S]) {
        for assignment in assignments {
            if let Some((name, value)) = assignment.as_ref().split_once('=') {
                self.set_var(name, value);
            }
        }
    }
}

impl Lookup for Environment {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get_var(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
