//! working state of one expansion
use crate::scanner::{Scanner, START};
use std::collections::HashSet;

/// Text being expanded, split into a finished prefix and a tail that is still scanned
///
/// `resolved` only grows. `resolved + unresolved` is always the full text in progress.
#[derive(Debug, Default)]
pub(crate) struct ExpansionBuffer {
    resolved: String,
    unresolved: String,
}

impl ExpansionBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            resolved: String::new(),
            unresolved: text.into(),
        }
    }

    pub fn unresolved(&self) -> &str {
        &self.unresolved
    }

    /// Replaces every occurrence of `placeholder` in the tail
    pub fn replace_all(&mut self, placeholder: &str, value: &str) {
        self.unresolved = self.unresolved.replace(placeholder, value);
    }

    /// Moves everything that can no longer change into `resolved`
    ///
    /// That is the text in front of the first `${`, and a leading placeholder that is known to stay unresolved.
    /// A `$` directly in front of the first `${` stays in the tail, a substitution may turn it into a new `${`.
    pub fn advance(&mut self, scanner: &Scanner, settled: &HashSet<String>) {
        loop {
            let Some(start) = self.unresolved.find(START) else {
                let rest = std::mem::take(&mut self.unresolved);
                self.resolved.push_str(&rest);
                return;
            };

            if start > 0 {
                if self.unresolved[..start].ends_with('$') {
                    self.freeze(start - 1);
                    return;
                }
                self.freeze(start);
            }

            let Some(leading) = scanner
                .spans(&self.unresolved)
                .find(|span| span.start() == 0)
            else {
                return;
            };

            if !settled.contains(leading.text(&self.unresolved)) {
                return;
            }

            self.freeze(leading.end());
        }
    }

    fn freeze(&mut self, len: usize) {
        self.resolved.extend(self.unresolved.drain(..len));
    }

    pub fn into_string(mut self) -> String {
        self.resolved.push_str(&self.unresolved);
        self.resolved
    }
}
