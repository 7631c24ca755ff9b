//! circular definition detection
use std::collections::HashSet;

/// Ledger of the keys currently being resolved
///
/// Every key on the current resolution path is "in flight" until [CycleGuard::leave] is called for it. Visiting an
/// in-flight key again means the key depends on itself.
#[derive(Debug, Default)]
pub struct CycleGuard {
    /// `(key, value)` in visit order
    path: Vec<(String, String)>,
    in_flight: HashSet<String>,
}

impl CycleGuard {
    pub fn visit(&mut self, key: &str, value: &str) -> Result<(), CycleError> {
        tracing::trace!(key, value, depth = self.path.len(), "visit");
        self.path.push((key.to_string(), value.to_string()));

        if !self.in_flight.insert(key.to_string()) {
            return Err(CycleError {
                key: key.to_string(),
                chain: self.path.clone(),
            });
        }

        Ok(())
    }

    /// Marks the resolution of `key` as complete
    pub fn leave(&mut self, key: &str) {
        if let Some(index) = self.path.iter().rposition(|(visited, _)| visited == key) {
            self.path.remove(index);
        }
        self.in_flight.remove(key);
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// A key was referenced while its own value was still being resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    key: String,
    chain: Vec<(String, String)>,
}

impl CycleError {
    /// The key that was visited twice
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Visited `(key, value)` pairs, ending with the repeated key
    pub fn chain(&self) -> &[(String, String)] {
        &self.chain
    }
}

impl std::error::Error for CycleError {}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Circular property definition: ")?;
        for (index, (key, value)) in self.chain.iter().enumerate() {
            if index > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn self_reference() {
        let mut guard = CycleGuard::default();
        guard.visit("p5", "${p5}").expect("first visit");

        let error = guard.visit("p5", "${p5}").expect_err("must error");
        assert_eq!(error.key(), "p5");
        assert_eq!(
            error.to_string(),
            "Circular property definition: p5=${p5} -> p5=${p5}"
        );
    }

    #[test]
    fn mutual_reference_names_second_visit() {
        let mut guard = CycleGuard::default();
        guard.visit("p6", "${p7}").expect("first visit");
        guard.visit("p7", "${p6}").expect("second visit");

        let error = guard.visit("p6", "${p7}").expect_err("must error");
        assert_eq!(error.key(), "p6");
        assert_eq!(
            error.to_string(),
            "Circular property definition: p6=${p7} -> p7=${p6} -> p6=${p7}"
        );
    }

    #[test]
    fn siblings_may_revisit() {
        let mut guard = CycleGuard::default();
        guard.visit("c", "${a}${a}").expect("root");

        guard.visit("a", "value").expect("first reference");
        guard.leave("a");
        guard.visit("a", "value").expect("second reference");
        guard.leave("a");

        assert_eq!(guard.depth(), 1);
    }

    #[test]
    fn leave_keeps_ancestors() {
        let mut guard = CycleGuard::default();
        guard.visit("a", "${b}").expect("a");
        guard.visit("b", "${c}").expect("b");
        guard.leave("b");

        let error = guard.visit("a", "${b}").expect_err("a is still in flight");
        assert_eq!(error.chain().len(), 2);
    }
}
