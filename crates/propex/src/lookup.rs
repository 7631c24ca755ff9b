//! where placeholder values come from
use crate::property_store::PropertyStore;
use indexmap::IndexMap;

/// Keys with this prefix may be answered by the [Environment]
pub const ENV_PREFIX: &str = "env.";

/// Read-only view of environment variables
#[derive(Default, Debug, Clone)]
pub struct Environment {
    variables: IndexMap<String, String>,
}

impl Environment {
    /// Snapshot of the current process environment
    ///
    /// Variables that are not valid unicode are skipped.
    pub fn from_process() -> Self {
        let variables: IndexMap<_, _> = std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        tracing::debug!(count = variables.len(), "read process environment");

        Self { variables }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            variables: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Which tier answered a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    System,
    Environment,
}

/// Secondary and tertiary stores consulted after the primary store
///
/// The primary store is passed to every lookup since the expansion engine keeps writing to it.
#[derive(Debug, Clone, Copy, Default, derive_new::new)]
pub struct LookupChain<'a> {
    system: Option<&'a PropertyStore>,
    environment: Option<&'a Environment>,
}

impl<'a> LookupChain<'a> {
    pub fn lookup(&self, primary: &PropertyStore, key: &str) -> Option<String> {
        self.lookup_with_tier(primary, key).map(|(_, value)| value)
    }

    pub fn lookup_with_tier(&self, primary: &PropertyStore, key: &str) -> Option<(Tier, String)> {
        // `${}` and `${:default}` never match anything
        if key.is_empty() {
            return None;
        }

        if let Some(value) = primary.get(key) {
            return Some((Tier::Primary, value.to_string()));
        }

        if let Some(value) = self.system.and_then(|system| system.get(key)) {
            return Some((Tier::System, value.to_string()));
        }

        let name = key.strip_prefix(ENV_PREFIX)?;
        self.environment
            .and_then(|environment| environment.get(name))
            .map(|value| (Tier::Environment, value.to_string()))
    }
}
