//! placeholder expansion
use crate::buffer::ExpansionBuffer;
use crate::cycle_guard::{CycleError, CycleGuard};
use crate::lookup::{Environment, LookupChain};
use crate::placeholder::{split_default, Placeholder};
use crate::property_store::PropertyStore;
use crate::scanner::{Scanner, START};
use std::collections::HashSet;

/// Resolves the value of `key`, expanding all placeholders it contains
///
/// Placeholders are looked up in `store` first and, for keys starting with `env.`, in `environment`. Values that
/// contain placeholders themselves are stored back into `store` fully expanded.
pub fn resolve(
    key: &str,
    store: &mut PropertyStore,
    environment: Option<&Environment>,
    allow_defaults: bool,
) -> Result<String, CycleError> {
    Session::new(LookupChain::new(None, environment), allow_defaults, store).resolve_key(key)
}

/// Reusable resolution settings
///
/// ```
/// # use propex::{properties, resolver::Resolver};
/// let mut store = properties! {
///     "hostname" => "localhost",
///     "base.url" => "http://${hostname}:${port:8080}/",
/// };
///
/// let resolver = Resolver::default().allow_defaults(true);
/// assert_eq!(resolver.resolve("base.url", &mut store).unwrap(), "http://localhost:8080/");
/// ```
#[derive(Debug, Default)]
pub struct Resolver {
    system: Option<PropertyStore>,
    environment: Option<Environment>,
    allow_defaults: bool,
}

impl Resolver {
    /// Secondary store, consulted when the primary store does not know a key
    pub fn with_system_properties(mut self, system: PropertyStore) -> Self {
        self.system = Some(system);
        self
    }

    /// Tertiary store for `${env.NAME}` placeholders
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Enables `${key:default}` syntax
    pub fn allow_defaults(mut self, allow_defaults: bool) -> Self {
        self.allow_defaults = allow_defaults;
        self
    }

    fn lookup_chain(&self) -> LookupChain<'_> {
        LookupChain::new(self.system.as_ref(), self.environment.as_ref())
    }

    pub fn resolve(&self, key: &str, store: &mut PropertyStore) -> Result<String, CycleError> {
        Session::new(self.lookup_chain(), self.allow_defaults, store).resolve_key(key)
    }

    /// Resolves every key of `store` in order and writes the results back
    pub fn resolve_all(&self, store: &mut PropertyStore) -> Result<(), ResolveError> {
        let keys: Vec<String> = store.keys().map(str::to_string).collect();

        for key in keys {
            let value = self
                .resolve(&key, store)
                .map_err(|source| ResolveError::Cycle {
                    key: key.clone(),
                    source,
                })?;
            store.insert(key, value);
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("Unable to resolve property {key}")]
    Cycle {
        key: String,
        #[source]
        source: CycleError,
    },
}

/// State of one top-level resolution
///
/// The cycle guard and the set of placeholders that failed to resolve live exactly as long as one
/// [Session::resolve_key] call.
struct Session<'c, 's> {
    chain: LookupChain<'c>,
    scanner: Scanner,
    allow_defaults: bool,
    store: &'s mut PropertyStore,
    guard: CycleGuard,
    /// Exact placeholder texts that are known to stay unresolved
    unresolved: HashSet<String>,
}

impl<'c, 's> Session<'c, 's> {
    fn new(chain: LookupChain<'c>, allow_defaults: bool, store: &'s mut PropertyStore) -> Self {
        Self {
            chain,
            scanner: Scanner::new(allow_defaults),
            allow_defaults,
            store,
            guard: CycleGuard::default(),
            unresolved: HashSet::new(),
        }
    }

    fn resolve_key(mut self, key: &str) -> Result<String, CycleError> {
        // the key itself may be an expression like `p${one}`
        let key = if key.contains(START) {
            self.expand(key)?
        } else {
            key.to_string()
        };

        let raw = self.store.get(&key).unwrap_or_default().to_string();
        self.guard.visit(&key, &raw)?;

        self.expand(&raw)
    }

    #[tracing::instrument(level = "trace", skip(self), fields(depth = self.guard.depth()))]
    fn expand(&mut self, text: &str) -> Result<String, CycleError> {
        let mut buffer = ExpansionBuffer::new(text);
        buffer.advance(&self.scanner, &self.unresolved);

        loop {
            let tail = buffer.unresolved();
            let Some(span) = self
                .scanner
                .spans(tail)
                .find(|span| !self.unresolved.contains(span.text(tail)))
            else {
                break;
            };

            let original = span.text(tail).to_string();
            let placeholder = split_default(span.body(tail), self.allow_defaults);

            match self.substitute(&placeholder)? {
                Some(value) if value != original => {
                    tracing::trace!(placeholder=%original, %value, "substitute");
                    buffer.replace_all(&original, &value);
                }
                _ => {
                    self.unresolved.insert(original);
                }
            }

            buffer.advance(&self.scanner, &self.unresolved);
        }

        Ok(buffer.into_string())
    }

    /// Value for one placeholder, `None` if it stays as is
    fn substitute(&mut self, placeholder: &Placeholder) -> Result<Option<String>, CycleError> {
        let key = placeholder.key.as_str();
        let found = self.chain.lookup_with_tier(self.store, key);

        self.guard.visit(
            key,
            found.as_ref().map(|(_, value)| value.as_str()).unwrap_or_default(),
        )?;

        let value = match found {
            Some((tier, value)) if value.contains(START) => {
                let expanded = self.expand(&value)?;
                tracing::debug!(key, ?tier, value=%expanded, "memoize expanded value");
                self.store.insert(key, expanded.clone());
                Some(expanded)
            }
            Some((_, value)) => Some(value),
            None => {
                tracing::debug!(key, "unresolved");
                self.unresolved.insert(placeholder.wrapped_key());
                None
            }
        };

        let value = match &placeholder.default {
            Some(default) if value.as_ref().map_or(true, |v| self.unresolved.contains(v)) => {
                tracing::trace!(key, %default, "use default value");
                Some(self.expand(default)?)
            }
            _ => value,
        };

        self.guard.leave(key);
        Ok(value)
    }
}
