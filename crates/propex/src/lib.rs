//! # propex - property placeholder expansion
//!
//! Resolves `${key}` placeholders in flat key/value property sets.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `propex` works internally.
//!
//! ### Placeholder syntax
//!
//! ```properties
//! hostname = localhost
//! port = 8080
//!
//! # plain reference
//! base.url = http://${hostname}:${port}/
//!
//! # environment variable, only for keys starting with `env.`
//! home = ${env.HOME}
//!
//! # default value, only when defaults are enabled
//! timeout = ${timeout.override:30}
//!
//! # the key of a placeholder may be built from other placeholders
//! selected = ${url.${stage}}
//! ```
//!
//! ### Loading
//!
//! Properties are kept in a [property_store::PropertyStore], an insertion ordered map. Files are read with
//! [property_store::PropertyStore::load_file], which understands `.properties` syntax and flattens `.yml`/`.yaml`
//! documents into dotted keys (see [format]).
//!
//! ### Finding placeholders
//!
//! see [scanner::Scanner]
//!
//! The scanner walks the text once and keeps a stack of open `${`. Every `}` closes the most recent one. Spans are
//! yielded in the order they close, so the innermost placeholder always comes first:
//!
//! | text             | spans, in order                      |
//! |------------------|--------------------------------------|
//! | `a${b}c${d}`     | `${b}`, `${d}`                       |
//! | `${${Z}${x}}`    | `${Z}`, `${x}`, `${${Z}${x}}`        |
//! | `${malformed`    | -                                    |
//!
//! ### Looking up values
//!
//! A placeholder body is split into key and default value ([placeholder::split_default]). The key is looked up in
//! the primary store, then in the system properties, then (for `env.` keys) in the environment
//! ([lookup::LookupChain]).
//!
//! ### Expansion
//!
//! see [resolver::Resolver]
//!
//! One call to resolve a key is a session. A session owns
//! - an expansion buffer: finished text on the left, text that is still scanned on the right
//! - a [cycle_guard::CycleGuard] which knows all keys whose values are currently being expanded
//! - the set of placeholder texts that are known to stay unresolved
//!
//! The engine takes the first placeholder that is not known to be unresolved and looks its key up. If the value
//! contains placeholders itself it is expanded first, recursively, and the result is written back into the primary
//! store. Then every occurrence of the placeholder text is replaced. Text produced by a replacement is scanned
//! again, which is how `${p${three}}` turns into `${p3}` and then into the value of `p3`.
//!
//! Placeholders that cannot be resolved stay in the output verbatim. A key that is visited while it is still being
//! expanded is a circular definition and aborts the whole resolution with a [cycle_guard::CycleError].
//!
mod buffer;
pub mod cycle_guard;
pub mod format;
pub mod lookup;
pub mod placeholder;
pub mod property_store;
pub mod resolver;
pub mod scanner;

pub use resolver::resolve;
