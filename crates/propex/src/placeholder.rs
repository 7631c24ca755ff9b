//! placeholder body decomposition
use crate::scanner::{DEFAULT_DELIMITER, END, START};

/// A placeholder body split into key and optional default value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Clean key, delimiters and default stripped
    pub key: String,
    /// Text after the first `:`, only present when default values are enabled
    pub default: Option<String>,
}

impl Placeholder {
    /// The key re-wrapped as `${key}`
    pub fn wrapped_key(&self) -> String {
        format!("{START}{}{END}", self.key)
    }
}

/// Split a placeholder body into key and default value
///
/// With defaults enabled the body is split on the first `:`. Everything after it is the default, verbatim (it is
/// neither trimmed nor split again). With defaults disabled the whole body is the key.
pub fn split_default(body: &str, allow_defaults: bool) -> Placeholder {
    if allow_defaults {
        if let Some((key, default)) = body.split_once(DEFAULT_DELIMITER) {
            return Placeholder {
                key: key.to_string(),
                default: Some(default.to_string()),
            };
        }
    }

    Placeholder {
        key: body.to_string(),
        default: None,
    }
}
