//! yaml documents flattened into properties
//!
//! Nested mappings become dotted keys, sequence elements get an `[index]` suffix:
//!
//! ```yaml
//! server:
//!   host: localhost
//!   ports: [80, 443]
//! ```
//!
//! becomes `server.host=localhost`, `server.ports[0]=80` and `server.ports[1]=443`.
use serde_yaml::Value;

pub fn flatten(text: &str) -> Result<Vec<(String, String)>, serde_yaml::Error> {
    let document: Value = serde_yaml::from_str(text)?;

    let mut entries = vec![];
    flatten_into(&mut entries, None, document);
    Ok(entries)
}

fn flatten_into(entries: &mut Vec<(String, String)>, prefix: Option<String>, value: Value) {
    match value {
        Value::Mapping(mapping) => {
            for (key, value) in mapping {
                let key = scalar_text(&key);
                let key = key.trim();
                let path = match &prefix {
                    Some(prefix) => format!("{prefix}.{key}"),
                    None => key.to_string(),
                };
                flatten_into(entries, Some(path), value);
            }
        }
        Value::Sequence(sequence) => {
            let prefix = prefix.unwrap_or_default();
            for (index, element) in sequence.into_iter().enumerate() {
                flatten_into(entries, Some(format!("{prefix}[{index}]")), element);
            }
        }
        Value::Tagged(tagged) => flatten_into(entries, prefix, tagged.value),
        scalar => {
            // a bare scalar document has no key to live under
            if let Some(key) = prefix {
                entries.push((key, scalar_text(&scalar)));
            }
        }
    }
}

/// Textual form of a scalar, `null` is the empty string
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(bool) => bool.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(string) => string.clone(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}
