//! ordered string-keyed property map
//!
//! [PropertyStore] keeps insertion order, so resolution and output follow the order in which properties were
//! loaded. Loading a key that already exists replaces its value but keeps its position.
use crate::format;
use indexmap::IndexMap;
use std::path::Path;

#[derive(Default, Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct PropertyStore {
    properties: IndexMap<String, String>,
}

impl PropertyStore {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Inserts or replaces a property, returns the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.properties.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Whether any value refers to an environment variable (`${env.`)
    ///
    /// Used to decide if the process environment has to be read at all.
    pub fn references_environment(&self) -> bool {
        self.properties
            .values()
            .any(|value| value.contains("${env."))
    }

    /// Writes all properties in `.properties` syntax
    pub fn write_properties(
        &self,
        writer: &mut impl std::io::Write,
        comment: Option<&str>,
    ) -> std::io::Result<()> {
        format::properties::write(writer, self.iter(), comment)
    }
}

impl PropertyStore {
    /// Loads a `.properties`, `.yml` or `.yaml` file and adds all of its properties
    pub fn load_file(&mut self, file_path: &Path) -> Result<(), LoadError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents = std::fs::read(&file_path)?;
        let entries = match file_path.extension().and_then(|ext| ext.to_str()) {
            Some("yml" | "yaml") => format::yaml::flatten(&String::from_utf8(file_contents)?)?,
            _ => format::properties::parse(&format::properties::decode(file_contents))?,
        };

        tracing::debug!(count = entries.len(), "loaded properties");
        self.extend(entries);
        Ok(())
    }

    /// Same as [PropertyStore::load_file], but a missing file is skipped
    pub fn load_file_quiet(&mut self, file_path: &Path) -> Result<(), LoadError> {
        if !file_path.exists() {
            tracing::warn!(path=%file_path.display(), "ignoring missing properties file");
            return Ok(());
        }

        self.load_file(file_path)
    }
}

/// Creates (or truncates) an output file, missing parent directories are created
pub fn create_output_file(file_path: &Path) -> Result<std::fs::File, WriteError> {
    if file_path.is_dir() {
        return Err(WriteError::IsDirectory(file_path.to_path_buf()));
    }

    if let Some(parent) = file_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path=%file_path.display(), "writing file");
    Ok(std::fs::File::create(file_path)?)
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PropertyStore {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyStore {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut store = PropertyStore::default();
        store.extend(iter);
        store
    }
}

impl std::str::FromStr for PropertyStore {
    type Err = format::properties::ParseError;

    /// Parses text in `.properties` syntax
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(format::properties::parse(s)?.into_iter().collect())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse properties file")]
    PropertiesParseFailed(#[from] format::properties::ParseError),
    #[error("Unable to parse yaml file")]
    YamlParseFailed(#[from] serde_yaml::Error),
    #[error("Yaml file is not valid utf-8")]
    YamlNotUtf8(#[from] std::string::FromUtf8Error),
}

#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    #[error("Output file must be a file and not a directory: {}", .0.display())]
    IsDirectory(std::path::PathBuf),
    #[error("IO error")]
    IoError(#[from] std::io::Error),
}

/// Utility macro to create a [PropertyStore]
///
/// ```
/// # use propex::properties;
/// let store = properties! {
///     "hostname" => "localhost",
///     "port" => "8080",
/// };
/// assert_eq!(store.get("port"), Some("8080"));
/// ```
#[macro_export]
macro_rules! properties {
    { $($key:expr => $value:expr),* $(,)? } => {
        {
            #[allow(unused_mut)]
            let mut store = $crate::property_store::PropertyStore::default();
            $(
                store.insert($key, $value);
            )*

            store
        }
    };
}

#[cfg(test)]
pub(crate) mod test {
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_insertion_order() {
        let mut store = properties! {
            "b" => "1",
            "a" => "2",
        };
        store.insert("b", "3");
        store.insert("c", "4");

        assert_eq!(
            store.iter().collect::<Vec<_>>(),
            vec![("b", "3"), ("a", "2"), ("c", "4")]
        );
    }

    #[test]
    fn references_environment() {
        assert!(!properties! {"p1" => "${env}", "p2" => "env.HOME"}.references_environment());
        assert!(properties! {"p1" => "x${env.HOME}"}.references_environment());
    }

    #[test]
    fn from_str() {
        let store: super::PropertyStore = "a=1\nb = ${a}\n".parse().expect("valid properties");
        assert_eq!(store.get("a"), Some("1"));
        assert_eq!(store.get("b"), Some("${a}"));
    }

    #[test]
    fn loads_latin1_properties() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("legacy.properties");
        std::fs::write(&path, b"greeting=gr\xfc\xdfe\n").expect("write");

        let mut store = super::PropertyStore::default();
        store.load_file(&path).expect("latin-1 is accepted");
        assert_eq!(store.get("greeting"), Some("grüße"));
    }

    #[test]
    fn output_file_creates_parents() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/dir/out.properties");

        let mut file = super::create_output_file(&path).expect("parents are created");
        properties! {"a" => "1"}
            .write_properties(&mut file, Some("Properties"))
            .expect("write");
        drop(file);

        assert_eq!(
            std::fs::read_to_string(&path).expect("written"),
            "#Properties\na=1\n"
        );
    }

    #[test]
    fn output_file_rejects_directory() {
        let dir = tempfile::tempdir().expect("temp dir");

        let error = super::create_output_file(dir.path()).expect_err("directory");
        assert!(matches!(error, super::WriteError::IsDirectory(_)));
    }

    #[test]
    fn serializes_as_map() {
        let store = properties! {"b" => "1", "a" => "2"};
        assert_eq!(
            serde_json::to_string(&store).expect("serializable"),
            r#"{"b":"1","a":"2"}"#
        );
    }
}
