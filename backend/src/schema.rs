use crate::error::SchemaError;
use log::info;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

static SCHEMA: OnceCell<Arc<FeatureSchema>> = OnceCell::new();

/// Ordered feature names the model was fitted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(SchemaError::BlankName(i));
            }
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateFeature(name.clone()));
            }
        }

        Ok(Self { names })
    }

    /// Parses a JSON array of feature name strings.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let names: Vec<String> = serde_json::from_str(json)?;
        Self::new(names)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Loads the schema once per process. Later calls return the cached
/// instance regardless of `path`; a failed load leaves the cache empty.
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<Arc<FeatureSchema>, SchemaError> {
    SCHEMA
        .get_or_try_init(|| {
            let schema = FeatureSchema::load(path.as_ref())?;
            info!(
                "Feature schema loaded from {} ({} features)",
                path.as_ref().display(),
                schema.len()
            );
            Ok(Arc::new(schema))
        })
        .cloned()
}
