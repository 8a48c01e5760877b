//! Where index and descriptor texts come from.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies the raw texts a [`DynamixelTool`](crate::DynamixelTool) is built from.
pub trait ModelSource {
    /// Contents of the model index (`model_info.list`).
    fn model_index(&self) -> Result<Cow<'_, str>>;

    /// Contents of the `.device` descriptor for `model_name`.
    fn device_descriptor(&self, model_name: &str) -> Result<Cow<'_, str>>;
}

/// Texts held in memory, e.g. compiled into the binary.
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    index: Cow<'static, str>,
    descriptors: HashMap<String, Cow<'static, str>>,
}

impl StaticSource {
    pub fn new(index: impl Into<Cow<'static, str>>) -> Self {
        Self {
            index: index.into(),
            descriptors: HashMap::new(),
        }
    }

    pub fn with_descriptor(
        mut self,
        model_name: impl Into<String>,
        text: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.descriptors.insert(model_name.into(), text.into());
        self
    }

    /// The index and descriptors shipped in this crate's `resources/` dir.
    pub fn bundled() -> Self {
        Self::new(include_str!("../resources/model_info.list"))
            .with_descriptor("AX-12A", include_str!("../resources/models/AX-12A.device"))
            .with_descriptor(
                "XM430-W350",
                include_str!("../resources/models/XM430-W350.device"),
            )
    }
}

impl ModelSource for StaticSource {
    fn model_index(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(&*self.index))
    }

    fn device_descriptor(&self, model_name: &str) -> Result<Cow<'_, str>> {
        self.descriptors
            .get(model_name)
            .map(|text| Cow::Borrowed(&**text))
            .ok_or_else(|| ModelError::MissingResource {
                what: "device descriptor",
                key: model_name.to_string(),
            })
    }
}

/// Reads `index_path` and `<models_dir>/<model name>.device` from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSource {
    pub index_path: PathBuf,
    pub models_dir: PathBuf,
}

impl FileSource {
    pub fn new(index_path: impl Into<PathBuf>, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            models_dir: models_dir.into(),
        }
    }

    pub fn descriptor_path(&self, model_name: &str) -> PathBuf {
        self.models_dir.join(format!("{model_name}.device"))
    }
}

fn read_resource(what: &'static str, path: &Path) -> Result<String> {
    debug!(path = %path.display(), what, "reading model resource");
    fs::read_to_string(path).map_err(|source| ModelError::Resource {
        what,
        path: path.to_path_buf(),
        source,
    })
}

impl ModelSource for FileSource {
    fn model_index(&self) -> Result<Cow<'_, str>> {
        read_resource("model index", &self.index_path).map(Cow::Owned)
    }

    fn device_descriptor(&self, model_name: &str) -> Result<Cow<'_, str>> {
        read_resource("device descriptor", &self.descriptor_path(model_name)).map(Cow::Owned)
    }
}

/// YAML source configuration.
///
/// ```yaml
/// index_path: resources/model_info.list
/// models_dir: resources/models
/// ```
///
/// Relative paths are resolved against the config file's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub index_path: PathBuf,
    pub models_dir: PathBuf,
}

impl SourceConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = read_resource("source config", path)?;
        let mut cfg = Self::from_yaml_str(&raw)?;
        if let Some(base) = path.parent() {
            cfg.index_path = base.join(&cfg.index_path);
            cfg.models_dir = base.join(&cfg.models_dir);
        }
        Ok(cfg)
    }

    pub fn into_source(self) -> FileSource {
        FileSource::new(self.index_path, self.models_dir)
    }
}
