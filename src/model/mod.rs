//! Group model
//!
//! A [`Model`] is the set of named groups the engine can serve. Each [`Group`] is an
//! ordered list of resources; serving a group for a [`ResourceType`] merges the
//! resources of that type in declaration order.
//!
//! # Model file format
//!
//! ```toml
//! [groups.all]
//! js = ["/js/jquery.js", "classpath:lib/app.js"]
//! css = ["/css/site.css"]
//!
//! [groups.admin]
//! css = ["/css/admin.css"]
//! ```
//!
//! The declared type of a resource is the list it sits in.

mod extractor;

pub use extractor::{DefaultGroupExtractor, GroupExtractor};

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use tracing::debug;

use crate::core::{AssetError, Resource, ResourceType, Result};
use crate::injector::InjectionTarget;

/// Identity of a served group: its name and the requested output type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub name: String,
    pub resource_type: ResourceType,
}

impl GroupKey {
    pub fn new(name: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            name: name.into(),
            resource_type,
        }
    }

    /// Output file name before the naming strategy is applied, e.g. `all.js`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.resource_type.extension())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// A named, ordered sequence of resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    resources: Vec<Resource>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Resources of `resource_type`, in declaration order.
    pub fn resources_of(&self, resource_type: ResourceType) -> impl Iterator<Item = &Resource> {
        self.resources
            .iter()
            .filter(move |resource| resource.resource_type == resource_type)
    }

    /// Whether the group declares any resource of `resource_type`.
    #[must_use]
    pub fn has_type(&self, resource_type: ResourceType) -> bool {
        self.resources_of(resource_type).next().is_some()
    }
}

/// The groups known to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    groups: Vec<Group>,
}

impl Model {
    #[must_use]
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name == name)
    }

    #[must_use]
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.name.as_str()).collect()
    }

    /// The group named `name`.
    ///
    /// # Errors
    ///
    /// [`AssetError::GroupNotFound`] when the model does not define it.
    pub fn require_group(&self, name: &str) -> Result<&Group> {
        self.group(name).ok_or_else(|| AssetError::GroupNotFound {
            name: name.to_string(),
        })
    }

    /// Parse the TOML model format.
    ///
    /// # Errors
    ///
    /// [`AssetError::Configuration`] for malformed documents.
    pub fn from_toml(source: &str) -> Result<Self> {
        let file: ModelFile = toml::from_str(source)
            .map_err(|e| AssetError::configuration(format!("Invalid model: {e}")))?;

        let groups = file
            .groups
            .into_iter()
            .map(|(name, definition)| {
                let js = definition
                    .js
                    .into_iter()
                    .map(|uri| Resource::new(uri, ResourceType::Js));
                let css = definition
                    .css
                    .into_iter()
                    .map(|uri| Resource::new(uri, ResourceType::Css));
                Group {
                    name,
                    resources: js.chain(css).collect(),
                }
            })
            .collect();
        Ok(Self { groups })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelFile {
    #[serde(default)]
    groups: BTreeMap<String, GroupDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupDefinition {
    #[serde(default)]
    js: Vec<String>,
    #[serde(default)]
    css: Vec<String>,
}

/// Supplies the group model.
pub trait ModelFactory: InjectionTarget + Send + Sync {
    /// The model. Called on blocking threads; may perform I/O.
    ///
    /// # Errors
    ///
    /// Implementation specific; file-backed factories report read and parse failures.
    fn create(&self) -> Result<Arc<Model>>;
}

/// Model factory over a model built in code.
#[derive(Debug, Default)]
pub struct InMemoryModelFactory {
    model: Arc<Model>,
}

impl InMemoryModelFactory {
    #[must_use]
    pub fn new(model: Model) -> Self {
        Self {
            model: Arc::new(model),
        }
    }
}

impl InjectionTarget for InMemoryModelFactory {}

impl ModelFactory for InMemoryModelFactory {
    fn create(&self) -> Result<Arc<Model>> {
        Ok(Arc::clone(&self.model))
    }
}

/// Model factory reading a TOML model file once.
#[derive(Debug)]
pub struct TomlModelFactory {
    path: PathBuf,
    model: OnceLock<Arc<Model>>,
}

impl TomlModelFactory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            model: OnceLock::new(),
        }
    }

    fn load(&self) -> Result<Model> {
        debug!("Loading model from {}", self.path.display());
        let source = std::fs::read_to_string(&self.path)
            .map_err(|e| AssetError::io(self.path.display().to_string(), e))?;
        Model::from_toml(&source)
    }
}

impl InjectionTarget for TomlModelFactory {}

impl ModelFactory for TomlModelFactory {
    fn create(&self) -> Result<Arc<Model>> {
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }
        let loaded = Arc::new(self.load()?);
        Ok(Arc::clone(self.model.get_or_init(|| loaded)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"
[groups.all]
css = ["/css/a.css"]
js = ["/js/a.js", "classpath:b.js"]

[groups.admin]
css = ["/css/admin.css"]
"#;

    #[test]
    fn test_parse_model() {
        let model = Model::from_toml(MODEL).unwrap();
        assert_eq!(model.group_names(), vec!["admin", "all"]);

        let all = model.group("all").unwrap();
        let js: Vec<_> = all.resources_of(ResourceType::Js).map(|r| r.uri.as_str()).collect();
        assert_eq!(js, vec!["/js/a.js", "classpath:b.js"]);
        assert!(all.has_type(ResourceType::Css));
        assert!(!model.group("admin").unwrap().has_type(ResourceType::Js));
    }

    #[test]
    fn test_missing_group() {
        let err = Model::default().require_group("nope").unwrap_err();
        assert!(matches!(err, AssetError::GroupNotFound { ref name } if name == "nope"));
    }

    #[test]
    fn test_invalid_model() {
        assert!(Model::from_toml("[groups.all]\nhtml = []").unwrap_err().is_configuration());
    }

    #[test]
    fn test_toml_factory_reads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.toml");
        std::fs::write(&path, MODEL).unwrap();

        let factory = TomlModelFactory::new(&path);
        let first = factory.create().unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = factory.create().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_toml_factory_missing_file() {
        let err = TomlModelFactory::new("/no/such/model.toml").create().unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_group_key_file_name() {
        assert_eq!(GroupKey::new("all", ResourceType::Css).to_string(), "all.css");
    }
}
