//! Temporary webapp layout for tests
//!
//! A fluent builder creating a context folder, a classpath root, a TOML model and an
//! `assetweave.toml` configuration inside a temporary directory.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use crate::config::EngineConfig;

/// A builder for [`TestWebapp`].
pub struct TestWebappBuilder {
    temp_dir: TempDir,
    files: Vec<(String, String)>,
    classpath_files: Vec<(String, String)>,
    groups: BTreeMap<String, (Vec<String>, Vec<String>)>,
    settings: Vec<(String, String)>,
}

impl TestWebappBuilder {
    /// Create a new builder over a fresh temporary directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            files: Vec::new(),
            classpath_files: Vec::new(),
            groups: BTreeMap::new(),
            settings: Vec::new(),
        })
    }

    /// Add a file below the context folder
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Add a file below the classpath root
    pub fn with_classpath_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.classpath_files.push((path.into(), content.into()));
        self
    }

    /// Add a group to the model
    pub fn with_group(mut self, name: &str, js: &[&str], css: &[&str]) -> Self {
        let to_vec = |uris: &[&str]| uris.iter().map(|uri| (*uri).to_string()).collect();
        self.groups.insert(name.to_string(), (to_vec(js), to_vec(css)));
        self
    }

    /// Add a top-level configuration entry, e.g. `("naming-strategy", "hashEncoder")`
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.push((key.into(), value.into()));
        self
    }

    /// Write everything to disk
    pub fn build(self) -> Result<TestWebapp> {
        let root = self.temp_dir.path().to_path_buf();
        let context_folder = root.join("webapp");
        let classpath = root.join("classes");
        std::fs::create_dir_all(&context_folder)?;
        std::fs::create_dir_all(&classpath)?;

        for (path, content) in &self.files {
            write(&context_folder.join(path), content)?;
        }
        for (path, content) in &self.classpath_files {
            write(&classpath.join(path), content)?;
        }

        let mut model = String::new();
        for (name, (js, css)) in &self.groups {
            writeln!(model, "[groups.{name}]")?;
            writeln!(model, "js = {}", toml_list(js))?;
            writeln!(model, "css = {}\n", toml_list(css))?;
        }
        let model_path = root.join("wro.toml");
        write(&model_path, &model)?;

        let mut config = String::new();
        for (key, value) in &self.settings {
            writeln!(config, "{key} = \"{value}\"")?;
        }
        writeln!(config, "\n[context]")?;
        writeln!(config, "context-folder = \"webapp\"")?;
        writeln!(config, "classpath = [\"classes\"]")?;
        writeln!(config, "model = \"wro.toml\"")?;
        let config_path = root.join("assetweave.toml");
        write(&config_path, &config)?;

        Ok(TestWebapp {
            temp_dir: self.temp_dir,
            context_folder,
            model_path,
            config_path,
        })
    }
}

fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn toml_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("\"{item}\"")).collect();
    format!("[{}]", quoted.join(", "))
}

/// A webapp layout on disk; removed when dropped.
pub struct TestWebapp {
    temp_dir: TempDir,
    context_folder: PathBuf,
    model_path: PathBuf,
    config_path: PathBuf,
}

impl TestWebapp {
    /// Create a builder
    pub fn builder() -> Result<TestWebappBuilder> {
        TestWebappBuilder::new()
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn context_folder(&self) -> &Path {
        &self.context_folder
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the written configuration
    pub fn config(&self) -> Result<EngineConfig> {
        let source = std::fs::read_to_string(&self.config_path)?;
        Ok(EngineConfig::from_toml(&source, self.root())?)
    }

    /// Overwrite a file below the context folder
    pub fn write_file(&self, path: impl AsRef<Path>, content: &str) -> Result<()> {
        write(&self.context_folder.join(path), content)
    }

    /// Read a file relative to the root
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(std::fs::read_to_string(self.root().join(path))?)
    }

    pub fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        self.root().join(path).exists()
    }
}
