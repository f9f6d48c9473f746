//! Locator for uris relative to the web application root.

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use crate::context::RequestContext;
use crate::core::resource::strip_query;
use crate::core::{AssetError, Result};
use crate::injector::{Inject, InjectionTarget, Slot};

use super::{ByteStream, Locator};

/// Reads `/path` uris from the context folder of the injected request context.
#[derive(Debug, Default)]
pub struct ServletContextLocator {
    context: Inject<RequestContext>,
}

impl ServletContextLocator {
    /// Registered alias.
    pub const ALIAS: &'static str = "servletContext";

    /// Resolve `uri` to a file below `root`, refusing anything that escapes it.
    pub(crate) fn resolve_path(root: &Path, uri: &str) -> Option<PathBuf> {
        let relative = Path::new(strip_query(uri).trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        (!escapes).then(|| root.join(relative))
    }
}

impl InjectionTarget for ServletContextLocator {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::Context(&self.context)]
    }
}

impl Locator for ServletContextLocator {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn accepts(&self, uri: &str) -> bool {
        uri.starts_with('/') && !uri.starts_with("//")
    }

    fn locate(&self, uri: &str) -> Result<ByteStream> {
        let context = self.context.require("read-only context")?;
        let root = &context.config().context.context_folder;
        let path = Self::resolve_path(root, uri).ok_or_else(|| {
            AssetError::io(
                uri,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path escapes the context folder",
                ),
            )
        })?;
        let file = File::open(&path).map_err(|e| AssetError::io(uri, e))?;
        Ok(Box::new(file))
    }
}
