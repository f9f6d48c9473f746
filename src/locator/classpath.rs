//! Locator for `classpath:` uris.

use std::fs::File;
use std::io::ErrorKind;

use tracing::trace;

use crate::context::RequestContext;
use crate::core::{AssetError, Result};
use crate::injector::{Inject, InjectionTarget, Slot};

use super::servlet_context::ServletContextLocator;
use super::{ByteStream, Locator};

const PREFIX: &str = "classpath:";

/// Reads `classpath:path` from the first configured classpath root containing `path`.
#[derive(Debug, Default)]
pub struct ClasspathLocator {
    context: Inject<RequestContext>,
}

impl ClasspathLocator {
    /// Registered alias.
    pub const ALIAS: &'static str = "classpath";
}

impl InjectionTarget for ClasspathLocator {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::Context(&self.context)]
    }
}

impl Locator for ClasspathLocator {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn accepts(&self, uri: &str) -> bool {
        uri.starts_with(PREFIX)
    }

    fn locate(&self, uri: &str) -> Result<ByteStream> {
        let context = self.context.require("read-only context")?;
        let relative = &uri[PREFIX.len()..];

        for root in &context.config().context.classpath {
            let Some(path) = ServletContextLocator::resolve_path(root, relative) else {
                break;
            };
            trace!("Probing {} for '{}'", path.display(), uri);
            match File::open(&path) {
                Ok(file) => return Ok(Box::new(file)),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(AssetError::io(uri, e)),
            }
        }

        Err(AssetError::io(
            uri,
            std::io::Error::new(ErrorKind::NotFound, "not present in any classpath root"),
        ))
    }
}
