//! Locator for absolute urls (`file:`, `http://`, `https://`).

use std::fs::File;
use std::io::Cursor;

use tracing::debug;

use crate::constants::HTTP_FETCH_TIMEOUT;
use crate::core::resource::strip_query;
use crate::core::{AssetError, Result};
use crate::injector::InjectionTarget;

use super::{ByteStream, Locator};

/// Reads local files through `file:` urls and remote resources over HTTP.
///
/// HTTP fetches are blocking; callers run locators on blocking threads.
#[derive(Debug, Default)]
pub struct UrlLocator;

impl UrlLocator {
    /// Registered alias.
    pub const ALIAS: &'static str = "url";

    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fetch(uri: &str) -> std::result::Result<Vec<u8>, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_FETCH_TIMEOUT)
            .build()?;
        let response = client.get(uri).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

impl InjectionTarget for UrlLocator {}

impl Locator for UrlLocator {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn accepts(&self, uri: &str) -> bool {
        uri.starts_with("file:") || uri.starts_with("http://") || uri.starts_with("https://")
    }

    fn locate(&self, uri: &str) -> Result<ByteStream> {
        if let Some(rest) = uri.strip_prefix("file:") {
            let path = strip_query(rest.strip_prefix("//").unwrap_or(rest));
            let file = File::open(path).map_err(|e| AssetError::io(uri, e))?;
            return Ok(Box::new(file));
        }

        debug!("Fetching {}", uri);
        let bytes = Self::fetch(uri).map_err(|e| AssetError::io(uri, std::io::Error::other(e)))?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}
