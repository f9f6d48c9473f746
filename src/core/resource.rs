//! Resource abstractions for assetweave
//!
//! A [`Resource`] is a single uri inside a group together with its declared
//! [`ResourceType`]. Groups are served per type: `all.js` merges the JavaScript
//! resources of group `all`, `all.css` its stylesheets.
//!
//! # Examples
//!
//! ```rust
//! use assetweave::core::{Resource, ResourceType};
//!
//! let kind: ResourceType = "css".parse().unwrap();
//! assert_eq!(kind.extension(), "css");
//!
//! let resource = Resource::new("/css/site.css?v=3", ResourceType::Css);
//! assert_eq!(resource.extension(), Some("css"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::AssetError;

/// Kind of content a resource or group output holds.
///
/// Serialized as its lowercase extension (`"js"`, `"css"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// JavaScript
    Js,
    /// Cascading style sheets
    Css,
}

impl ResourceType {
    /// Every resource type, in the order a batch build emits them.
    pub const ALL: [Self; 2] = [Self::Js, Self::Css];

    /// File extension used for merged outputs of this type.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Css => "css",
        }
    }

    /// MIME type reported on the response handle.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Js => "application/javascript",
            Self::Css => "text/css",
        }
    }

    /// Map a file extension (case-insensitive) to a resource type.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "js" => Some(Self::Js),
            "css" => Some(Self::Css),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ResourceType {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| AssetError::Configuration {
            message: format!("Unknown resource type '{s}' (expected 'js' or 'css')"),
        })
    }
}

/// A uri in a group together with its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    /// Location understood by one of the configured locators
    pub uri: String,
    /// Declared type (the list the resource sits in within its group)
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
}

impl Resource {
    /// Create a resource.
    pub fn new(uri: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            uri: uri.into(),
            resource_type,
        }
    }

    /// Extension of the last path segment, ignoring any query or fragment.
    ///
    /// Returns `None` when the last segment has no dot.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        uri_extension(&self.uri)
    }

    /// The uri without query string or fragment.
    #[must_use]
    pub fn path(&self) -> &str {
        strip_query(&self.uri)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.uri, self.resource_type)
    }
}

pub(crate) fn strip_query(uri: &str) -> &str {
    uri.split(['?', '#']).next().unwrap_or(uri)
}

pub(crate) fn uri_extension(uri: &str) -> Option<&str> {
    let path = strip_query(uri);
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}
