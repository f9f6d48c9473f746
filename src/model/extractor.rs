use crate::core::resource::strip_query;
use crate::core::{AssetError, ResourceType, Result};

use super::GroupKey;

/// Maps a processing request to the group it asks for.
pub trait GroupExtractor: Send + Sync {
    /// # Errors
    ///
    /// [`AssetError::InvalidRequest`] when the request names no group.
    fn extract(&self, request: &str) -> Result<GroupKey>;
}

/// Reads `path/to/<group>.<ext>`; the extension selects the resource type.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultGroupExtractor;

impl GroupExtractor for DefaultGroupExtractor {
    fn extract(&self, request: &str) -> Result<GroupKey> {
        let invalid = |reason: &str| AssetError::InvalidRequest {
            uri: request.to_string(),
            reason: reason.to_string(),
        };

        let path = strip_query(request);
        let file = path.rsplit('/').next().unwrap_or(path);
        let (name, extension) = file
            .rsplit_once('.')
            .ok_or_else(|| invalid("missing extension"))?;
        if name.is_empty() {
            return Err(invalid("missing group name"));
        }
        let resource_type =
            ResourceType::from_extension(extension).ok_or_else(|| invalid("unsupported extension"))?;
        Ok(GroupKey::new(name, resource_type))
    }
}
