//! Ordered execution of processor stages.

use std::sync::Arc;

use tracing::debug;

use crate::core::{AssetError, Resource, ResourceType, Result};

use super::Processor;

/// Run `stages` over `content` in order.
///
/// Each stage sees the previous stage's output. The first failure stops the run.
///
/// # Errors
///
/// [`AssetError::Processing`] naming the failing stage and `resource`.
pub fn run(stages: &[Arc<dyn Processor>], resource: &Resource, content: String) -> Result<String> {
    stages.iter().try_fold(content, |content, stage| {
        debug!("Applying '{}' to '{}'", stage.name(), resource.uri);
        stage
            .process(resource, &content)
            .map_err(|source| AssetError::Processing {
                stage: stage.name().to_string(),
                resource: resource.uri.clone(),
                source,
            })
    })
}

/// Stages applicable to content of `resource_type`.
///
/// Drops stages bound to another type, and minimizers when `minimize` is false.
#[must_use]
pub fn select(
    stages: &[Arc<dyn Processor>],
    resource_type: ResourceType,
    minimize: bool,
) -> Vec<Arc<dyn Processor>> {
    stages
        .iter()
        .filter(|stage| stage.supported_type().is_none_or(|t| t == resource_type))
        .filter(|stage| minimize || !stage.is_minimizer())
        .cloned()
        .collect()
}
