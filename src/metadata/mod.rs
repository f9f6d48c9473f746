//! Metadata attached to group runs.
//!
//! The `[context.metadata]` table of the configuration is exposed through a
//! [`MetaDataFactory`] and handed to lifecycle callbacks with every processing report.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::injector::InjectionTarget;

/// Key/value metadata for callbacks and reports.
pub type MetaData = BTreeMap<String, Value>;

/// Supplies metadata for a group run.
pub trait MetaDataFactory: InjectionTarget + Send + Sync {
    fn create(&self) -> MetaData;
}

/// Serves a fixed metadata map, normally the configured `[context.metadata]` table.
#[derive(Debug, Clone, Default)]
pub struct DefaultMetaDataFactory {
    metadata: MetaData,
}

impl DefaultMetaDataFactory {
    #[must_use]
    pub fn new(metadata: MetaData) -> Self {
        Self { metadata }
    }
}

impl InjectionTarget for DefaultMetaDataFactory {}

impl MetaDataFactory for DefaultMetaDataFactory {
    fn create(&self) -> MetaData {
        self.metadata.clone()
    }
}
