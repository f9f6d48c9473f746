use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::constants::MAX_IMPORT_DEPTH;
use crate::core::{Resource, ResourceType};
use crate::injector::{Inject, InjectionTarget, Slot};
use crate::locator::{LocatorFactory, read_all};
use crate::processor::Processor;

use super::resolve_relative;

static IMPORT_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?['"]?([^'")\s;]+)['"]?\s*\)?[^;]*;"#)
        .expect("valid import pattern")
});

/// Inlines `@import` targets, located through the injected locator factory.
///
/// Imports are resolved relative to the importing stylesheet and expanded
/// recursively. A cyclic import is dropped with a warning.
#[derive(Debug, Default)]
pub struct CssImport {
    locators: Inject<dyn LocatorFactory>,
}

impl CssImport {
    pub const ALIAS: &'static str = "cssImport";

    fn inline(
        &self,
        base: &str,
        content: &str,
        stack: &mut Vec<String>,
    ) -> anyhow::Result<String> {
        let locators = self.locators.require("locator factory")?;
        let mut output = String::with_capacity(content.len());
        let mut last = 0;

        for caps in IMPORT_STATEMENT.captures_iter(content) {
            let Some(statement) = caps.get(0) else {
                continue;
            };
            output.push_str(&content[last..statement.start()]);
            last = statement.end();

            let target = resolve_relative(base, &caps[1]);
            if stack.contains(&target) {
                warn!("Ignoring recursive import of '{}' from '{}'", target, base);
                continue;
            }
            if stack.len() > MAX_IMPORT_DEPTH {
                anyhow::bail!("@import nesting deeper than {MAX_IMPORT_DEPTH} at '{target}'");
            }

            debug!("Inlining '{}' into '{}'", target, base);
            let bytes = read_all(locators.locate(&target)?, &target)?;
            let imported = String::from_utf8_lossy(&bytes);

            stack.push(target.clone());
            let expanded = self.inline(&target, &imported, stack)?;
            stack.pop();
            output.push_str(&expanded);
        }

        output.push_str(&content[last..]);
        Ok(output)
    }
}

impl InjectionTarget for CssImport {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::LocatorFactory(&self.locators)]
    }
}

impl Processor for CssImport {
    fn name(&self) -> &str {
        Self::ALIAS
    }

    fn process(&self, resource: &Resource, content: &str) -> anyhow::Result<String> {
        let mut stack = vec![resource.uri.clone()];
        self.inline(&resource.uri, content, &mut stack)
    }

    fn supported_type(&self) -> Option<ResourceType> {
        Some(ResourceType::Css)
    }
}
