//! Built-in processor stages
//!
//! | alias | type | minimizer | effect |
//! |---|---|---|---|
//! | `bomStripper` | any | no | drops a leading byte order mark |
//! | `semicolonAppender` | js | no | terminates content with `;` |
//! | `jsMin` | js | yes | strips comments and blank lines |
//! | `cssMin` | css | yes | strips comments and collapses whitespace |
//! | `cssImport` | css | no | inlines `@import` targets through the locators |
//! | `cssVariables` | css | no | expands `@variables` blocks and `var(name)` |
//! | `cssUrlRewriting` | css | no | makes relative `url()` references absolute |

mod css;
mod css_import;
mod js;

pub use css::{CssMin, CssUrlRewriting, CssVariables};
pub use css_import::CssImport;
pub use js::{BomStripper, JsMin, SemicolonAppender};

pub(crate) use css::resolve_relative;

use std::sync::Arc;

use crate::registry::StrategyProvider;

use super::Processor;

/// Provider registering every built-in stage.
#[must_use]
pub fn provider() -> StrategyProvider<Arc<dyn Processor>> {
    StrategyProvider::new("builtin")
        .with(BomStripper::ALIAS, || Arc::new(BomStripper) as Arc<dyn Processor>)
        .with(SemicolonAppender::ALIAS, || {
            Arc::new(SemicolonAppender) as Arc<dyn Processor>
        })
        .with(JsMin::ALIAS, || Arc::new(JsMin) as Arc<dyn Processor>)
        .with(CssMin::ALIAS, || Arc::new(CssMin) as Arc<dyn Processor>)
        .with(CssImport::ALIAS, || {
            Arc::new(CssImport::default()) as Arc<dyn Processor>
        })
        .with(CssVariables::ALIAS, || Arc::new(CssVariables) as Arc<dyn Processor>)
        .with(CssUrlRewriting::ALIAS, || {
            Arc::new(CssUrlRewriting) as Arc<dyn Processor>
        })
}
