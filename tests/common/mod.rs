//! Common helpers for assetweave integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use assetweave::core::{Resource, ResourceType};
use assetweave::manager::ManagerFactory;
use assetweave::test_utils::TestWebapp;

/// A webapp with two scripts and two stylesheets in group `all`, plus group `admin`
/// with a single script.
pub fn basic_webapp() -> Result<TestWebapp> {
    TestWebapp::builder()?
        .with_file("js/a.js", "// first\nvar a = 1;\n")
        .with_file("js/b.js", "var b = 2")
        .with_file("css/site.css", "body {\n  color: red;\n}\n")
        .with_classpath_file("css/lib.css", "/* lib */ .lib { margin: 0 }")
        .with_file("js/admin.js", "var admin = true;")
        .with_group("all", &["/js/a.js", "/js/b.js"], &["/css/site.css", "classpath:css/lib.css"])
        .with_group("admin", &["/js/admin.js"], &[])
        .with_setting("pre-processor-strategies", "semicolonAppender")
        .with_setting("post-processor-strategies", "jsMin, cssMin")
        .build()
}

/// A factory over the webapp's written configuration.
pub fn factory_for(webapp: &TestWebapp) -> Result<Arc<ManagerFactory>> {
    Ok(ManagerFactory::from_config(webapp.config()?)?)
}

/// Process `request` in its own context. Returns the content and published name.
pub async fn serve(
    factory: &Arc<ManagerFactory>,
    request: &str,
) -> assetweave::core::Result<(String, Option<String>)> {
    let scope = factory.establish(request)?;
    let manager = factory.create(&scope)?;
    let bytes = manager.process(request).await?;
    let name = scope.context().response().output_name();
    Ok((String::from_utf8_lossy(&bytes).into_owned(), name))
}

pub fn js(uri: &str) -> Resource {
    Resource::new(uri, ResourceType::Js)
}

pub fn css(uri: &str) -> Resource {
    Resource::new(uri, ResourceType::Css)
}
