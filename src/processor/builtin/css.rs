//! Stylesheet stages.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::core::resource::strip_query;
use crate::core::{Resource, ResourceType};
use crate::injector::InjectionTarget;
use crate::processor::Processor;

use super::js::{find_comment_end, skip_quoted};

static VARIABLES_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@variables\s*[^{]*\{([^}]*)\}").expect("valid variables pattern"));
static VARIABLE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\(\s*([A-Za-z0-9_-]+)\s*\)").expect("valid reference pattern"));
static URL_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*(['"]?)([^'")]+)(['"]?)\s*\)"#).expect("valid url pattern"));

/// Stylesheet minimizer: drops comments, collapses whitespace, removes redundant `;`.
#[derive(Debug, Default)]
pub struct CssMin;

impl CssMin {
    pub const ALIAS: &'static str = "cssMin";
}

impl InjectionTarget for CssMin {}

impl Processor for CssMin {
    fn name(&self) -> &str {
        Self::ALIAS
    }

    fn process(&self, _resource: &Resource, content: &str) -> anyhow::Result<String> {
        Ok(minify(content))
    }

    fn supported_type(&self) -> Option<ResourceType> {
        Some(ResourceType::Css)
    }

    fn is_minimizer(&self) -> bool {
        true
    }
}

const TIGHT_AFTER: &[char] = &['{', '}', ';', ',', '>', ':'];
const TIGHT_BEFORE: &[char] = &['{', '}', ';', ',', '>'];

fn minify(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut pending_space = false;
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            i = find_comment_end(&chars, i + 2);
            pending_space = true;
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            i += 1;
            continue;
        }

        if c == '}' && out.ends_with(';') {
            out.pop();
        }
        let tight = TIGHT_BEFORE.contains(&c) || (c == ':' && depth > 0);
        if pending_space && !out.is_empty() && !out.ends_with(TIGHT_AFTER) && !tight {
            out.push(' ');
        }
        pending_space = false;

        match c {
            '"' | '\'' => {
                let end = skip_quoted(&chars, i);
                out.extend(&chars[i..end]);
                i = end;
                continue;
            }
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        out.push(c);
        i += 1;
    }

    out
}

/// Expands `@variables { name: value; }` blocks into `var(name)` references.
///
/// Blocks are removed from the output. Later definitions override earlier ones;
/// references to undefined variables are left as written.
#[derive(Debug, Default)]
pub struct CssVariables;

impl CssVariables {
    pub const ALIAS: &'static str = "cssVariables";
}

impl InjectionTarget for CssVariables {}

impl Processor for CssVariables {
    fn name(&self) -> &str {
        Self::ALIAS
    }

    fn process(&self, resource: &Resource, content: &str) -> anyhow::Result<String> {
        let blocks = &*VARIABLES_BLOCK;
        let references = &*VARIABLE_REFERENCE;

        let mut variables = HashMap::new();
        for block in blocks.captures_iter(content) {
            for declaration in block[1].split(';') {
                if let Some((name, value)) = declaration.split_once(':') {
                    variables.insert(name.trim().to_string(), value.trim().to_string());
                }
            }
        }

        let stripped = blocks.replace_all(content, "");
        let expanded = references.replace_all(&stripped, |caps: &Captures<'_>| {
            match variables.get(&caps[1]) {
                Some(value) => value.clone(),
                None => {
                    warn!("Undefined css variable '{}' in '{}'", &caps[1], resource.uri);
                    caps[0].to_string()
                }
            }
        });
        Ok(expanded.into_owned())
    }

    fn supported_type(&self) -> Option<ResourceType> {
        Some(ResourceType::Css)
    }
}

/// Rewrites relative `url()` references against the folder of the stylesheet.
///
/// Only stylesheets served from the web root or an absolute url are rewritten;
/// classpath stylesheets have no public location to rewrite against.
#[derive(Debug, Default)]
pub struct CssUrlRewriting;

impl CssUrlRewriting {
    pub const ALIAS: &'static str = "cssUrlRewriting";
}

impl InjectionTarget for CssUrlRewriting {}

impl Processor for CssUrlRewriting {
    fn name(&self) -> &str {
        Self::ALIAS
    }

    fn process(&self, resource: &Resource, content: &str) -> anyhow::Result<String> {
        if resource.uri.starts_with("classpath:") {
            return Ok(content.to_string());
        }
        let rewritten = URL_REFERENCE.replace_all(content, |caps: &Captures<'_>| {
            let target = caps[2].trim();
            if is_absolute(target) {
                caps[0].to_string()
            } else {
                format!("url({}{}{})", &caps[1], resolve_relative(&resource.uri, target), &caps[3])
            }
        });
        Ok(rewritten.into_owned())
    }

    fn supported_type(&self) -> Option<ResourceType> {
        Some(ResourceType::Css)
    }
}

fn is_absolute(uri: &str) -> bool {
    uri.starts_with('/')
        || uri.starts_with('#')
        || uri.starts_with("data:")
        || uri.starts_with("classpath:")
        || uri.starts_with("file:")
        || uri.contains("://")
}

/// Resolve `relative` against the folder containing `base`.
///
/// Absolute references are returned unchanged. `.` and `..` segments are collapsed
/// without ever climbing above the root of `base`.
pub(crate) fn resolve_relative(base: &str, relative: &str) -> String {
    if is_absolute(relative) {
        return relative.to_string();
    }
    let (origin, path) = split_origin(strip_query(base));
    let folder = path.rfind('/').map_or("", |i| &path[..=i]);
    format!("{origin}{}", normalize(&format!("{folder}{relative}")))
}

fn split_origin(uri: &str) -> (&str, &str) {
    if let Some(rest) = uri.strip_prefix("classpath:") {
        return ("classpath:", rest);
    }
    if let Some(scheme_end) = uri.find("://") {
        let host_start = scheme_end + 3;
        return match uri[host_start..].find('/') {
            Some(i) => uri.split_at(host_start + i),
            None => (uri, "/"),
        };
    }
    if let Some(rest) = uri.strip_prefix("file:") {
        return ("file:", rest);
    }
    ("", uri)
}

fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "." => {}
            ".." => {
                if segments.last().is_some_and(|s| !s.is_empty()) {
                    segments.pop();
                }
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
