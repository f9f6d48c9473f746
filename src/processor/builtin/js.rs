//! JavaScript stages and the encoding-level `bomStripper`.

use crate::core::{Resource, ResourceType};
use crate::injector::InjectionTarget;
use crate::processor::Processor;

const BOM: char = '\u{feff}';

/// Drops a leading byte order mark.
#[derive(Debug, Default)]
pub struct BomStripper;

impl BomStripper {
    pub const ALIAS: &'static str = "bomStripper";
}

impl InjectionTarget for BomStripper {}

impl Processor for BomStripper {
    fn name(&self) -> &str {
        Self::ALIAS
    }

    fn process(&self, _resource: &Resource, content: &str) -> anyhow::Result<String> {
        Ok(content.strip_prefix(BOM).unwrap_or(content).to_string())
    }
}

/// Terminates scripts with `;` so merged files cannot run into each other.
#[derive(Debug, Default)]
pub struct SemicolonAppender;

impl SemicolonAppender {
    pub const ALIAS: &'static str = "semicolonAppender";
}

impl InjectionTarget for SemicolonAppender {}

impl Processor for SemicolonAppender {
    fn name(&self) -> &str {
        Self::ALIAS
    }

    fn process(&self, _resource: &Resource, content: &str) -> anyhow::Result<String> {
        let trimmed = content.trim_end();
        if trimmed.is_empty() || trimmed.ends_with(';') {
            Ok(content.to_string())
        } else {
            Ok(format!("{trimmed};"))
        }
    }

    fn supported_type(&self) -> Option<ResourceType> {
        Some(ResourceType::Js)
    }
}

/// Conservative JavaScript minimizer.
///
/// Removes comments and redundant whitespace while keeping line breaks, so automatic
/// semicolon insertion behaves as in the source. String, template and regular
/// expression literals are copied verbatim.
#[derive(Debug, Default)]
pub struct JsMin;

impl JsMin {
    pub const ALIAS: &'static str = "jsMin";
}

impl InjectionTarget for JsMin {}

impl Processor for JsMin {
    fn name(&self) -> &str {
        Self::ALIAS
    }

    fn process(&self, _resource: &Resource, content: &str) -> anyhow::Result<String> {
        Ok(minify(content))
    }

    fn supported_type(&self) -> Option<ResourceType> {
        Some(ResourceType::Js)
    }

    fn is_minimizer(&self) -> bool {
        true
    }
}

fn minify(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = Whitespace::new(source.len());
    let mut last: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '"' | '\'' | '`' => {
                let end = skip_string(&chars, i);
                out.push_verbatim(&chars[i..end]);
                last = Some(c);
                i = end;
            }
            '/' if next == Some('/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if next == Some('*') => {
                let end = find_comment_end(&chars, i + 2);
                if chars[i..end].contains(&'\n') {
                    out.newline();
                } else {
                    out.space();
                }
                i = end;
            }
            '/' if regex_allowed(last) => {
                let end = skip_regex(&chars, i);
                out.push_verbatim(&chars[i..end]);
                last = Some('/');
                i = end;
            }
            '\n' => {
                out.newline();
                i += 1;
            }
            c if c.is_whitespace() => {
                out.space();
                i += 1;
            }
            c => {
                out.push(c);
                last = Some(c);
                i += 1;
            }
        }
    }

    out.finish()
}

/// Output buffer collapsing whitespace runs and dropping blank lines.
struct Whitespace {
    out: String,
    pending: Option<char>,
}

impl Whitespace {
    fn new(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            pending: None,
        }
    }

    fn space(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(' ');
        }
    }

    fn newline(&mut self) {
        self.pending = Some('\n');
    }

    fn flush(&mut self) {
        if let Some(ws) = self.pending.take() {
            if !self.out.is_empty() {
                self.out.push(ws);
            }
        }
    }

    fn push(&mut self, c: char) {
        self.flush();
        self.out.push(c);
    }

    fn push_verbatim(&mut self, chars: &[char]) {
        self.flush();
        self.out.extend(chars);
    }

    fn finish(self) -> String {
        self.out
    }
}

fn regex_allowed(last: Option<char>) -> bool {
    last.is_none_or(|c| "(,=:[!&|?{};+-*%<>~^".contains(c))
}

fn skip_string(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut j = start + 1;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            c if c == quote => return j + 1,
            '\n' if quote != '`' => return j,
            _ => j += 1,
        }
    }
    chars.len()
}

fn skip_regex(chars: &[char], start: usize) -> usize {
    let mut j = start + 1;
    let mut in_class = false;
    while j < chars.len() {
        match chars[j] {
            '\\' => {
                j += 2;
                continue;
            }
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                j += 1;
                while j < chars.len() && chars[j].is_ascii_alphabetic() {
                    j += 1;
                }
                return j;
            }
            '\n' => return j,
            _ => {}
        }
        j += 1;
    }
    chars.len()
}

pub(super) fn find_comment_end(chars: &[char], from: usize) -> usize {
    let mut j = from;
    while j + 1 < chars.len() {
        if chars[j] == '*' && chars[j + 1] == '/' {
            return j + 2;
        }
        j += 1;
    }
    chars.len()
}

pub(super) fn skip_quoted(chars: &[char], start: usize) -> usize {
    skip_string(chars, start).min(chars.len())
}
