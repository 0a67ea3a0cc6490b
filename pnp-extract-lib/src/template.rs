//! File name templates for extracted cards.
//!
//! Variables are wrapped in braces and use dots for nested fields:
//!
//! ```text
//! output/{pack.code}/{faction_code}/{code} - {title}.png
//! ```
//!
//! Text can be included conditionally on the truthiness of a variable with a
//! question mark, e.g. `{type.is_subtype ? "subtype"}` or
//! `{is_variant ? variant_position}`.
//!
//! The template is split into path components on `/`; slashes and backslashes
//! in substituted values become `-` so a value can never add a directory.

use std::fmt;
use std::path::PathBuf;

use pnp_extract_core::to_plain_string;

use crate::merge::CardMetadata;

pub const DEFAULT_CARD_TEMPLATE: &str = "{cycle.position} {cycle.name}/{pack.position} {pack.name}/{code}{is_variant ? \"-\"}{is_variant ? variant_position} {stripped_title}.png";

pub const DEFAULT_EXTRA_TEMPLATE: &str = "{cycle.position} {cycle.name}/{pack.position} {pack.name}/extra-cards/Page {page_number} Card {card_number}.png";

/// Used instead of the card template when no pack is selected.
pub const NO_PACK_TEMPLATE: &str = "Page {page_number}/Card {card_number}.png";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Var(String),
    Cond { predicate: String, then: Then },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Then {
    Text(String),
    Var(String),
}

/// A parsed file name template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    source: String,
    absolute: bool,
    components: Vec<Vec<Segment>>,
}

impl FilenameTemplate {
    pub fn parse(template: &str) -> Self {
        let absolute = template.starts_with('/');
        let components = template
            .split('/')
            .filter(|part| !part.is_empty())
            .map(parse_component)
            .collect();
        Self {
            source: template.to_string(),
            absolute,
            components,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render the template into a relative path (absolute if the template
    /// starts with `/`).
    pub fn render(&self, meta: &CardMetadata) -> PathBuf {
        let mut path = if self.absolute {
            PathBuf::from("/")
        } else {
            PathBuf::new()
        };
        for component in &self.components {
            let rendered = render_component(component, meta);
            if !rendered.is_empty() {
                path.push(rendered);
            }
        }
        path
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn render_component(segments: &[Segment], meta: &CardMetadata) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Var(path) => out.push_str(&value_of(meta, path)),
            Segment::Cond { predicate, then } => {
                if meta.is_truthy(predicate) {
                    match then {
                        Then::Text(text) => out.push_str(text),
                        Then::Var(path) => out.push_str(&value_of(meta, path)),
                    }
                }
            }
        }
    }
    out.replace(['/', '\\'], "-")
}

fn value_of(meta: &CardMetadata, path: &str) -> String {
    meta.lookup(path).map(to_plain_string).unwrap_or_default()
}

fn parse_component(part: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = part;
    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open..].find('}') else {
            break;
        };
        let inner = &rest[open + 1..open + len];
        if inner.is_empty() {
            push_text(&mut segments, &rest[..open + 2]);
        } else {
            push_text(&mut segments, &rest[..open]);
            segments.push(parse_expr(inner.trim()));
        }
        rest = &rest[open + len + 1..];
    }
    push_text(&mut segments, rest);
    segments
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_string()));
    }
}

/// `pred ? "text"`, `pred ? some.path` or a plain `some.path`.
fn parse_expr(expr: &str) -> Segment {
    if let Some((predicate, then)) = expr.split_once('?') {
        let predicate = predicate.trim();
        let then = then.trim_start();
        if !predicate.is_empty() {
            if let Some(text) = quoted(then) {
                return Segment::Cond {
                    predicate: predicate.to_string(),
                    then: Then::Text(text.to_string()),
                };
            }
            if is_path(then) {
                return Segment::Cond {
                    predicate: predicate.to_string(),
                    then: Then::Var(then.to_string()),
                };
            }
        }
    }
    Segment::Var(expr.to_string())
}

fn quoted(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    (!inner.contains('"')).then_some(inner)
}

fn is_path(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|word| {
            !word.is_empty() && word.chars().all(|c| c.is_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
#[path = "tests/template_tests.rs"]
mod tests;
