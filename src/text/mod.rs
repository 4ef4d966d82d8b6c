//! # Token Pipeline
//!
//! The one persisted wire format in the system: `{{dotted.path}}` tokens
//! embedded in element text. Splitting must be lossless (rejoining the
//! segments reproduces the original string byte for byte) because the
//! editor always works on the raw token form and only the renderer ever
//! substitutes values.

use crate::vars::VariableMap;

/// One piece of a split text run, in original order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Segment {
    /// Plain text, rendered as-is.
    Literal { text: String },
    /// A `{{path}}` token. `path` excludes the braces.
    Token { path: String },
}

/// Path characters permitted inside a token: letters, digits, `.`, `_`,
/// `[`, `]`. Anything else leaves the braces as literal text.
fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '[' | ']'))
}

/// Split a text run on `{{...}}` tokens. Segment order and adjacency
/// follow the input exactly; malformed tokens (unclosed braces, empty or
/// illegal paths) stay literal.
pub fn split_tokens(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    loop {
        let Some(open) = rest.find("{{") else {
            literal.push_str(rest);
            break;
        };
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            literal.push_str(rest);
            break;
        };
        let path = &after_open[..close];
        if is_valid_path(path) {
            literal.push_str(&rest[..open]);
            if !literal.is_empty() {
                segments.push(Segment::Literal {
                    text: std::mem::take(&mut literal),
                });
            }
            segments.push(Segment::Token {
                path: path.to_string(),
            });
            rest = &after_open[close + 2..];
        } else {
            // Keep the braces literal and move past them.
            literal.push_str(&rest[..open + 2]);
            rest = after_open;
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal { text: literal });
    }
    segments
}

/// Reassemble segments into the exact original string.
pub fn rejoin(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal { text } => out.push_str(text),
            Segment::Token { path } => {
                out.push_str("{{");
                out.push_str(path);
                out.push_str("}}");
            }
        }
    }
    out
}

/// Replace each token with its resolved display value. Unknown paths stay
/// as the literal token text; a resolution miss is never an error.
pub fn substitute(text: &str, variables: &VariableMap) -> String {
    let mut out = String::new();
    for segment in split_tokens(text) {
        match segment {
            Segment::Literal { text } => out.push_str(&text),
            Segment::Token { path } => match variables.get(&path) {
                Some(entry) => out.push_str(&entry.display_value),
                None => {
                    out.push_str("{{");
                    out.push_str(&path);
                    out.push_str("}}");
                }
            },
        }
    }
    out
}

/// The distinct token paths referenced by a text run, in order of first
/// appearance.
pub fn referenced_paths(text: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for segment in split_tokens(text) {
        if let Segment::Token { path } = segment {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}
