//! Placeholder protection for embedded markup fragments.
//!
//! Chat bodies often carry literal `<svg>…</svg>` blocks. The Markdown pass
//! would split them at blank lines, escape their attributes, or wrap their
//! children in paragraphs. Each fragment is therefore swapped for an opaque
//! token before conversion and swapped back afterwards:
//!
//! ```text
//! "a <svg>…</svg> b" ──protect──▶ "a \_\_SVG\_PLACEHOLDER\_0\_\_ b" + [token → fragment]
//!                                     │
//!                                  markdown
//!                                     ▼
//! "<p>a <svg style=…>…</svg> b</p>" ◀──restore── "<p>a __SVG_PLACEHOLDER_0__ b</p>"
//! ```
//!
//! Every underscore of the token is backslash-escaped in the protected text,
//! so the Markdown pass emits it as literal text and never as emphasis, even
//! when tokens are adjacent or touch punctuation. Inside code spans, code
//! blocks and raw HTML the escapes survive verbatim; restore matches that
//! form as well.
//!
//! ## Limitations
//!
//! Fragments are located by a first-opener-to-next-closer scan. Nested
//! same-kind fragments are rejected with [`SanitizeError::Nested`] rather than
//! half-matched; [`Sanitizer::protect`] then returns the text untouched.

use crate::error::SanitizeError;
use tracing::warn;

/// Inline style injected into restored SVG openers so they scale with the page.
pub const RESPONSIVE_SVG_STYLE: &str =
    r#"style="max-width:100%;height:auto;display:block;margin:16px auto;""#;

/// One protected fragment.
///
/// `placeholder` is the token as it reads after Markdown conversion; the
/// protected text carries its [`escaped`](Fragment::escaped) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub placeholder: String,
    pub original: String,
}

impl Fragment {
    /// The token with every underscore backslash-escaped.
    pub fn escaped(&self) -> String {
        escape_underscores(&self.placeholder)
    }
}

/// Result of [`Sanitizer::protect`]: placeholder-bearing text plus the mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Protected {
    pub text: String,
    pub fragments: Vec<Fragment>,
}

impl Protected {
    /// A no-op protection: the text as-is with no fragments.
    pub fn passthrough(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fragments: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Substitute every placeholder in `transformed` with its original fragment.
    ///
    /// When `opening_attr` is given it is inserted right after the tag name of
    /// each fragment's opening tag. Tokens the transformation dropped are
    /// skipped.
    pub fn restore(&self, transformed: &str, opening_attr: Option<&str>) -> String {
        let mut out = transformed.to_string();
        for frag in &self.fragments {
            let replacement = match opening_attr {
                Some(attr) => inject_attr(&frag.original, attr),
                None => frag.original.clone(),
            };
            // The escaped form never contains the bare one, so order is free.
            for token in [frag.escaped(), frag.placeholder.clone()] {
                if out.contains(&token) {
                    out = out.replace(&token, &replacement);
                }
            }
        }
        out
    }
}

/// Protects one kind of fragment (one tag name).
#[derive(Debug, Clone)]
pub struct Sanitizer {
    tag: &'static str,
    kind: &'static str,
}

impl Sanitizer {
    /// `tag` is the lowercase element name; `kind` names the placeholder family.
    pub const fn new(tag: &'static str, kind: &'static str) -> Self {
        Self { tag, kind }
    }

    /// SVG fragments in message bodies.
    pub const fn svg() -> Self {
        Self::new("svg", "SVG")
    }

    /// SVG fragments in thinking traces. A separate family keeps the two
    /// mappings from ever resolving each other's tokens.
    pub const fn thinking_svg() -> Self {
        Self::new("svg", "THINKING_SVG")
    }

    /// Best-effort protection. Malformed input comes back untouched.
    pub fn protect(&self, input: &str) -> Protected {
        match self.try_protect(input) {
            Ok(p) => p,
            Err(e) => {
                warn!("Fragment protection skipped: {}", e);
                Protected::passthrough(input)
            }
        }
    }

    /// Strict protection, reporting malformed or nested fragments.
    pub fn try_protect(&self, input: &str) -> Result<Protected, SanitizeError> {
        // ASCII lowercasing keeps byte offsets identical to `input`.
        let lower = input.to_ascii_lowercase();
        let opener = format!("<{}", self.tag);
        let closer = format!("</{}>", self.tag);
        let prefix = self.placeholder_prefix(input);

        let mut text = String::with_capacity(input.len());
        let mut fragments = Vec::new();
        let mut cursor = 0;

        while let Some(start) = find_opener(&lower, &opener, cursor) {
            let tag_end = lower[start..]
                .find('>')
                .map(|i| start + i)
                .ok_or(SanitizeError::Unterminated {
                    tag: self.tag,
                    offset: start,
                })?;

            let end = if lower[..tag_end].ends_with('/') {
                tag_end + 1
            } else {
                let close = lower[tag_end..]
                    .find(&closer)
                    .map(|i| tag_end + i)
                    .ok_or(SanitizeError::Unterminated {
                        tag: self.tag,
                        offset: start,
                    })?;
                if let Some(nested) = find_opener(&lower[..close], &opener, tag_end + 1) {
                    return Err(SanitizeError::Nested {
                        tag: self.tag,
                        offset: nested,
                    });
                }
                close + closer.len()
            };

            let placeholder = format!("{prefix}{}__", fragments.len());
            text.push_str(&input[cursor..start]);
            text.push_str(&escape_underscores(&placeholder));
            fragments.push(Fragment {
                placeholder,
                original: input[start..end].to_string(),
            });
            cursor = end;
        }
        text.push_str(&input[cursor..]);

        Ok(Protected { text, fragments })
    }

    /// `__KIND_PLACEHOLDER_`, salted if the input already contains that text
    /// in bare or escaped form.
    fn placeholder_prefix(&self, input: &str) -> String {
        let unescaped = input.replace('\\', "");
        let mut prefix = format!("__{}_PLACEHOLDER_", self.kind);
        let mut salt = 1usize;
        while unescaped.contains(&prefix) {
            prefix = format!("__{}{}_PLACEHOLDER_", self.kind, salt);
            salt += 1;
        }
        prefix
    }
}

fn escape_underscores(token: &str) -> String {
    token.replace('_', "\\_")
}

/// Find `<tag` at or after `from` where the next byte ends the tag name.
fn find_opener(lower: &str, opener: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while pos <= lower.len() {
        let idx = pos + lower[pos..].find(opener)?;
        let after = lower.as_bytes().get(idx + opener.len()).copied();
        match after {
            Some(b) if b.is_ascii_whitespace() || b == b'>' || b == b'/' => return Some(idx),
            _ => pos = idx + opener.len(),
        }
    }
    None
}

/// Insert ` attr` right after the tag name of the fragment's opening tag.
fn inject_attr(fragment: &str, attr: &str) -> String {
    let name_end = fragment
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_ascii_whitespace() || *c == '>' || *c == '/')
        .map(|(i, _)| i)
        .unwrap_or(fragment.len());
    format!("{} {}{}", &fragment[..name_end], attr, &fragment[name_end..])
}
