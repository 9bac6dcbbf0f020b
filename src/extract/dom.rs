//! Shared helpers for the HTML-snapshot extractors.

use super::{iso8601, PageSnapshot};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::model::{Conversation, Message, Role, ServiceId};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;

/// Parse the snapshot, run `parse`, and wrap the turns in a conversation.
///
/// The parsed document never outlives this call, so callers can hold the
/// result across `.await` points.
pub(super) fn conversation_from_dom(
    service: ServiceId,
    snapshot: &PageSnapshot,
    config: &ExportConfig,
    parse: fn(&Html) -> Vec<Message>,
) -> Result<Conversation, ExportError> {
    let messages = {
        let doc = Html::parse_document(&snapshot.html);
        parse(&doc)
    };
    debug!("{}: {} candidate turns", service, messages.len());

    let convo = Conversation::new(
        service,
        snapshot.title.trim(),
        iso8601(config.now()),
        messages,
    );
    if convo.is_empty() {
        return Err(ExportError::ExtractionEmpty { service });
    }
    Ok(convo)
}

pub(super) fn has_class(el: &ElementRef<'_>, names: &[&str]) -> bool {
    el.value().classes().any(|c| names.contains(&c))
}

/// Matches of `sel` under `root`, minus any nested inside another match.
pub(super) fn outermost<'a>(root: ElementRef<'a>, sel: &Selector) -> Vec<ElementRef<'a>> {
    let found: Vec<ElementRef<'a>> = root.select(sel).collect();
    let ids: HashSet<_> = found.iter().map(|e| e.id()).collect();
    found
        .into_iter()
        .filter(|e| !e.ancestors().any(|a| ids.contains(&a.id())))
        .collect()
}

/// First element matching any selector, in selector order.
pub(super) fn first_of<'a>(doc: &'a Html, selectors: &[&Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|s| doc.select(s).next())
}

/// Role from explicit markers, else by position (even = user).
pub(super) fn role_or_alternate(explicit: Option<Role>, index: usize) -> Role {
    explicit.unwrap_or(if index % 2 == 0 {
        Role::User
    } else {
        Role::Assistant
    })
}

/// A turn's body: its inner HTML, trimmed.
pub(super) fn body(el: &ElementRef<'_>) -> String {
    el.inner_html().trim().to_string()
}

pub(super) fn message(role: Role, content: String) -> Message {
    Message {
        role,
        content,
        thinking_content: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static DIV_MSG: Lazy<Selector> =
        Lazy::new(|| Selector::parse(r#"div[class*="message"]"#).unwrap());

    #[test]
    fn outermost_drops_nested_matches() {
        let doc = Html::parse_document(
            r#"<main>
                 <div class="message a"><div class="message-content">x</div></div>
                 <div class="message b"></div>
               </main>"#,
        );
        let root = doc.root_element();
        let found = outermost(root, &DIV_MSG);
        assert_eq!(found.len(), 2);
        assert!(has_class(&found[0], &["a"]));
        assert!(has_class(&found[1], &["b"]));
    }

    #[test]
    fn alternating_roles() {
        assert_eq!(role_or_alternate(None, 0), Role::User);
        assert_eq!(role_or_alternate(None, 1), Role::Assistant);
        assert_eq!(role_or_alternate(Some(Role::User), 1), Role::User);
    }
}
