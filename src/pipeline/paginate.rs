//! Pagination: split a message list into pages bounded by a length budget.
//!
//! Length is an *estimate* of rendered height, not a measurement. Code
//! blocks and thinking traces render very differently from prose, so each
//! gets its own adjustment:
//!
//! ```text
//! estimate = chars(content)
//!          + penalty × ⌊fence markers / 2⌋
//!          + round(chars(thinking) × weight)
//! ```
//!
//! Packing is greedy and order-preserving. A page is closed when it already
//! holds a message and the next one would push it past the budget. A single
//! oversized message therefore still gets a page of its own.

use crate::config::ExportConfig;
use crate::model::{Message, Page};
use tracing::debug;

const FENCE: &str = "```";

/// Estimated rendered length of one message, in budget units.
pub fn estimate_length(message: &Message, config: &ExportConfig) -> usize {
    let content = &message.content;
    let mut len = content.chars().count();

    let fences = content.matches(FENCE).count();
    len += (fences / 2) * config.code_block_penalty;

    if let Some(thinking) = message.thinking() {
        let weighted = thinking.chars().count() as f64 * config.thinking_weight;
        len += weighted.round() as usize;
    }

    len
}

/// Split `messages` into ordered, non-overlapping pages.
///
/// Always returns at least one page: an empty list yields a single empty
/// page, so composition can still produce a "no messages" document. When
/// pagination is disabled every message lands on one page.
pub fn paginate<'a>(messages: &'a [Message], config: &ExportConfig) -> Vec<Page<'a>> {
    if messages.is_empty() || !config.paginate {
        return vec![Page {
            index: 1,
            total: 1,
            messages,
        }];
    }

    let budget = config.page_budget;
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    let mut acc = 0usize;

    for (i, msg) in messages.iter().enumerate() {
        let len = estimate_length(msg, config);
        if i > start && acc + len > budget {
            ranges.push((start, i));
            start = i;
            acc = 0;
        }
        acc += len;
    }
    ranges.push((start, messages.len()));

    let total = ranges.len();
    debug!(
        "Paginated {} messages into {} pages (budget {})",
        messages.len(),
        total,
        budget
    );

    ranges
        .into_iter()
        .enumerate()
        .map(|(i, (from, to))| Page {
            index: i + 1,
            total,
            messages: &messages[from..to],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExportConfig {
        ExportConfig::default()
    }

    fn msg_of_len(n: usize) -> Message {
        Message::user("x".repeat(n))
    }

    #[test]
    fn short_conversation_is_one_page() {
        let msgs = vec![Message::user("Hi"), Message::assistant("Hello")];
        let pages = paginate(&msgs, &config());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].messages, &msgs[..]);
        assert_eq!((pages[0].index, pages[0].total), (1, 1));
    }

    #[test]
    fn three_large_messages_split_into_three_pages() {
        let msgs = vec![msg_of_len(900), msg_of_len(900), msg_of_len(900)];
        let pages = paginate(&msgs, &config());
        assert_eq!(pages.len(), 3);
        for (i, p) in pages.iter().enumerate() {
            assert_eq!(p.messages.len(), 1);
            assert_eq!(p.index, i + 1);
            assert_eq!(p.total, 3);
        }
    }

    #[test]
    fn code_block_penalty() {
        let content = "```js\ncode\n```";
        let m = Message::assistant(content);
        assert_eq!(estimate_length(&m, &config()), content.chars().count() + 200);
    }

    #[test]
    fn unpaired_fence_has_no_penalty() {
        let m = Message::assistant("```\nopen only");
        assert_eq!(estimate_length(&m, &config()), 13);
    }

    #[test]
    fn thinking_is_weighted() {
        let m = Message::assistant("ab").with_thinking("x".repeat(100));
        assert_eq!(estimate_length(&m, &config()), 2 + 70);
    }

    #[test]
    fn counts_chars_not_bytes() {
        let m = Message::user("你好");
        assert_eq!(estimate_length(&m, &config()), 2);
    }

    #[test]
    fn empty_list_yields_one_empty_page() {
        let pages = paginate(&[], &config());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].messages.is_empty());
        assert_eq!(pages[0].total, 1);
    }

    #[test]
    fn oversized_message_gets_its_own_page() {
        let msgs = vec![msg_of_len(10), msg_of_len(5000), msg_of_len(10)];
        let pages = paginate(&msgs, &config());
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].messages[0].content.len(), 5000);
    }

    #[test]
    fn pages_partition_the_input() {
        let msgs: Vec<Message> = (0..40).map(|i| msg_of_len(37 * (i % 11) + 50)).collect();
        let cfg = ExportConfig::builder().page_budget(700).build().unwrap();
        let pages = paginate(&msgs, &cfg);

        let rejoined: Vec<&Message> = pages.iter().flat_map(|p| p.messages.iter()).collect();
        assert_eq!(rejoined.len(), msgs.len());
        for (a, b) in rejoined.iter().zip(msgs.iter()) {
            assert!(std::ptr::eq(*a, b));
        }
        for p in &pages {
            assert!(!p.messages.is_empty());
            if p.messages.len() > 1 {
                let sum: usize = p.messages.iter().map(|m| estimate_length(m, &cfg)).sum();
                assert!(sum <= 700, "page {} over budget: {}", p.index, sum);
            }
        }
    }

    #[test]
    fn disabled_pagination_keeps_everything_together() {
        let msgs = vec![msg_of_len(900), msg_of_len(900), msg_of_len(900)];
        let cfg = ExportConfig::builder().paginate(false).build().unwrap();
        let pages = paginate(&msgs, &cfg);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].messages.len(), 3);
    }

    #[test]
    fn deterministic() {
        let msgs: Vec<Message> = (0..25).map(|i| msg_of_len(i * 60)).collect();
        let a: Vec<usize> = paginate(&msgs, &config()).iter().map(|p| p.messages.len()).collect();
        let b: Vec<usize> = paginate(&msgs, &config()).iter().map(|p| p.messages.len()).collect();
        assert_eq!(a, b);
    }
}
