//! Localised labels for rendered documents and transcripts.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Output language for document chrome and transcript headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

/// Every user-visible fixed string, per locale.
#[derive(Debug)]
pub struct Labels {
    pub default_title: &'static str,
    pub default_service: &'static str,
    pub code: &'static str,
    pub user_name: &'static str,
    pub assistant_name: &'static str,
    pub thinking: &'static str,
    pub prev_page: &'static str,
    pub next_page: &'static str,
    pub footer: &'static str,
    pub footer_tag: &'static str,
    pub empty_page: &'static str,
    pub chat_log: &'static str,
    pub all_chats: &'static str,
    pub date: &'static str,
    pub export_date: &'static str,
    pub transcript_user: &'static str,
    pub transcript_ai: &'static str,
    pub chat: &'static str,
    pub untitled: &'static str,
    pub current_chat: &'static str,
    pub clipboard_fallback: &'static str,
    pub no_messages: &'static str,
    pub export_success: &'static str,
    pub export_failed: &'static str,
    pub image_success: &'static str,
    pub image_failed: &'static str,
}

static EN: Labels = Labels {
    default_title: "AI Conversation",
    default_service: "AI Assistant",
    code: "code",
    user_name: "Me",
    assistant_name: "AI",
    thinking: "Thinking",
    prev_page: "Previous",
    next_page: "Next",
    footer: "Full conversation record",
    footer_tag: "AI generated",
    empty_page: "No messages in this conversation.",
    chat_log: "Chat Log",
    all_chats: "All Chats",
    date: "Date",
    export_date: "Export date",
    transcript_user: "User",
    transcript_ai: "AI",
    chat: "Chat",
    untitled: "Untitled chat",
    current_chat: "Current chat",
    clipboard_fallback: "Copying images is not supported here; the image was downloaded instead.",
    no_messages: "No chat messages found on this page.",
    export_success: "Export complete",
    export_failed: "Export failed",
    image_success: "Image generated",
    image_failed: "Image generation failed",
};

static ZH: Labels = Labels {
    default_title: "智能对话记录",
    default_service: "智能对话助手",
    code: "代码",
    user_name: "我",
    assistant_name: "AI",
    thinking: "思考过程",
    prev_page: "上一页",
    next_page: "下一页",
    footer: "对话记录完整展示",
    footer_tag: "AI智能生成",
    empty_page: "当前对话没有消息。",
    chat_log: "聊天记录",
    all_chats: "所有聊天记录",
    date: "日期",
    export_date: "导出日期",
    transcript_user: "用户",
    transcript_ai: "AI",
    chat: "聊天",
    untitled: "未命名聊天",
    current_chat: "当前聊天",
    clipboard_fallback: "当前环境不支持复制图片，已改为下载图片。",
    no_messages: "未找到聊天消息。",
    export_success: "导出成功",
    export_failed: "导出失败",
    image_success: "图片生成成功",
    image_failed: "生成图片失败",
};

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

impl Locale {
    pub fn labels(&self) -> &'static Labels {
        match self {
            Locale::En => &EN,
            Locale::Zh => &ZH,
        }
    }

    /// Long date used in document chrome ("October 18, 2026" / "2026年10月18日").
    pub fn long_date(&self, at: DateTime<Utc>) -> String {
        match self {
            Locale::En => format!(
                "{} {}, {}",
                MONTHS[at.month0() as usize],
                at.day(),
                at.year()
            ),
            Locale::Zh => format!("{}年{}月{}日", at.year(), at.month(), at.day()),
        }
    }

    /// Date and time used in transcripts.
    pub fn date_time(&self, at: DateTime<Utc>) -> String {
        match self {
            Locale::En => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            Locale::Zh => at.format("%Y/%m/%d %H:%M:%S").to_string(),
        }
    }

    /// Page indicator ("Page 2/5" / "第 2/5 页").
    pub fn page_indicator(&self, index: usize, total: usize) -> String {
        match self {
            Locale::En => format!("Page {index}/{total}"),
            Locale::Zh => format!("第 {index}/{total} 页"),
        }
    }
}
