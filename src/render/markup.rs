use std::fmt;

use chat_backend::Attachment;

use crate::core::transcript::Turn;
use crate::render::tokenizer::{parse, tokenize, Inline};

pub const ATTACHMENT_LABEL: &str = "Attachments:";
pub const DOWNLOAD_ACTION_LABEL: &str = "Download";

/// Escaped, display-ready HTML fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escapes every character that is significant in HTML text or attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Renders chat text. All text is escaped before any markup is produced.
pub fn render(text: &str) -> Markup {
    let mut out = String::with_capacity(text.len());
    write_inlines(&mut out, &parse(&tokenize(text)));
    Markup(out)
}

/// Renders chat text followed by an attachment list when `attachments` is non-empty.
pub fn render_with_attachments(text: &str, attachments: &[Attachment]) -> Markup {
    let mut markup = render(text);
    write_attachment_list(&mut markup.0, attachments);
    markup
}

/// Renders one transcript turn. Error turns are escaped verbatim, without
/// markup interpretation.
pub fn render_turn(turn: &Turn) -> Markup {
    if !turn.is_error {
        return render_with_attachments(&turn.text, &turn.attachments);
    }

    let mut out = String::new();
    out.push_str("<div class=\"error-message\">");
    out.push_str(&escape_html(&turn.text));
    out.push_str("</div>");
    write_attachment_list(&mut out, &turn.attachments);
    Markup(out)
}

fn write_inlines(out: &mut String, nodes: &[Inline]) {
    for node in nodes {
        match node {
            Inline::Text(text) => out.push_str(&escape_html(text)),
            Inline::Break => out.push_str("<br>"),
            Inline::Code(code) => {
                out.push_str("<code>");
                out.push_str(&escape_html(code).replace('\n', "<br>"));
                out.push_str("</code>");
            }
            Inline::Strong(children) => {
                out.push_str("<strong>");
                write_inlines(out, children);
                out.push_str("</strong>");
            }
            Inline::Emphasis(children) => {
                out.push_str("<em>");
                write_inlines(out, children);
                out.push_str("</em>");
            }
        }
    }
}

fn write_attachment_list(out: &mut String, attachments: &[Attachment]) {
    if attachments.is_empty() {
        return;
    }

    out.push_str("<div class=\"attachment-list\"><div><strong>");
    out.push_str(ATTACHMENT_LABEL);
    out.push_str("</strong></div>");
    for attachment in attachments {
        out.push_str("<div class=\"attachment-item\"><span class=\"attachment-name\">");
        out.push_str(&escape_html(&attachment.filename));
        out.push_str("</span><button class=\"download-btn\" data-message-id=\"");
        out.push_str(&escape_html(&attachment.message_id));
        out.push_str("\" data-attachment-id=\"");
        out.push_str(&escape_html(&attachment.attachment_id));
        out.push_str("\" data-filename=\"");
        out.push_str(&escape_html(&attachment.filename));
        out.push_str("\">");
        out.push_str(DOWNLOAD_ACTION_LABEL);
        out.push_str("</button></div>");
    }
    out.push_str("</div>");
}
