//! Response rendering: chat text to escaped HTML markup.

pub mod markup;
pub mod tokenizer;

pub use markup::{escape_html, render, render_turn, render_with_attachments, Markup};
pub use tokenizer::{Inline, Token};
