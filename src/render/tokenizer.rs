//! Tokenizer and pairing parser for the chat markup subset.
//!
//! Supported: line breaks, `**bold**` / `__bold__`, `*italic*` / `_italic_`,
//! `***both***` / `___both___`, and `` `code` ``.
//!
//! Precedence rules:
//! - code spans are atomic; markers inside backticks stay literal
//! - a marker run of length 1 is italic, 2 is bold, 3 is bold wrapping italic;
//!   runs of 4 or more are literal text
//! - an opening run pairs with the next run of the same character and length;
//!   runs in between nest inside it, unpaired runs are literal
//! - `_` follows exactly the same rules as `*`

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Break,
    Code(String),
    Marker { ch: char, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Break,
    Code(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
}

const MAX_MARKER_RUN: usize = 3;

pub fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];
        match ch {
            '\r' if chars.get(index + 1) == Some(&'\n') => {
                flush_text(&mut text, &mut tokens);
                tokens.push(Token::Break);
                index += 2;
            }
            '\n' => {
                flush_text(&mut text, &mut tokens);
                tokens.push(Token::Break);
                index += 1;
            }
            '`' => {
                let close = chars[index + 1..]
                    .iter()
                    .position(|candidate| *candidate == '`')
                    .map(|offset| index + 1 + offset);
                match close {
                    Some(close) if close > index + 1 => {
                        flush_text(&mut text, &mut tokens);
                        tokens.push(Token::Code(chars[index + 1..close].iter().collect()));
                        index = close + 1;
                    }
                    Some(close) => {
                        text.push_str("``");
                        index = close + 1;
                    }
                    None => {
                        text.push('`');
                        index += 1;
                    }
                }
            }
            '*' | '_' => {
                let len = chars[index..]
                    .iter()
                    .take_while(|candidate| **candidate == ch)
                    .count();
                if len <= MAX_MARKER_RUN {
                    flush_text(&mut text, &mut tokens);
                    tokens.push(Token::Marker { ch, len });
                } else {
                    text.extend(std::iter::repeat(ch).take(len));
                }
                index += len;
            }
            _ => {
                text.push(ch);
                index += 1;
            }
        }
    }

    flush_text(&mut text, &mut tokens);
    tokens
}

pub fn parse(tokens: &[Token]) -> Vec<Inline> {
    parse_range(tokens, 0, tokens.len())
}

fn parse_range(tokens: &[Token], start: usize, end: usize) -> Vec<Inline> {
    let mut nodes = Vec::new();
    let mut index = start;

    while index < end {
        match &tokens[index] {
            Token::Text(text) => push_text(&mut nodes, text),
            Token::Break => nodes.push(Inline::Break),
            Token::Code(code) => nodes.push(Inline::Code(code.clone())),
            Token::Marker { ch, len } => {
                if let Some(close) = find_closer(tokens, index + 1, end, *ch, *len) {
                    let inner = parse_range(tokens, index + 1, close);
                    nodes.push(wrap(*len, inner));
                    index = close + 1;
                    continue;
                }
                push_text(&mut nodes, &marker_text(*ch, *len));
            }
        }
        index += 1;
    }

    nodes
}

fn find_closer(tokens: &[Token], from: usize, end: usize, ch: char, len: usize) -> Option<usize> {
    (from..end).find(|candidate| {
        matches!(
            &tokens[*candidate],
            Token::Marker { ch: other_ch, len: other_len } if *other_ch == ch && *other_len == len
        )
    })
}

fn wrap(len: usize, inner: Vec<Inline>) -> Inline {
    match len {
        1 => Inline::Emphasis(inner),
        2 => Inline::Strong(inner),
        _ => Inline::Strong(vec![Inline::Emphasis(inner)]),
    }
}

fn marker_text(ch: char, len: usize) -> String {
    std::iter::repeat(ch).take(len).collect()
}

fn push_text(nodes: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(previous)) = nodes.last_mut() {
        previous.push_str(text);
    } else {
        nodes.push(Inline::Text(text.to_string()));
    }
}

fn flush_text(text: &mut String, tokens: &mut Vec<Token>) {
    if !text.is_empty() {
        tokens.push(Token::Text(std::mem::take(text)));
    }
}
