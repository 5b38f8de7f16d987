//! Rich text blocks and their HTML rendering
//!
//! Mirrors the structured content the API serves: typed blocks carrying
//! a flat text string plus styling spans given as character ranges over
//! it. Rendering is a pure function from blocks to markup.

use serde::Deserialize;

use crate::helpers::html_escape;

/// One rich text block
///
/// Unknown block types decode to [`Block::Unknown`] and render to
/// nothing rather than failing the whole document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    Heading1 {
        text: String,
        #[serde(default)]
        spans: Vec<Span>,
    },
    Heading2 {
        text: String,
        #[serde(default)]
        spans: Vec<Span>,
    },
    Heading3 {
        text: String,
        #[serde(default)]
        spans: Vec<Span>,
    },
    Heading4 {
        text: String,
        #[serde(default)]
        spans: Vec<Span>,
    },
    Heading5 {
        text: String,
        #[serde(default)]
        spans: Vec<Span>,
    },
    Heading6 {
        text: String,
        #[serde(default)]
        spans: Vec<Span>,
    },
    Paragraph {
        text: String,
        #[serde(default)]
        spans: Vec<Span>,
    },
    Preformatted {
        text: String,
        #[serde(default)]
        spans: Vec<Span>,
    },
    ListItem {
        text: String,
        #[serde(default)]
        spans: Vec<Span>,
    },
    OListItem {
        text: String,
        #[serde(default)]
        spans: Vec<Span>,
    },
    Image {
        url: Option<String>,
        alt: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// One styling span, in character offsets over the block text
///
/// Span types beyond `strong`, `em`, and `hyperlink` are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub span_type: String,
    #[serde(default)]
    pub data: Option<SpanData>,
}

/// Extra payload of a hyperlink span
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpanData {
    pub url: Option<String>,
}

/// Render blocks to HTML
///
/// Consecutive unordered list items collapse into one `<ul>` and
/// consecutive ordered ones into one `<ol>`.
pub fn as_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut i = 0;

    while i < blocks.len() {
        match &blocks[i] {
            Block::ListItem { .. } => {
                out.push_str("<ul>");
                while let Some(Block::ListItem { text, spans }) = blocks.get(i) {
                    out.push_str("<li>");
                    out.push_str(&spans_to_html(text, spans));
                    out.push_str("</li>");
                    i += 1;
                }
                out.push_str("</ul>");
            }
            Block::OListItem { .. } => {
                out.push_str("<ol>");
                while let Some(Block::OListItem { text, spans }) = blocks.get(i) {
                    out.push_str("<li>");
                    out.push_str(&spans_to_html(text, spans));
                    out.push_str("</li>");
                    i += 1;
                }
                out.push_str("</ol>");
            }
            block => {
                render_block(block, &mut out);
                i += 1;
            }
        }
    }

    out
}

/// Plain text of the blocks, one block per line
pub fn as_text(blocks: &[Block]) -> String {
    let parts: Vec<&str> = blocks.iter().filter_map(text_of).collect();
    parts.join("\n")
}

fn text_of(block: &Block) -> Option<&str> {
    match block {
        Block::Heading1 { text, .. }
        | Block::Heading2 { text, .. }
        | Block::Heading3 { text, .. }
        | Block::Heading4 { text, .. }
        | Block::Heading5 { text, .. }
        | Block::Heading6 { text, .. }
        | Block::Paragraph { text, .. }
        | Block::Preformatted { text, .. }
        | Block::ListItem { text, .. }
        | Block::OListItem { text, .. } => Some(text),
        Block::Image { .. } | Block::Unknown => None,
    }
}

fn render_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading1 { text, spans } => wrap(out, "h1", text, spans),
        Block::Heading2 { text, spans } => wrap(out, "h2", text, spans),
        Block::Heading3 { text, spans } => wrap(out, "h3", text, spans),
        Block::Heading4 { text, spans } => wrap(out, "h4", text, spans),
        Block::Heading5 { text, spans } => wrap(out, "h5", text, spans),
        Block::Heading6 { text, spans } => wrap(out, "h6", text, spans),
        Block::Paragraph { text, spans } => wrap(out, "p", text, spans),
        Block::Preformatted { text, .. } => {
            out.push_str("<pre>");
            out.push_str(&html_escape(text));
            out.push_str("</pre>");
        }
        Block::Image { url, alt } => {
            let src = url.as_deref().unwrap_or("");
            let alt = alt.as_deref().unwrap_or("");
            out.push_str(&format!(
                r#"<img src="{}" alt="{}">"#,
                html_escape(src),
                html_escape(alt)
            ));
        }
        // list items are grouped by the caller
        Block::ListItem { .. } | Block::OListItem { .. } | Block::Unknown => {}
    }
}

fn wrap(out: &mut String, tag: &str, text: &str, spans: &[Span]) {
    out.push_str(&format!("<{}>", tag));
    out.push_str(&spans_to_html(text, spans));
    out.push_str(&format!("</{}>", tag));
}

/// Apply spans to a block's text
///
/// Walks character boundaries emitting closes before opens at equal
/// positions so adjacent spans do not cross. Offsets past the end of
/// the text clamp to it.
fn spans_to_html(text: &str, spans: &[Span]) -> String {
    if spans.is_empty() {
        return html_escape(text);
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(text.len() + spans.len() * 16);

    for idx in 0..=len {
        for span in spans.iter().rev() {
            if span.end.min(len) == idx && span.start.min(len) < idx {
                out.push_str(close_tag(span));
            }
        }
        for span in spans {
            if span.start.min(len) == idx && span.end.min(len) > idx {
                out.push_str(&open_tag(span));
            }
        }
        if let Some(&c) = chars.get(idx) {
            push_escaped(&mut out, c);
        }
    }

    out
}

fn open_tag(span: &Span) -> String {
    match span.span_type.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let url = span
                .data
                .as_ref()
                .and_then(|d| d.url.as_deref())
                .unwrap_or("#");
            format!(r#"<a href="{}">"#, html_escape(url))
        }
        _ => String::new(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.span_type.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        _ => "",
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}
