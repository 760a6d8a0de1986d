//! Inline markup accepted by output lines.
//!
//! Output content is raw markup: a handful of style tags, `<br>` breaks and
//! HTML entities. Unknown tags are dropped and their inner text kept.
//! Nothing here sanitizes; hosts that print untrusted text call [`escape`].

use scraper::{Html, Node};

/// Style flags carried by one text fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// One parsed piece of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Styled run of literal text.
    Text { text: String, style: SpanStyle },
    /// Forced line break (`<br>`).
    Break,
}

/// Parse markup into text fragments and breaks.
///
/// Markup goes through an HTML fragment parser, so a `<` that does not open
/// a tag, bare `&` and every named entity behave as they do in a browser.
pub fn parse(markup: &str) -> Vec<Fragment> {
    let fragment = Html::parse_fragment(markup);
    let mut out = Vec::new();
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => {
                let style = node
                    .ancestors()
                    .filter_map(|ancestor| ancestor.value().as_element())
                    .fold(SpanStyle::default(), |style, element| {
                        apply_tag(style, element.name())
                    });
                push_text(&mut out, &**text, style);
            }
            Node::Element(element) if element.name() == "br" => out.push(Fragment::Break),
            _ => {}
        }
    }
    out
}

fn apply_tag(mut style: SpanStyle, name: &str) -> SpanStyle {
    match name {
        "b" | "strong" => style.bold = true,
        "i" | "em" => style.italic = true,
        "u" => style.underline = true,
        _ => {}
    }
    style
}

/// Rendered text of a markup string: tags stripped, entities decoded, and
/// `<br>` turned into `\n`.
pub fn plain_text(markup: &str) -> String {
    let mut out = String::new();
    for fragment in parse(markup) {
        match fragment {
            Fragment::Text { text, .. } => out.push_str(&text),
            Fragment::Break => out.push('\n'),
        }
    }
    out
}

/// Escape literal text so it renders verbatim as markup.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(ch),
        }
    }
    out
}

fn push_text(out: &mut Vec<Fragment>, text: &str, style: SpanStyle) {
    if text.is_empty() {
        return;
    }
    if let Some(Fragment::Text {
        text: previous,
        style: previous_style,
    }) = out.last_mut()
    {
        if *previous_style == style {
            previous.push_str(text);
            return;
        }
    }
    out.push(Fragment::Text {
        text: text.to_string(),
        style,
    });
}
