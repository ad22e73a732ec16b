//! HTML re-serialization of a parsed body with `img[src]` substitution and
//! visible-text collection in the same walk.

use scraper::{ElementRef, Node};

/// Elements that never carry a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are written verbatim and are not visible.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements that separate words in the visible text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table",
    "td", "th", "tr", "ul",
];

pub(super) struct Serializer<F> {
    pub html: String,
    pub text: String,
    rewrite_src: F,
}

impl<F> Serializer<F>
where
    F: FnMut(&str) -> Option<String>,
{
    /// `rewrite_src` receives every `img` src and returns a replacement, if any.
    pub fn new(rewrite_src: F) -> Self {
        Self { html: String::new(), text: String::new(), rewrite_src }
    }

    pub fn children(&mut self, parent: ElementRef<'_>) {
        let raw = RAW_TEXT_ELEMENTS.contains(&parent.value().name());

        for child in parent.children() {
            match child.value() {
                Node::Text(text) if raw => self.html.push_str(text),
                Node::Text(text) => {
                    escape_text(&mut self.html, text);
                    self.text.push_str(text);
                }
                Node::Comment(comment) => {
                    self.html.push_str("<!--");
                    self.html.push_str(comment);
                    self.html.push_str("-->");
                }
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        self.element(element);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        let block = BLOCK_ELEMENTS.contains(&name);
        if block {
            self.text.push(' ');
        }

        self.html.push('<');
        self.html.push_str(name);
        for (attr, value) in element.value().attrs() {
            let value = match (name, attr) {
                ("img", "src") => (self.rewrite_src)(value).unwrap_or_else(|| value.to_string()),
                _ => value.to_string(),
            };
            self.html.push(' ');
            self.html.push_str(attr);
            self.html.push_str("=\"");
            escape_attr(&mut self.html, &value);
            self.html.push('"');
        }
        self.html.push('>');

        if !VOID_ELEMENTS.contains(&name) {
            if RAW_TEXT_ELEMENTS.contains(&name) {
                // contents are written but excluded from the visible text
                let visible = std::mem::take(&mut self.text);
                self.children(element);
                self.text = visible;
            } else {
                self.children(element);
            }
            self.html.push_str("</");
            self.html.push_str(name);
            self.html.push('>');
        }

        if block {
            self.text.push(' ');
        }
    }
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}
