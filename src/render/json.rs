//! JSON event handlers.
//!
//! Every block becomes an object with a `"_"` type tag, optional detail
//! fields and a `"children"` array:
//!
//! ```text
//! {"_": "doc", "children": [
//!     {"_": "h", "level": 1, "children": [
//!         "Hello ",
//!         "<em>",
//!         "world",
//!         "</em>"
//!     ]}
//! ]}
//! ```
//!
//! Spans are not structured: their opening and closing markup is written as
//! separate strings among the text, so concatenating consecutive strings
//! yields the inline HTML.

use crate::buffer::Buffer;
use crate::encode::{
    REPLACEMENT_CHARACTER, decode_entity_html, decode_entity_json, escape_html, escape_json,
    escape_url,
};
use crate::event::{Attribute, Block, EventHandler, Flow, Segment, Span, TextKind};

const INDENT: &[u8] = b"                ";
const INDENT_WIDTH: usize = 4;

/// How literal attribute text is escaped inside span markup.
#[derive(Clone, Copy)]
enum Context {
    Url,
    HtmlAttribute,
}

/// Writes a JSON document tree for a stream of events.
///
/// Call [`finish`](Self::finish) after the last event to drop the trailing
/// separator.
pub struct JsonRenderer<'o> {
    out: &'o mut Buffer,
    start: usize,
    depth: usize,
    scratch: Buffer,
}

impl<'o> JsonRenderer<'o> {
    pub fn new(out: &'o mut Buffer) -> Self {
        let start = out.len();
        Self {
            out,
            start,
            depth: 0,
            scratch: Buffer::new(),
        }
    }

    /// Complete the document and return the number of bytes written.
    pub fn finish(mut self) -> usize {
        self.retract_separator();
        self.out.len() - self.start
    }

    fn retract_separator(&mut self) {
        if self.out.len() > self.start && self.out.last() == Some(b',') {
            self.out.retract(1);
        }
    }

    fn newline(&mut self) {
        // Nothing precedes the root object
        if self.out.len() == self.start {
            return;
        }
        self.out.push(b'\n');
        let mut indent = self.depth * INDENT_WIDTH;
        while indent > 0 {
            let n = indent.min(INDENT.len());
            self.out.append(&INDENT[..n]);
            indent -= n;
        }
    }

    fn type_start(&mut self, name: &str) {
        self.out.append_str("{\"_\": \"");
        self.out.append_str(name);
        self.out.push(b'"');
    }

    fn field_uint(&mut self, key: &str, value: u64) {
        self.out.append_str(", \"");
        self.out.append_str(key);
        self.out.append_str("\": ");
        self.out.append_uint(value, 10);
    }

    fn field_true(&mut self, key: &str) {
        self.out.append_str(", \"");
        self.out.append_str(key);
        self.out.append_str("\": true");
    }

    fn field_char(&mut self, key: &str, value: u8) {
        self.out.append_str(", \"");
        self.out.append_str(key);
        self.out.append_str("\": \"");
        escape_json(self.out, &[value]);
        self.out.push(b'"');
    }

    fn field_str(&mut self, key: &str, value: &str) {
        self.out.append_str(", \"");
        self.out.append_str(key);
        self.out.append_str("\": \"");
        self.out.append_str(value);
        self.out.push(b'"');
    }

    fn field_attribute(&mut self, key: &str, attr: &Attribute<'_>) {
        self.out.append_str(", \"");
        self.out.append_str(key);
        self.out.append_str("\": \"");
        for segment in attr.segments() {
            match *segment {
                Segment::Literal(text) => escape_json(self.out, text),
                Segment::Entity(text) => decode_entity_json(self.out, text),
                Segment::NullChar => self.out.append(&REPLACEMENT_CHARACTER),
            }
        }
        self.out.push(b'"');
    }

    /// Begin a string element of the current children array.
    fn open_string(&mut self) {
        self.newline();
        self.out.push(b'"');
    }

    fn close_string(&mut self) {
        self.out.append_str("\",");
    }

    /// Write `markup` as its own string element.
    fn markup(&mut self, markup: &str) {
        self.open_string();
        escape_json(self.out, markup.as_bytes());
        self.close_string();
    }

    /// Append an attribute escaped for HTML markup, then for JSON.
    fn markup_attribute(&mut self, attr: &Attribute<'_>, context: Context) {
        self.scratch.reset();
        for segment in attr.segments() {
            match (*segment, context) {
                (Segment::Literal(text), Context::Url) => escape_url(&mut self.scratch, text),
                (Segment::Literal(text), Context::HtmlAttribute) => {
                    escape_html(&mut self.scratch, text)
                }
                (Segment::Entity(text), _) => decode_entity_html(&mut self.scratch, text),
                (Segment::NullChar, _) => self.scratch.append(&REPLACEMENT_CHARACTER),
            }
        }
        escape_json(self.out, self.scratch.as_bytes());
    }

    fn open_span(&mut self, span: &Span<'_>) {
        let tag = match span {
            Span::Emphasis => "<em>",
            Span::Strong => "<b>",
            Span::Underline => "<u>",
            Span::Code => "<code>",
            Span::Strikethrough => "<del>",
            Span::LatexMath => "<x-equation>",
            Span::LatexMathDisplay => "<x-equation type=\"display\">",
            Span::Link(detail) => {
                self.open_string();
                escape_json(self.out, b"<a href=\"");
                self.markup_attribute(&detail.href, Context::Url);
                if let Some(title) = &detail.title {
                    escape_json(self.out, b"\" title=\"");
                    self.markup_attribute(title, Context::HtmlAttribute);
                }
                escape_json(self.out, b"\">");
                self.close_string();
                return;
            }
            Span::Image(detail) => {
                self.open_string();
                escape_json(self.out, b"<img src=\"");
                self.markup_attribute(&detail.src, Context::Url);
                escape_json(self.out, b"\" alt=\"");
                self.close_string();
                return;
            }
            Span::WikiLink(detail) => {
                self.open_string();
                escape_json(self.out, b"<x-wikilink data-target=\"");
                self.markup_attribute(&detail.target, Context::HtmlAttribute);
                escape_json(self.out, b"\">");
                self.close_string();
                return;
            }
        };
        self.markup(tag);
    }

    fn close_span(&mut self, span: &Span<'_>) {
        let tag = match span {
            Span::Emphasis => "</em>",
            Span::Strong => "</b>",
            Span::Underline => "</u>",
            Span::Link(_) => "</a>",
            Span::Code => "</code>",
            Span::Strikethrough => "</del>",
            Span::LatexMath | Span::LatexMathDisplay => "</x-equation>",
            Span::WikiLink(_) => "</x-wikilink>",
            Span::Image(detail) => {
                self.open_string();
                if let Some(title) = &detail.title {
                    escape_json(self.out, b"\" title=\"");
                    self.markup_attribute(title, Context::HtmlAttribute);
                }
                escape_json(self.out, b"\">");
                self.close_string();
                return;
            }
        };
        self.markup(tag);
    }
}

impl EventHandler for JsonRenderer<'_> {
    fn enter_block(&mut self, block: &Block<'_>) -> Flow {
        self.newline();
        self.depth += 1;
        match block {
            Block::Document => self.type_start("doc"),
            Block::Quote => self.type_start("quote"),
            Block::UnorderedList(detail) => {
                self.type_start("ul");
                if detail.is_tight {
                    self.field_true("tight");
                }
                self.field_char("mark", detail.mark);
            }
            Block::OrderedList(detail) => {
                self.type_start("ol");
                if detail.start != 1 {
                    self.field_uint("start", u64::from(detail.start));
                }
                if detail.is_tight {
                    self.field_true("tight");
                }
                self.field_char("delimiter", detail.delimiter);
            }
            Block::ListItem(detail) if detail.is_task => {
                self.type_start("task");
                if detail.is_checked() {
                    self.field_true("complete");
                }
            }
            Block::ListItem(_) => self.type_start("li"),
            Block::ThematicBreak => self.type_start("hr"),
            Block::Heading { level } => {
                self.type_start("h");
                self.field_uint("level", u64::from(*level));
            }
            Block::CodeBlock(detail) => {
                self.type_start("code");
                if !detail.lang.is_empty() {
                    self.field_attribute("lang", &detail.lang);
                }
                if !detail.info.is_empty() {
                    self.field_attribute("info", &detail.info);
                }
            }
            Block::Html => self.type_start("html"),
            Block::Paragraph => self.type_start("p"),
            Block::Table => self.type_start("table"),
            Block::TableHead => self.type_start("thead"),
            Block::TableBody => self.type_start("tbody"),
            Block::TableRow => self.type_start("tr"),
            Block::TableHeaderCell(align) | Block::TableCell(align) => {
                let name = if matches!(block, Block::TableHeaderCell(_)) { "th" } else { "td" };
                self.type_start(name);
                if let Some(align) = align.as_str() {
                    self.field_str("align", align);
                }
            }
        }
        self.out.append_str(", \"children\": [");
        Ok(())
    }

    fn leave_block(&mut self, _block: &Block<'_>) -> Flow {
        self.depth = self.depth.saturating_sub(1);
        self.retract_separator();
        self.newline();
        self.out.append_str("]},");
        Ok(())
    }

    fn enter_span(&mut self, span: &Span<'_>) -> Flow {
        self.open_span(span);
        Ok(())
    }

    fn leave_span(&mut self, span: &Span<'_>) -> Flow {
        self.close_span(span);
        Ok(())
    }

    fn text(&mut self, kind: TextKind, text: &[u8]) -> Flow {
        match kind {
            // Soft breaks would only add empty strings
            TextKind::SoftBreak => return Ok(()),
            TextKind::Html => {
                self.newline();
                self.out.append_str("{\"_\": \"html\", \"content\": \"");
                escape_json(self.out, text);
                self.out.append_str("\"},");
                return Ok(());
            }
            _ => {}
        }
        self.open_string();
        match kind {
            TextKind::NullChar => self.out.append(&REPLACEMENT_CHARACTER),
            TextKind::Break => self.out.append_str("\\n"),
            TextKind::Entity => decode_entity_json(self.out, text),
            _ => escape_json(self.out, text),
        }
        self.close_string();
        Ok(())
    }
}
