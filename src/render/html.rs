//! HTML event handlers.

use crate::buffer::Buffer;
use crate::encode::{REPLACEMENT_CHARACTER, append_slug, decode_entity_html, escape_html};
use crate::event::{
    Attribute, Block, CodeBlockDetail, EventHandler, Flow, ImageDetail, LinkDetail,
    ListItemDetail, OrderedListDetail, Segment, Span, TextKind,
};

use super::{CodeBlockTransform, RenderFlags};

/// Writes HTML for a stream of events.
///
/// Besides the output buffer the renderer keeps a little state across
/// events: how deep it is inside image labels (where markup collapses to
/// plain alt text), whether a heading is waiting for its anchor, and the
/// captured text of the current code block when a transform is set.
pub struct HtmlRenderer<'o, 't> {
    out: &'o mut Buffer,
    flags: RenderFlags,
    transform: Option<&'t mut dyn CodeBlockTransform>,
    image_nesting: u32,
    pending_anchor: bool,
    code_block_nesting: u32,
    capture: Buffer,
    slug: Buffer,
}

impl<'o, 't> HtmlRenderer<'o, 't> {
    pub fn new(out: &'o mut Buffer, flags: RenderFlags) -> Self {
        Self {
            out,
            flags,
            transform: None,
            image_nesting: 0,
            pending_anchor: false,
            code_block_nesting: 0,
            capture: Buffer::new(),
            slug: Buffer::new(),
        }
    }

    /// Run code block text through `transform` instead of escaping it.
    pub fn with_transform(mut self, transform: &'t mut dyn CodeBlockTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    #[inline]
    fn xhtml(&self) -> bool {
        self.flags.contains(RenderFlags::XHTML)
    }

    fn literal(&mut self, text: &str) {
        self.out.append_str(text);
    }

    fn attribute(&mut self, attr: &Attribute<'_>) {
        for segment in attr.segments() {
            match *segment {
                Segment::Literal(text) => escape_html(self.out, text),
                Segment::Entity(text) => decode_entity_html(self.out, text),
                Segment::NullChar => self.out.append(&REPLACEMENT_CHARACTER),
            }
        }
    }

    fn anchor(&mut self, text: &[u8]) {
        self.slug.reset();
        if append_slug(&mut self.slug, text) == 0 {
            return;
        }
        self.out.append_str("<a id=\"");
        self.out.append(self.slug.as_bytes());
        self.out
            .append_str("\" class=\"anchor\" aria-hidden=\"true\" href=\"#");
        self.out.append(self.slug.as_bytes());
        self.out.append_str("\"></a>");
    }

    // ------------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------------

    fn open_ordered_list(&mut self, detail: &OrderedListDetail) {
        if detail.start == 1 {
            self.literal("<ol>\n");
        } else {
            self.literal("<ol start=\"");
            self.out.append_uint(u64::from(detail.start), 10);
            self.literal("\">\n");
        }
    }

    fn open_list_item(&mut self, detail: &ListItemDetail) {
        if !detail.is_task {
            self.literal("<li>");
            return;
        }
        self.literal("<li class=\"task-list-item\"><input type=\"checkbox\" disabled");
        if detail.is_checked() {
            self.literal(" checked");
        }
        self.literal(if self.xhtml() { "/>" } else { ">" });
    }

    fn open_code_block(&mut self, detail: &CodeBlockDetail<'_>) {
        self.literal("<pre><code");
        if !detail.lang.is_empty() {
            self.literal(" class=\"language-");
            self.attribute(&detail.lang);
            self.out.push(b'"');
        }
        self.out.push(b'>');
        self.code_block_nesting += 1;
    }

    fn close_code_block(&mut self, detail: &CodeBlockDetail<'_>) {
        self.code_block_nesting = self.code_block_nesting.saturating_sub(1);
        if let Some(transform) = self.transform.as_deref_mut() {
            let lang = detail.lang.flatten();
            match transform.transform(&lang, self.capture.as_bytes()) {
                Some(formatted) => self.out.append(&formatted),
                None => {
                    tracing::debug!(
                        lang = %String::from_utf8_lossy(&lang),
                        "code block transform declined, escaping"
                    );
                    escape_html(self.out, self.capture.as_bytes());
                }
            }
            self.capture.reset();
        }
        self.literal("</code></pre>\n");
    }

    fn open_cell(&mut self, tag: &str, align: Option<&str>) {
        self.out.push(b'<');
        self.literal(tag);
        if let Some(align) = align {
            self.literal(" align=\"");
            self.literal(align);
            self.out.push(b'"');
        }
        self.out.push(b'>');
    }

    fn heading_tag(&mut self, level: u8, close: bool) {
        self.literal(if close { "</h" } else { "<h" });
        self.out.append_uint(u64::from(level.clamp(1, 6)), 10);
        self.literal(if close { ">\n" } else { ">" });
    }

    // ------------------------------------------------------------------------
    // Spans
    // ------------------------------------------------------------------------

    fn open_link(&mut self, detail: &LinkDetail<'_>) {
        self.literal("<a href=\"");
        if self.flags.contains(RenderFlags::ALLOW_JS_URI)
            || !detail.href.starts_with_ignore_case(b"javascript:")
        {
            self.attribute(&detail.href);
        }
        if let Some(title) = &detail.title {
            self.literal("\" title=\"");
            self.attribute(title);
        }
        self.literal("\">");
    }

    fn open_image(&mut self, detail: &ImageDetail<'_>) {
        self.literal("<img src=\"");
        self.attribute(&detail.src);
        self.literal("\" alt=\"");
    }

    fn close_image(&mut self, detail: &ImageDetail<'_>) {
        if let Some(title) = &detail.title {
            self.literal("\" title=\"");
            self.attribute(title);
        }
        self.literal(if self.xhtml() { "\"/>" } else { "\">" });
    }
}

impl EventHandler for HtmlRenderer<'_, '_> {
    fn enter_block(&mut self, block: &Block<'_>) -> Flow {
        match block {
            Block::Document | Block::Html => {}
            Block::Quote => self.literal("<blockquote>\n"),
            Block::UnorderedList(_) => self.literal("<ul>\n"),
            Block::OrderedList(detail) => self.open_ordered_list(detail),
            Block::ListItem(detail) => self.open_list_item(detail),
            Block::ThematicBreak => self.literal(if self.xhtml() { "<hr/>\n" } else { "<hr>\n" }),
            Block::Heading { level } => {
                self.heading_tag(*level, false);
                self.pending_anchor = !self.flags.contains(RenderFlags::NO_HEADLINE_ANCHORS);
            }
            Block::CodeBlock(detail) => self.open_code_block(detail),
            Block::Paragraph => self.literal("<p>"),
            Block::Table => self.literal("<table>\n"),
            Block::TableHead => self.literal("<thead>\n"),
            Block::TableBody => self.literal("<tbody>\n"),
            Block::TableRow => self.literal("<tr>\n"),
            Block::TableHeaderCell(align) => self.open_cell("th", align.as_str()),
            Block::TableCell(align) => self.open_cell("td", align.as_str()),
        }
        Ok(())
    }

    fn leave_block(&mut self, block: &Block<'_>) -> Flow {
        match block {
            Block::Document | Block::Html | Block::ThematicBreak => {}
            Block::Quote => self.literal("</blockquote>\n"),
            Block::UnorderedList(_) => self.literal("</ul>\n"),
            Block::OrderedList(_) => self.literal("</ol>\n"),
            Block::ListItem(_) => self.literal("</li>\n"),
            Block::Heading { level } => {
                // A heading without text never consumed its anchor
                self.pending_anchor = false;
                self.heading_tag(*level, true);
            }
            Block::CodeBlock(detail) => self.close_code_block(detail),
            Block::Paragraph => self.literal("</p>\n"),
            Block::Table => self.literal("</table>\n"),
            Block::TableHead => self.literal("</thead>\n"),
            Block::TableBody => self.literal("</tbody>\n"),
            Block::TableRow => self.literal("</tr>\n"),
            Block::TableHeaderCell(_) => self.literal("</th>\n"),
            Block::TableCell(_) => self.literal("</td>\n"),
        }
        Ok(())
    }

    fn enter_span(&mut self, span: &Span<'_>) -> Flow {
        // Inside an image label only text survives, as alt text
        if self.image_nesting > 0 {
            if matches!(span, Span::Image(_)) {
                self.image_nesting += 1;
            }
            return Ok(());
        }
        match span {
            Span::Emphasis => self.literal("<em>"),
            Span::Strong => self.literal("<b>"),
            Span::Underline => self.literal("<u>"),
            Span::Link(detail) => self.open_link(detail),
            Span::Image(detail) => {
                self.open_image(detail);
                self.image_nesting = 1;
            }
            Span::Code => self.literal("<code>"),
            Span::Strikethrough => self.literal("<del>"),
            Span::LatexMath => self.literal("<x-equation>"),
            Span::LatexMathDisplay => self.literal("<x-equation type=\"display\">"),
            Span::WikiLink(detail) => {
                self.literal("<x-wikilink data-target=\"");
                self.attribute(&detail.target);
                self.literal("\">");
            }
        }
        Ok(())
    }

    fn leave_span(&mut self, span: &Span<'_>) -> Flow {
        if self.image_nesting > 0 {
            if let Span::Image(detail) = span {
                if self.image_nesting == 1 {
                    self.close_image(detail);
                }
                self.image_nesting -= 1;
            }
            return Ok(());
        }
        match span {
            Span::Emphasis => self.literal("</em>"),
            Span::Strong => self.literal("</b>"),
            Span::Underline => self.literal("</u>"),
            Span::Link(_) => self.literal("</a>"),
            // Closed above while the nesting counter was still set
            Span::Image(_) => {}
            Span::Code => self.literal("</code>"),
            Span::Strikethrough => self.literal("</del>"),
            Span::LatexMath | Span::LatexMathDisplay => self.literal("</x-equation>"),
            Span::WikiLink(_) => self.literal("</x-wikilink>"),
        }
        Ok(())
    }

    fn text(&mut self, kind: TextKind, text: &[u8]) -> Flow {
        if self.code_block_nesting > 0 && self.transform.is_some() {
            match kind {
                TextKind::NullChar => self.capture.append(&REPLACEMENT_CHARACTER),
                _ => self.capture.append(text),
            }
            return Ok(());
        }

        // An anchor cannot go inside an alt attribute; wait for text after the image
        if self.pending_anchor && self.image_nesting == 0 {
            self.pending_anchor = false;
            if !matches!(kind, TextKind::NullChar | TextKind::Break | TextKind::SoftBreak) {
                self.anchor(text);
            }
        }

        let in_image = self.image_nesting > 0;
        match kind {
            TextKind::NullChar => self.out.append(&REPLACEMENT_CHARACTER),
            TextKind::Break if in_image => self.out.push(b' '),
            TextKind::Break => self.literal(if self.xhtml() { "<br/>\n" } else { "<br>\n" }),
            TextKind::SoftBreak => self.out.push(if in_image { b' ' } else { b'\n' }),
            TextKind::Html => self.out.append(text),
            TextKind::Entity => decode_entity_html(self.out, text),
            TextKind::Normal | TextKind::Code | TextKind::LatexMath => escape_html(self.out, text),
        }
        Ok(())
    }
}
