//! Markdown parsing into render events.
//!
//! `pulldown-cmark` does the actual parsing. This module reshapes its event
//! stream into the [`Event`](crate::event::Event) model: a `Document` block
//! around everything, explicit table head rows and body sections, list
//! tightness and markers read from the source, task markers folded into
//! list items, and code/math spans as span + text + span.

use std::borrow::Cow;
use std::ops::Range;

use bitflags::bitflags;
use pulldown_cmark::{
    Alignment as MdAlignment, CodeBlockKind, CowStr, Event as MdEvent, LinkType, Options, Parser,
    Tag,
};

use crate::encode::scan_entity;
use crate::error::{Error, Result};
use crate::event::{
    Abort, Alignment, Attribute, Block, CodeBlockDetail, EventHandler, Flow, ImageDetail,
    LinkDetail, ListItemDetail, OrderedListDetail, Segment, Span, TextKind, UnorderedListDetail,
    WikiLinkDetail,
};

bitflags! {
    /// Markdown dialect switches.
    ///
    /// Bit values are shared with the numeric host interface.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParseFlags: u32 {
        /// Collapse whitespace runs in plain text into a single space.
        const COLLAPSE_WHITESPACE = 0x0001;
        /// Allow ATX headings without a space after the `#` run.
        const PERMISSIVE_ATX_HEADERS = 0x0002;
        /// Recognize bare URLs as links.
        const PERMISSIVE_URL_AUTO_LINKS = 0x0004;
        /// Recognize bare e-mail addresses as links.
        const PERMISSIVE_EMAIL_AUTO_LINKS = 0x0008;
        const NO_INDENTED_CODE_BLOCKS = 0x0010;
        /// Render raw HTML blocks as escaped text.
        const NO_HTML_BLOCKS = 0x0020;
        /// Render inline raw HTML as escaped text.
        const NO_HTML_SPANS = 0x0040;
        const TABLES = 0x0100;
        const STRIKETHROUGH = 0x0200;
        /// Recognize `www.` prefixed text as links.
        const PERMISSIVE_WWW_AUTOLINKS = 0x0400;
        const TASK_LISTS = 0x0800;
        /// `$inline$` and `$$display$$` math.
        const LATEX_MATH_SPANS = 0x1000;
        /// `[[target]]` and `[[target|label]]` links.
        const WIKI_LINKS = 0x2000;
        /// `_text_` is underline instead of emphasis.
        const UNDERLINE = 0x4000;

        const NO_HTML = Self::NO_HTML_BLOCKS.bits() | Self::NO_HTML_SPANS.bits();
        /// GitHub-flavored defaults.
        const DEFAULT = Self::COLLAPSE_WHITESPACE.bits()
            | Self::PERMISSIVE_ATX_HEADERS.bits()
            | Self::PERMISSIVE_URL_AUTO_LINKS.bits()
            | Self::STRIKETHROUGH.bits()
            | Self::TABLES.bits()
            | Self::TASK_LISTS.bits();
    }
}

/// Flags the pulldown-cmark backend has no equivalent for.
const UNSUPPORTED: ParseFlags = ParseFlags::PERMISSIVE_ATX_HEADERS
    .union(ParseFlags::PERMISSIVE_URL_AUTO_LINKS)
    .union(ParseFlags::PERMISSIVE_EMAIL_AUTO_LINKS)
    .union(ParseFlags::PERMISSIVE_WWW_AUTOLINKS)
    .union(ParseFlags::NO_INDENTED_CODE_BLOCKS);

impl Default for ParseFlags {
    fn default() -> Self {
        ParseFlags::DEFAULT
    }
}

impl ParseFlags {
    fn options(self) -> Options {
        let mut options = Options::empty();
        if self.contains(ParseFlags::TABLES) {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.contains(ParseFlags::STRIKETHROUGH) {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.contains(ParseFlags::TASK_LISTS) {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.contains(ParseFlags::LATEX_MATH_SPANS) {
            options.insert(Options::ENABLE_MATH);
        }
        if self.contains(ParseFlags::WIKI_LINKS) {
            options.insert(Options::ENABLE_WIKILINKS);
        }
        options
    }
}

/// Parse `input` and report its structure to `handler`.
///
/// Returns [`Error::Parse`] if the handler aborts.
pub fn parse<H>(input: &str, flags: ParseFlags, handler: &mut H) -> Result<()>
where
    H: EventHandler + ?Sized,
{
    let ignored = flags & UNSUPPORTED;
    if !ignored.is_empty() {
        tracing::debug!(flags = ?ignored, "ignoring parse flags the markdown backend does not support");
    }

    let steps = collect_steps(input, flags.options());
    let mut driver = Driver {
        source: input.as_bytes(),
        steps: &steps,
        flags,
        stack: Vec::new(),
        table: None,
        code_depth: 0,
    };
    driver
        .run(handler)
        .map_err(|Abort| Error::Parse("aborted by event handler".to_string()))
}

// ============================================================================
// Event collection
// ============================================================================

/// A pulldown-cmark event with its source range.
struct Step<'a> {
    event: MdEvent<'a>,
    range: Range<usize>,
    /// Text produced by decoding a character reference that spans the whole range.
    entity: bool,
}

/// Run the parser to completion, merging consecutive plain-text events.
fn collect_steps(input: &str, options: Options) -> Vec<Step<'_>> {
    let source = input.as_bytes();
    let mut steps: Vec<Step<'_>> = Vec::new();
    for (event, range) in Parser::new_ext(input, options).into_offset_iter() {
        let entity = match &event {
            MdEvent::Text(text) => is_decoded_entity(source, &range, text),
            _ => false,
        };
        if let MdEvent::Text(text) = &event
            && !entity
            && let Some(prev) = steps.last_mut()
            && !prev.entity
            && let MdEvent::Text(prev_text) = &mut prev.event
        {
            let mut merged = String::with_capacity(prev_text.len() + text.len());
            merged.push_str(prev_text);
            merged.push_str(text);
            *prev_text = CowStr::from(merged);
            prev.range.end = range.end;
            continue;
        }
        steps.push(Step {
            event,
            range,
            entity,
        });
    }
    steps
}

fn is_decoded_entity(source: &[u8], range: &Range<usize>, text: &str) -> bool {
    let Some(raw) = source.get(range.clone()) else {
        return false;
    };
    raw.first() == Some(&b'&') && scan_entity(raw) == Some(raw.len()) && raw != text.as_bytes()
}

// ============================================================================
// Driver
// ============================================================================

/// An element entered but not yet left.
enum Open<'e> {
    Block(Block<'e>),
    Span(Span<'e>),
    /// A table head; the head row is synthesized around its cells.
    TableHead,
    /// Something without a counterpart in the event model.
    Ignored,
}

struct TableState<'e> {
    alignments: &'e [MdAlignment],
    in_head: bool,
    in_body: bool,
    column: usize,
}

struct Driver<'a, 'e> {
    source: &'e [u8],
    steps: &'e [Step<'a>],
    flags: ParseFlags,
    stack: Vec<Open<'e>>,
    table: Option<TableState<'e>>,
    code_depth: usize,
}

impl<'a: 'e, 'e> Driver<'a, 'e> {
    fn run<H: EventHandler + ?Sized>(&mut self, handler: &mut H) -> Flow {
        handler.enter_block(&Block::Document)?;
        for index in 0..self.steps.len() {
            self.step(index, handler)?;
        }
        // Close anything the event stream left open
        while !self.stack.is_empty() {
            self.end(handler)?;
        }
        handler.leave_block(&Block::Document)
    }

    fn step<H: EventHandler + ?Sized>(&mut self, index: usize, handler: &mut H) -> Flow {
        let steps = self.steps;
        let step = &steps[index];
        match &step.event {
            MdEvent::Start(tag) => self.start(index, tag, handler),
            MdEvent::End(_) => self.end(handler),
            MdEvent::Text(text) => {
                if step.entity {
                    let raw = &self.source[step.range.clone()];
                    return handler.text(TextKind::Entity, raw);
                }
                if self.code_depth > 0 {
                    return emit_text(handler, TextKind::Code, text.as_bytes());
                }
                let text = if self.flags.contains(ParseFlags::COLLAPSE_WHITESPACE) {
                    collapse_whitespace(text.as_bytes())
                } else {
                    Cow::Borrowed(text.as_bytes())
                };
                emit_text(handler, TextKind::Normal, &text)
            }
            MdEvent::Code(text) => {
                self.wrapped(Span::Code, TextKind::Code, text.as_bytes(), handler)
            }
            MdEvent::InlineMath(text) => {
                self.wrapped(Span::LatexMath, TextKind::LatexMath, text.as_bytes(), handler)
            }
            MdEvent::DisplayMath(text) => self.wrapped(
                Span::LatexMathDisplay,
                TextKind::LatexMath,
                text.as_bytes(),
                handler,
            ),
            MdEvent::Html(text) => {
                let kind = if self.flags.contains(ParseFlags::NO_HTML_BLOCKS) {
                    TextKind::Normal
                } else {
                    TextKind::Html
                };
                emit_text(handler, kind, text.as_bytes())
            }
            MdEvent::InlineHtml(text) => {
                let kind = if self.flags.contains(ParseFlags::NO_HTML_SPANS) {
                    TextKind::Normal
                } else {
                    TextKind::Html
                };
                emit_text(handler, kind, text.as_bytes())
            }
            MdEvent::SoftBreak => handler.text(TextKind::SoftBreak, b"\n"),
            MdEvent::HardBreak => handler.text(TextKind::Break, b"\n"),
            MdEvent::Rule => {
                handler.enter_block(&Block::ThematicBreak)?;
                handler.leave_block(&Block::ThematicBreak)
            }
            // Folded into the enclosing list item
            MdEvent::TaskListMarker(_) => Ok(()),
            _ => Ok(()),
        }
    }

    fn wrapped<H: EventHandler + ?Sized>(
        &mut self,
        span: Span<'e>,
        kind: TextKind,
        text: &[u8],
        handler: &mut H,
    ) -> Flow {
        handler.enter_span(&span)?;
        emit_text(handler, kind, text)?;
        handler.leave_span(&span)
    }

    fn start<H: EventHandler + ?Sized>(
        &mut self,
        index: usize,
        tag: &'e Tag<'a>,
        handler: &mut H,
    ) -> Flow {
        let range = self.steps[index].range.clone();
        let open = match tag {
            Tag::Paragraph => Open::Block(Block::Paragraph),
            Tag::Heading { level, .. } => Open::Block(Block::Heading {
                level: *level as u8,
            }),
            Tag::BlockQuote(_) => Open::Block(Block::Quote),
            Tag::CodeBlock(kind) => {
                self.code_depth += 1;
                Open::Block(Block::CodeBlock(self.code_block(kind, &range)))
            }
            Tag::HtmlBlock if self.flags.contains(ParseFlags::NO_HTML_BLOCKS) => {
                Open::Block(Block::Paragraph)
            }
            Tag::HtmlBlock => Open::Block(Block::Html),
            Tag::List(Some(start)) => Open::Block(Block::OrderedList(OrderedListDetail {
                start: u32::try_from(*start).unwrap_or(u32::MAX),
                is_tight: self.is_tight(index),
                delimiter: self.list_marker(&range, true),
            })),
            Tag::List(None) => Open::Block(Block::UnorderedList(UnorderedListDetail {
                is_tight: self.is_tight(index),
                mark: self.list_marker(&range, false),
            })),
            Tag::Item => Open::Block(Block::ListItem(self.task_marker(index))),
            Tag::Table(alignments) => {
                self.table = Some(TableState {
                    alignments: alignments.as_slice(),
                    in_head: false,
                    in_body: false,
                    column: 0,
                });
                Open::Block(Block::Table)
            }
            Tag::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = true;
                    table.column = 0;
                }
                handler.enter_block(&Block::TableHead)?;
                handler.enter_block(&Block::TableRow)?;
                self.stack.push(Open::TableHead);
                return Ok(());
            }
            Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.column = 0;
                    if !table.in_body {
                        table.in_body = true;
                        handler.enter_block(&Block::TableBody)?;
                    }
                }
                Open::Block(Block::TableRow)
            }
            Tag::TableCell => Open::Block(self.table_cell()),
            Tag::Emphasis
                if self.flags.contains(ParseFlags::UNDERLINE)
                    && self.source.get(range.start) == Some(&b'_') =>
            {
                Open::Span(Span::Underline)
            }
            Tag::Emphasis => Open::Span(Span::Emphasis),
            Tag::Strong => Open::Span(Span::Strong),
            Tag::Strikethrough => Open::Span(Span::Strikethrough),
            Tag::Link {
                link_type: LinkType::WikiLink { .. },
                dest_url,
                ..
            } => Open::Span(Span::WikiLink(WikiLinkDetail {
                target: Attribute::literal(dest_url.as_bytes()),
            })),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => Open::Span(Span::Link(LinkDetail {
                href: link_href(*link_type, dest_url),
                title: optional_attribute(title),
            })),
            Tag::Image {
                dest_url, title, ..
            } => Open::Span(Span::Image(ImageDetail {
                src: Attribute::literal(dest_url.as_bytes()),
                title: optional_attribute(title),
            })),
            _ => Open::Ignored,
        };
        match &open {
            Open::Block(block) => handler.enter_block(block)?,
            Open::Span(span) => handler.enter_span(span)?,
            Open::TableHead | Open::Ignored => {}
        }
        self.stack.push(open);
        Ok(())
    }

    fn end<H: EventHandler + ?Sized>(&mut self, handler: &mut H) -> Flow {
        match self.stack.pop() {
            Some(Open::Block(block)) => {
                match &block {
                    Block::CodeBlock(_) => self.code_depth = self.code_depth.saturating_sub(1),
                    Block::Table => {
                        if self.table.take().is_some_and(|t| t.in_body) {
                            handler.leave_block(&Block::TableBody)?;
                        }
                    }
                    _ => {}
                }
                handler.leave_block(&block)
            }
            Some(Open::Span(span)) => handler.leave_span(&span),
            Some(Open::TableHead) => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = false;
                }
                handler.leave_block(&Block::TableRow)?;
                handler.leave_block(&Block::TableHead)
            }
            Some(Open::Ignored) | None => Ok(()),
        }
    }

    fn code_block(&self, kind: &'e CodeBlockKind<'a>, range: &Range<usize>) -> CodeBlockDetail<'e> {
        match kind {
            CodeBlockKind::Fenced(info) => {
                let info: &'e str = info;
                let lang = info.split_ascii_whitespace().next().unwrap_or_default();
                let fence = self
                    .source
                    .get(range.start..)
                    .map(<[u8]>::trim_ascii_start)
                    .and_then(|rest| rest.first().copied())
                    .filter(|&b| matches!(b, b'`' | b'~'));
                CodeBlockDetail {
                    info: Attribute::literal(info.as_bytes()),
                    lang: Attribute::literal(lang.as_bytes()),
                    fence,
                }
            }
            CodeBlockKind::Indented => CodeBlockDetail::default(),
        }
    }

    fn table_cell(&mut self) -> Block<'e> {
        let Some(table) = self.table.as_mut() else {
            return Block::TableCell(Alignment::Default);
        };
        let align = match table.alignments.get(table.column) {
            Some(MdAlignment::Left) => Alignment::Left,
            Some(MdAlignment::Center) => Alignment::Center,
            Some(MdAlignment::Right) => Alignment::Right,
            _ => Alignment::Default,
        };
        table.column += 1;
        if table.in_head {
            Block::TableHeaderCell(align)
        } else {
            Block::TableCell(align)
        }
    }

    /// A list is loose if any of its items directly contains a paragraph.
    fn is_tight(&self, list: usize) -> bool {
        let mut depth = 0usize;
        for step in &self.steps[list + 1..] {
            match &step.event {
                MdEvent::Start(Tag::Paragraph) if depth == 1 => return false,
                MdEvent::Start(_) => depth += 1,
                MdEvent::End(_) if depth == 0 => break,
                MdEvent::End(_) => depth -= 1,
                _ => {}
            }
        }
        true
    }

    fn task_marker(&self, item: usize) -> ListItemDetail {
        let next = |offset: usize| self.steps.get(item + offset).map(|s| &s.event);
        let checked = match (next(1), next(2)) {
            (Some(MdEvent::TaskListMarker(checked)), _) => Some(*checked),
            (Some(MdEvent::Start(Tag::Paragraph)), Some(MdEvent::TaskListMarker(checked))) => {
                Some(*checked)
            }
            _ => None,
        };
        match checked {
            Some(checked) => ListItemDetail {
                is_task: true,
                task_mark: if checked { b'x' } else { b' ' },
            },
            None => ListItemDetail::default(),
        }
    }

    /// The delimiter of an ordered list or the bullet of an unordered one.
    fn list_marker(&self, range: &Range<usize>, ordered: bool) -> u8 {
        let rest = self
            .source
            .get(range.start..)
            .unwrap_or_default()
            .trim_ascii_start();
        if ordered {
            let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
            match rest.get(digits) {
                Some(&d @ (b'.' | b')')) => d,
                _ => b'.',
            }
        } else {
            match rest.first() {
                Some(&m @ (b'-' | b'+' | b'*')) => m,
                _ => b'-',
            }
        }
    }
}

/// Report `text` as `kind`, with each NUL byte reported as a
/// [`TextKind::NullChar`] event of its own.
fn emit_text<H: EventHandler + ?Sized>(handler: &mut H, kind: TextKind, text: &[u8]) -> Flow {
    let mut rest = text;
    while let Some(pos) = memchr::memchr(0, rest) {
        if pos > 0 {
            handler.text(kind, &rest[..pos])?;
        }
        handler.text(TextKind::NullChar, b"")?;
        rest = &rest[pos + 1..];
    }
    if !rest.is_empty() || text.is_empty() {
        handler.text(kind, rest)?;
    }
    Ok(())
}

fn link_href<'e>(link_type: LinkType, dest: &'e CowStr<'_>) -> Attribute<'e> {
    let dest: &'e str = dest;
    match link_type {
        LinkType::Email => Attribute::from_segments(vec![
            Segment::Literal(b"mailto:"),
            Segment::Literal(dest.as_bytes()),
        ]),
        _ => Attribute::literal(dest.as_bytes()),
    }
}

fn optional_attribute<'e>(text: &'e CowStr<'_>) -> Option<Attribute<'e>> {
    let text: &'e str = text;
    (!text.is_empty()).then(|| Attribute::literal(text.as_bytes()))
}

/// Replace every whitespace run with a single space.
fn collapse_whitespace(text: &[u8]) -> Cow<'_, [u8]> {
    let needs_work = text.iter().any(|&b| b != b' ' && b.is_ascii_whitespace())
        || text.windows(2).any(|w| w == b"  ");
    if !needs_work {
        return Cow::Borrowed(text);
    }
    let mut out = Vec::with_capacity(text.len());
    let mut in_space = false;
    for &b in text {
        if b.is_ascii_whitespace() {
            if !in_space {
                out.push(b' ');
            }
            in_space = true;
        } else {
            out.push(b);
            in_space = false;
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records events as owned values for comparison.
    #[derive(Default)]
    struct Collect {
        events: Vec<String>,
    }

    impl EventHandler for Collect {
        fn enter_block(&mut self, block: &Block<'_>) -> Flow {
            self.events.push(format!("+{block:?}"));
            Ok(())
        }

        fn leave_block(&mut self, block: &Block<'_>) -> Flow {
            self.events.push(format!("-{block:?}"));
            Ok(())
        }

        fn enter_span(&mut self, span: &Span<'_>) -> Flow {
            self.events.push(format!("+{span:?}"));
            Ok(())
        }

        fn leave_span(&mut self, span: &Span<'_>) -> Flow {
            self.events.push(format!("-{span:?}"));
            Ok(())
        }

        fn text(&mut self, kind: TextKind, text: &[u8]) -> Flow {
            self.events
                .push(format!("{kind:?}({})", String::from_utf8_lossy(text)));
            Ok(())
        }
    }

    fn events(input: &str, flags: ParseFlags) -> Vec<String> {
        let mut collect = Collect::default();
        parse(input, flags, &mut collect).unwrap();
        collect.events
    }

    /// Keep only the events matching `prefix`.
    fn only(events: &[String], prefix: &str) -> Vec<String> {
        events
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    #[test]
    fn test_document_wraps_everything() {
        let ev = events("hello", ParseFlags::empty());
        assert_eq!(
            ev,
            ["+Document", "+Paragraph", "Normal(hello)", "-Paragraph", "-Document"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(events("", ParseFlags::empty()), ["+Document", "-Document"]);
    }

    #[test]
    fn test_heading_level() {
        let ev = events("### Title", ParseFlags::empty());
        assert_eq!(ev[1], "+Heading { level: 3 }");
        assert_eq!(ev[2], "Normal(Title)");
    }

    #[test]
    fn test_merges_adjacent_text() {
        // pulldown-cmark splits text at the bracket
        let ev = events("a [b c", ParseFlags::empty());
        assert_eq!(ev[2], "Normal(a [b c)");
    }

    #[test]
    fn test_entities_reported_separately() {
        let ev = events("a &amp; b &#233;", ParseFlags::empty());
        assert_eq!(
            &ev[2..7],
            [
                "Normal(a )",
                "Entity(&amp;)",
                "Normal( b )",
                "Entity(&#233;)",
                "-Paragraph"
            ]
        );
    }

    #[test]
    fn test_ordered_list_detail() {
        let ev = events("5) one\n6) two\n", ParseFlags::empty());
        assert_eq!(
            ev[1],
            "+OrderedList(OrderedListDetail { start: 5, is_tight: true, delimiter: 41 })"
        );
    }

    #[test]
    fn test_loose_list_detected() {
        let ev = events("* one\n\n* two\n", ParseFlags::empty());
        assert_eq!(
            ev[1],
            "+UnorderedList(UnorderedListDetail { is_tight: false, mark: 42 })"
        );
    }

    #[test]
    fn test_nested_loose_list_does_not_loosen_parent() {
        let ev = events("- a\n  - b\n\n    c\n- d\n", ParseFlags::empty());
        let lists = only(&ev, "+UnorderedList");
        assert_eq!(lists.len(), 2);
        assert!(lists[0].contains("is_tight: true"));
        assert!(lists[1].contains("is_tight: false"));
    }

    #[test]
    fn test_task_items() {
        let ev = events("- [x] done\n- [ ] todo\n- plain\n", ParseFlags::TASK_LISTS);
        let items = only(&ev, "+ListItem");
        assert_eq!(
            items,
            [
                "+ListItem(ListItemDetail { is_task: true, task_mark: 120 })",
                "+ListItem(ListItemDetail { is_task: true, task_mark: 32 })",
                "+ListItem(ListItemDetail { is_task: false, task_mark: 0 })",
            ]
        );
    }

    #[test]
    fn test_code_span_is_wrapped() {
        let ev = events("`x < y`", ParseFlags::empty());
        assert_eq!(&ev[2..5], ["+Code", "Code(x < y)", "-Code"]);
    }

    #[test]
    fn test_fenced_code_block_detail() {
        let ev = events("~~~rust ignore\nfn main() {}\n~~~\n", ParseFlags::empty());
        assert!(ev[1].starts_with("+CodeBlock("));
        assert!(ev[1].contains("fence: Some(126)"));
        assert_eq!(ev[2], "Code(fn main() {}\n)");
    }

    #[test]
    fn test_table_structure() {
        let input = "| a | b |\n|:--|--:|\n| 1 | 2 |\n";
        let ev = events(input, ParseFlags::TABLES);
        let blocks: Vec<String> = ev.into_iter().filter(|e| e.starts_with('+')).collect();
        assert_eq!(
            blocks,
            [
                "+Document",
                "+Table",
                "+TableHead",
                "+TableRow",
                "+TableHeaderCell(Left)",
                "+TableHeaderCell(Right)",
                "+TableBody",
                "+TableRow",
                "+TableCell(Left)",
                "+TableCell(Right)",
            ]
        );
    }

    #[test]
    fn test_table_without_body_has_no_tbody() {
        let ev = events("| a |\n|---|\n", ParseFlags::TABLES);
        assert!(!ev.iter().any(|e| e.contains("TableBody")));
    }

    #[test]
    fn test_email_autolink_gets_mailto() {
        let ev = events("<me@example.com>", ParseFlags::empty());
        assert!(ev[2].contains("Literal([109, 97, 105, 108, 116, 111, 58])"));
    }

    #[test]
    fn test_rule_is_enter_and_leave() {
        let ev = events("---", ParseFlags::empty());
        assert_eq!(&ev[1..3], ["+ThematicBreak", "-ThematicBreak"]);
    }

    #[test]
    fn test_math_spans() {
        let ev = events("$a$ and $$b$$", ParseFlags::LATEX_MATH_SPANS);
        assert!(ev.contains(&"+LatexMath".to_string()));
        assert!(ev.contains(&"LatexMath(a)".to_string()));
        assert!(ev.contains(&"+LatexMathDisplay".to_string()));
    }

    #[test]
    fn test_underline_flag() {
        let ev = events("_u_ *e*", ParseFlags::UNDERLINE);
        assert!(ev.contains(&"+Underline".to_string()));
        assert!(ev.contains(&"+Emphasis".to_string()));
        let ev = events("_u_", ParseFlags::empty());
        assert!(!ev.contains(&"+Underline".to_string()));
    }

    #[test]
    fn test_nul_bytes_reported_separately() {
        let ev = events("a\0b\0", ParseFlags::empty());
        assert_eq!(
            &ev[2..6],
            ["Normal(a)", "NullChar()", "Normal(b)", "NullChar()"]
        );
        let ev = events("`x\0`", ParseFlags::empty());
        assert_eq!(&ev[2..6], ["+Code", "Code(x)", "NullChar()", "-Code"]);
    }

    #[test]
    fn test_wiki_links() {
        let ev = events("see [[Main Page]]", ParseFlags::WIKI_LINKS);
        assert!(ev.iter().any(|e| e.starts_with("+WikiLink(")));
        assert!(ev.iter().any(|e| e.starts_with("-WikiLink(")));
        let ev = events("see [[Main Page]]", ParseFlags::empty());
        assert!(!ev.iter().any(|e| e.contains("WikiLink")));
    }

    #[test]
    fn test_no_html_spans_demotes_to_text() {
        let ev = events("a <b>x</b>", ParseFlags::empty());
        assert!(ev.contains(&"Html(<b>)".to_string()));
        let ev = events("a <b>x</b>", ParseFlags::NO_HTML_SPANS);
        assert!(!ev.iter().any(|e| e.starts_with("Html(")));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace(b"a b"), Cow::Borrowed(&b"a b"[..]));
        assert_eq!(&*collapse_whitespace(b"a \t b\tc"), b"a b c");
    }

    #[test]
    fn test_abort_is_parse_error() {
        struct Stop;
        impl EventHandler for Stop {
            fn enter_block(&mut self, _: &Block<'_>) -> Flow {
                Err(Abort)
            }
            fn leave_block(&mut self, _: &Block<'_>) -> Flow {
                Ok(())
            }
            fn enter_span(&mut self, _: &Span<'_>) -> Flow {
                Ok(())
            }
            fn leave_span(&mut self, _: &Span<'_>) -> Flow {
                Ok(())
            }
            fn text(&mut self, _: TextKind, _: &[u8]) -> Flow {
                Ok(())
            }
        }
        let err = parse("# hi", ParseFlags::DEFAULT, &mut Stop).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert_eq!(err.code(), 1);
    }

    #[test]
    fn test_default_flags() {
        assert_eq!(ParseFlags::DEFAULT.bits(), 0x0b07);
        assert_eq!(ParseFlags::NO_HTML.bits(), 0x0060);
        assert_eq!(ParseFlags::default(), ParseFlags::DEFAULT);
    }

    #[test]
    fn test_events_are_well_nested() {
        let input = "# T\n\n> q *e* [l](u)\n\n1. a\n2. b\n\n| x |\n|---|\n| y |\n";
        let ev = events(input, ParseFlags::DEFAULT);
        let mut stack = Vec::new();
        for e in &ev {
            if let Some(name) = e.strip_prefix('+') {
                stack.push(name.to_string());
            } else if let Some(name) = e.strip_prefix('-') {
                assert_eq!(stack.pop().as_deref(), Some(name));
            }
        }
        assert!(stack.is_empty());
    }
}
