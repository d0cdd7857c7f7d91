//! Render events and the handler interface.
//!
//! A parser reports a document as a well-nested sequence of [`Event`]s:
//! every block and span is entered and left exactly once, in document
//! order, and text arrives as leaf events in between. Detail payloads
//! borrow from the parser's input and are never copied by the event.
//!
//! Output formats implement [`EventHandler`]. Returning [`Abort`] from any
//! callback stops the parser immediately.

use crate::encode::scan_entity;

/// Returned by a handler to stop the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abort;

/// Status of one handler callback.
pub type Flow = Result<(), Abort>;

// ============================================================================
// Attribute text
// ============================================================================

/// One piece of an [`Attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Bytes taken as-is from the source.
    Literal(&'a [u8]),
    /// A character reference including `&` and `;`, e.g. `&#233;` or `&amp;`.
    Entity(&'a [u8]),
    /// An embedded NUL byte.
    NullChar,
}

/// Attribute text (link destination, title, code language, ...) split into
/// segments that must be re-escaped for the destination context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> Attribute<'a> {
    /// An attribute of already-decoded text. Embedded NUL bytes become
    /// [`Segment::NullChar`]; everything else is one literal run.
    pub fn literal(text: &'a [u8]) -> Self {
        let mut segments = Vec::new();
        let mut rest = text;
        while let Some(pos) = memchr::memchr(0, rest) {
            if pos > 0 {
                segments.push(Segment::Literal(&rest[..pos]));
            }
            segments.push(Segment::NullChar);
            rest = &rest[pos + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }
        Self { segments }
    }

    /// Build an attribute from a list of segments.
    pub fn from_segments(segments: Vec<Segment<'a>>) -> Self {
        Self { segments }
    }

    /// Split raw attribute text into literal, entity and NUL segments.
    ///
    /// ```
    /// use mdrender::event::{Attribute, Segment};
    ///
    /// let attr = Attribute::parse(b"a&amp;b&#1;");
    /// assert_eq!(
    ///     attr.segments(),
    ///     &[
    ///         Segment::Literal(b"a"),
    ///         Segment::Entity(b"&amp;"),
    ///         Segment::Literal(b"b"),
    ///         Segment::Entity(b"&#1;"),
    ///     ]
    /// );
    /// ```
    pub fn parse(raw: &'a [u8]) -> Self {
        let mut segments = Vec::new();
        let mut beg = 0;
        let mut i = 0;
        while let Some(off) = memchr::memchr2(b'&', 0, &raw[i..]) {
            let pos = i + off;
            let special = match raw[pos] {
                0 => Some((Segment::NullChar, 1)),
                _ => scan_entity(&raw[pos..])
                    .map(|len| (Segment::Entity(&raw[pos..pos + len]), len)),
            };
            let Some((segment, len)) = special else {
                // A lone '&' stays part of the literal run
                i = pos + 1;
                continue;
            };
            if pos > beg {
                segments.push(Segment::Literal(&raw[beg..pos]));
            }
            segments.push(segment);
            beg = pos + len;
            i = beg;
        }
        if beg < raw.len() {
            segments.push(Segment::Literal(&raw[beg..]));
        }
        Self { segments }
    }

    /// The segments in source order.
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Returns true if the attribute has no text at all.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenated source bytes, with NUL segments restored as `\0`.
    pub fn flatten(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) | Segment::Entity(text) => out.extend_from_slice(text),
                Segment::NullChar => out.push(0),
            }
        }
        out
    }

    /// Returns true if the source text starts with `prefix`, ignoring ASCII case.
    pub fn starts_with_ignore_case(&self, prefix: &[u8]) -> bool {
        let mut rest = prefix;
        for segment in &self.segments {
            if rest.is_empty() {
                break;
            }
            let text: &[u8] = match segment {
                Segment::Literal(text) | Segment::Entity(text) => text,
                Segment::NullChar => b"\0",
            };
            let n = rest.len().min(text.len());
            if !text[..n].eq_ignore_ascii_case(&rest[..n]) {
                return false;
            }
            rest = &rest[n..];
        }
        rest.is_empty()
    }
}

// ============================================================================
// Blocks
// ============================================================================

/// Table cell alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Default,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Attribute value for this alignment, `None` when unset.
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Alignment::Default => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnorderedListDetail {
    /// No blank lines between items.
    pub is_tight: bool,
    /// Bullet character: `-`, `+` or `*`.
    pub mark: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedListDetail {
    pub start: u32,
    pub is_tight: bool,
    /// `.` or `)`.
    pub delimiter: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListItemDetail {
    pub is_task: bool,
    /// `x`, `X` or ` ` for task items.
    pub task_mark: u8,
}

impl ListItemDetail {
    /// A task item whose box is ticked.
    pub fn is_checked(&self) -> bool {
        self.is_task && self.task_mark.eq_ignore_ascii_case(&b'x')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlockDetail<'a> {
    /// The whole info string of a fenced block.
    pub info: Attribute<'a>,
    /// First word of the info string.
    pub lang: Attribute<'a>,
    /// Fence character, `None` for indented blocks.
    pub fence: Option<u8>,
}

/// A block-level construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block<'a> {
    Document,
    Quote,
    UnorderedList(UnorderedListDetail),
    OrderedList(OrderedListDetail),
    ListItem(ListItemDetail),
    ThematicBreak,
    /// Level 1 to 6.
    Heading {
        level: u8,
    },
    CodeBlock(CodeBlockDetail<'a>),
    /// Raw HTML block; its content arrives as [`TextKind::Html`].
    Html,
    Paragraph,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell(Alignment),
    TableCell(Alignment),
}

// ============================================================================
// Spans
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDetail<'a> {
    pub href: Attribute<'a>,
    pub title: Option<Attribute<'a>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDetail<'a> {
    pub src: Attribute<'a>,
    pub title: Option<Attribute<'a>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WikiLinkDetail<'a> {
    pub target: Attribute<'a>,
}

/// An inline construct.
///
/// The alt text of an image arrives as the text events between its enter
/// and leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span<'a> {
    Emphasis,
    Strong,
    Underline,
    Link(LinkDetail<'a>),
    Image(ImageDetail<'a>),
    Code,
    Strikethrough,
    LatexMath,
    LatexMathDisplay,
    WikiLink(WikiLinkDetail<'a>),
}

// ============================================================================
// Text and events
// ============================================================================

/// Kind of a text event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Normal,
    /// A NUL in the source; the text is empty.
    NullChar,
    /// Hard line break.
    Break,
    /// Soft line break.
    SoftBreak,
    /// A character reference including `&` and `;`.
    Entity,
    /// Text inside a code span or code block.
    Code,
    /// Raw HTML to pass through.
    Html,
    /// Text inside a math span.
    LatexMath,
}

/// One parser notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    EnterBlock(Block<'a>),
    LeaveBlock(Block<'a>),
    EnterSpan(Span<'a>),
    LeaveSpan(Span<'a>),
    Text(TextKind, &'a [u8]),
}

/// Receiver of parse events.
pub trait EventHandler {
    fn enter_block(&mut self, block: &Block<'_>) -> Flow;

    fn leave_block(&mut self, block: &Block<'_>) -> Flow;

    fn enter_span(&mut self, span: &Span<'_>) -> Flow;

    fn leave_span(&mut self, span: &Span<'_>) -> Flow;

    fn text(&mut self, kind: TextKind, text: &[u8]) -> Flow;

    /// Route one event to the matching callback.
    fn handle(&mut self, event: &Event<'_>) -> Flow {
        match event {
            Event::EnterBlock(block) => self.enter_block(block),
            Event::LeaveBlock(block) => self.leave_block(block),
            Event::EnterSpan(span) => self.enter_span(span),
            Event::LeaveSpan(span) => self.leave_span(span),
            Event::Text(kind, text) => self.text(*kind, text),
        }
    }
}

impl<H: EventHandler + ?Sized> EventHandler for &mut H {
    fn enter_block(&mut self, block: &Block<'_>) -> Flow {
        (**self).enter_block(block)
    }

    fn leave_block(&mut self, block: &Block<'_>) -> Flow {
        (**self).leave_block(block)
    }

    fn enter_span(&mut self, span: &Span<'_>) -> Flow {
        (**self).enter_span(span)
    }

    fn leave_span(&mut self, span: &Span<'_>) -> Flow {
        (**self).leave_span(span)
    }

    fn text(&mut self, kind: TextKind, text: &[u8]) -> Flow {
        (**self).text(kind, text)
    }
}

/// Feed a prepared event sequence to `handler`, stopping at the first abort.
pub fn drive<'a, I, H>(events: I, handler: &mut H) -> Flow
where
    I: IntoIterator<Item = Event<'a>>,
    H: EventHandler + ?Sized,
{
    for event in events {
        handler.handle(&event)?;
    }
    Ok(())
}
