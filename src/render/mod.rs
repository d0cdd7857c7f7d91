//! Render entry point.
//!
//! [`render`] parses markdown input and writes HTML or JSON into a
//! caller-owned [`Buffer`]. The buffer is reset at the start of every call
//! and keeps its capacity, so rendering many documents through one buffer
//! stops allocating once it has grown to fit the largest output.
//!
//! ```
//! use mdrender::{Buffer, Format, RenderOptions, render};
//!
//! let mut out = Buffer::new();
//! let options = RenderOptions::default();
//! let len = render(b"# Hello *world*", &options, &mut out).unwrap();
//! assert_eq!(
//!     &out.as_bytes()[..len],
//!     b"<h1><a id=\"hello\" class=\"anchor\" aria-hidden=\"true\" href=\"#hello\"></a>Hello <em>world</em></h1>\n"
//! );
//!
//! let json = RenderOptions::new(Format::Json);
//! render(b"hi", &json, &mut out).unwrap();
//! assert!(out.as_bytes().starts_with(b"{\"_\": \"doc\""));
//! ```

pub mod html;
pub mod json;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::parse::{ParseFlags, parse};

pub use html::HtmlRenderer;
pub use json::JsonRenderer;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Format {
    #[default]
    Html,
    /// HTML with self-closing void elements.
    Xhtml,
    Json,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Xhtml => "xhtml",
            Format::Json => "json",
        }
    }

    /// Render flags implied by the format itself.
    fn implied_flags(self) -> RenderFlags {
        match self {
            Format::Xhtml => RenderFlags::XHTML,
            Format::Html | Format::Json => RenderFlags::empty(),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Format::Html),
            "xhtml" => Ok(Format::Xhtml),
            "json" => Ok(Format::Json),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Output switches for the HTML renderer.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u32 {
        /// Close void elements with `/>`.
        const XHTML = 0x1;
        /// Keep `javascript:` link destinations instead of emptying them.
        const ALLOW_JS_URI = 0x2;
        /// Do not insert anchors into headings.
        const NO_HEADLINE_ANCHORS = 0x4;
    }
}

/// Everything that controls a render call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: Format,
    pub parse_flags: ParseFlags,
    pub render_flags: RenderFlags,
}

impl RenderOptions {
    /// Options for `format` with the default dialect and no render flags.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_parse_flags(mut self, flags: ParseFlags) -> Self {
        self.parse_flags = flags;
        self
    }

    pub fn with_render_flags(mut self, flags: RenderFlags) -> Self {
        self.render_flags = flags;
        self
    }

    /// Render flags after adding the ones the format implies.
    pub fn effective_render_flags(&self) -> RenderFlags {
        self.render_flags | self.format.implied_flags()
    }
}

/// Post-processor for fenced code blocks, e.g. a syntax highlighter.
///
/// Called with the block's language (empty when there is none) and its raw
/// text. Returning `Some` replaces the block content verbatim, so the
/// transform is responsible for escaping. Returning `None` falls back to
/// plain HTML escaping.
pub trait CodeBlockTransform {
    fn transform(&mut self, lang: &[u8], code: &[u8]) -> Option<Vec<u8>>;
}

impl<F> CodeBlockTransform for F
where
    F: FnMut(&[u8], &[u8]) -> Option<Vec<u8>>,
{
    fn transform(&mut self, lang: &[u8], code: &[u8]) -> Option<Vec<u8>> {
        self(lang, code)
    }
}

/// Render `input` into `output` and return the number of bytes written.
///
/// On error the output buffer is left empty.
pub fn render(input: &[u8], options: &RenderOptions, output: &mut Buffer) -> Result<usize> {
    render_with(input, options, None, output)
}

/// Like [`render`], running fenced code blocks through `transform`.
///
/// The transform only applies to HTML output.
pub fn render_with(
    input: &[u8],
    options: &RenderOptions,
    transform: Option<&mut dyn CodeBlockTransform>,
    output: &mut Buffer,
) -> Result<usize> {
    output.reset();
    output.reserve(input.len().saturating_mul(2));

    let text = decode_input(input);
    let flags = options.effective_render_flags();
    let result = match options.format {
        Format::Html | Format::Xhtml => {
            let mut renderer = HtmlRenderer::new(output, flags);
            if let Some(transform) = transform {
                renderer = renderer.with_transform(transform);
            }
            parse(&text, options.parse_flags, &mut renderer)
        }
        Format::Json => {
            let mut renderer = JsonRenderer::new(output);
            parse(&text, options.parse_flags, &mut renderer).map(|()| {
                renderer.finish();
            })
        }
    };

    if let Err(err) = result {
        output.reset();
        tracing::debug!(format = %options.format, error = %err, "render failed");
        return Err(err);
    }

    tracing::debug!(
        format = %options.format,
        input_len = input.len(),
        output_len = output.len(),
        "rendered document"
    );
    Ok(output.len())
}

/// Decode input as UTF-8, replacing malformed sequences with U+FFFD.
fn decode_input(input: &[u8]) -> Cow<'_, str> {
    let (text, had_errors) = encoding_rs::UTF_8.decode_without_bom_handling(input);
    if had_errors {
        tracing::debug!(input_len = input.len(), "replaced malformed UTF-8 in input");
    }
    text
}
