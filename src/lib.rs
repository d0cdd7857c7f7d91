//! # mdrender
//!
//! A fast, event-driven markdown renderer with HTML and JSON output.
//!
//! ## Features
//!
//! - CommonMark plus tables, strikethrough, task lists, underline and math
//! - HTML or XHTML output with optional heading anchors
//! - A JSON document tree for tooling that wants structure instead of markup
//! - One reusable output [`Buffer`] across any number of render calls
//! - Pluggable post-processing of fenced code blocks
//!
//! ## Quick Start
//!
//! ```
//! use mdrender::{Buffer, RenderOptions, render};
//!
//! let mut out = Buffer::new();
//! let len = render(b"Hello **world**", &RenderOptions::default(), &mut out).unwrap();
//! assert_eq!(&out.as_bytes()[..len], b"<p>Hello <b>world</b></p>\n");
//! ```
//!
//! ## Custom handlers
//!
//! Renderers are [`EventHandler`]s fed by [`parse`]. Anything else that
//! wants the same block/span/text stream implements the trait too:
//!
//! ```
//! use mdrender::event::{Block, EventHandler, Flow, TextKind};
//! use mdrender::{ParseFlags, parse};
//!
//! #[derive(Default)]
//! struct Headings(u32);
//!
//! impl EventHandler for Headings {
//!     fn enter_block(&mut self, block: &Block<'_>) -> Flow {
//!         if let Block::Heading { .. } = block {
//!             self.0 += 1;
//!         }
//!         Ok(())
//!     }
//!     fn leave_block(&mut self, _: &Block<'_>) -> Flow { Ok(()) }
//!     fn enter_span(&mut self, _: &mdrender::event::Span<'_>) -> Flow { Ok(()) }
//!     fn leave_span(&mut self, _: &mdrender::event::Span<'_>) -> Flow { Ok(()) }
//!     fn text(&mut self, _: TextKind, _: &[u8]) -> Flow { Ok(()) }
//! }
//!
//! let mut count = Headings::default();
//! parse("# a\n\n## b\n", ParseFlags::DEFAULT, &mut count).unwrap();
//! assert_eq!(count.0, 2);
//! ```

pub mod buffer;
pub mod encode;
pub mod error;
pub mod event;
pub mod host;
pub mod parse;
pub mod render;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::Buffer;
pub use error::{Error, Result};
pub use event::EventHandler;
pub use host::{OutputFlags, render_utf8};
pub use parse::{ParseFlags, parse};
pub use render::{
    CodeBlockTransform, Format, HtmlRenderer, JsonRenderer, RenderFlags, RenderOptions, render,
    render_with,
};
