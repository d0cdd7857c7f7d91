//! Numeric entry point for embedders.
//!
//! Hosts that cannot pass Rust types (WebAssembly, C callers) describe a
//! render call with two flag words and read failures back from a per-thread
//! last-error slot instead of a `Result`.

use std::cell::RefCell;

use bitflags::bitflags;

use crate::buffer::Buffer;
use crate::error::Error;
use crate::parse::ParseFlags;
use crate::render::{CodeBlockTransform, Format, RenderFlags, RenderOptions, render_with};

bitflags! {
    /// Output selection as passed by a host.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct OutputFlags: u32 {
        const HTML = 0x1;
        /// Only meaningful together with `HTML`.
        const XHTML = 0x2;
        const ALLOW_JS_URI = 0x4;
        const JSON = 0x8;
        const NO_HEADLINE_ANCHORS = 0x10;
    }
}

impl OutputFlags {
    /// Translate host flags into render options. HTML wins when both
    /// formats are set.
    pub fn to_options(self, parse_flags: ParseFlags) -> Result<RenderOptions, Error> {
        let format = if self.contains(OutputFlags::HTML) {
            if self.contains(OutputFlags::XHTML) {
                Format::Xhtml
            } else {
                Format::Html
            }
        } else if self.contains(OutputFlags::JSON) {
            Format::Json
        } else {
            return Err(Error::UnsupportedFormat(
                "no output format set in output flags".to_string(),
            ));
        };

        let mut render_flags = RenderFlags::empty();
        render_flags.set(
            RenderFlags::ALLOW_JS_URI,
            self.contains(OutputFlags::ALLOW_JS_URI),
        );
        render_flags.set(
            RenderFlags::NO_HEADLINE_ANCHORS,
            self.contains(OutputFlags::NO_HEADLINE_ANCHORS),
        );

        Ok(RenderOptions {
            format,
            parse_flags,
            render_flags,
        })
    }
}

/// Failure recorded by the most recent [`render_utf8`] call on this thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastError {
    /// `0` when the last call succeeded.
    pub code: u32,
    pub message: String,
}

thread_local! {
    static LAST_ERROR: RefCell<LastError> = RefCell::new(LastError::default());
}

pub fn last_error() -> LastError {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

pub fn clear_last_error() {
    LAST_ERROR.with(|slot| {
        let mut slot = slot.borrow_mut();
        slot.code = 0;
        slot.message.clear();
    });
}

fn set_last_error(err: &Error) {
    LAST_ERROR.with(|slot| {
        *slot.borrow_mut() = LastError {
            code: err.code(),
            message: err.to_string(),
        };
    });
}

/// Render UTF-8 `input` into `buffer` and return the output length.
///
/// Unknown flag bits are ignored. On failure the buffer is emptied, `0` is
/// returned and the reason lands in the last-error slot. Empty HTML output
/// is also `0` bytes long, so hosts tell the two apart with [`last_error`].
pub fn render_utf8(
    input: &[u8],
    parse_flags: u32,
    output_flags: u32,
    transform: Option<&mut dyn CodeBlockTransform>,
    buffer: &mut Buffer,
) -> usize {
    clear_last_error();

    let parse_flags = ParseFlags::from_bits_truncate(parse_flags);
    let result = OutputFlags::from_bits_truncate(output_flags)
        .to_options(parse_flags)
        .and_then(|options| render_with(input, &options, transform, buffer));

    match result {
        Ok(len) => len,
        Err(err) => {
            buffer.reset();
            tracing::debug!(code = err.code(), error = %err, "host render failed");
            set_last_error(&err);
            0
        }
    }
}
