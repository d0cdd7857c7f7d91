//! WASM bindings for rendering markdown in the browser.
//!
//! Output is staged in a per-thread buffer that is reused across calls and
//! copied out into a fresh `Uint8Array` for JavaScript.

use std::cell::RefCell;

use js_sys::{Function, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::buffer::Buffer;
use crate::host;
use crate::render::CodeBlockTransform;

thread_local! {
    static OUTPUT: RefCell<Buffer> = RefCell::new(Buffer::new());
}

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Render UTF-8 markdown bytes.
///
/// `on_code_block(lang, code)` is called for every fenced block in HTML
/// output. Returning a string or `Uint8Array` replaces the block body;
/// returning `null`/`undefined` or throwing escapes it as usual.
///
/// An empty result with a non-zero `lastErrorCode()` means failure.
#[wasm_bindgen(js_name = parseUTF8)]
pub fn parse_utf8(
    input: &[u8],
    parse_flags: u32,
    output_flags: u32,
    on_code_block: Option<Function>,
) -> Vec<u8> {
    OUTPUT.with(|cell| {
        let mut output = cell.borrow_mut();
        let len = match on_code_block {
            Some(callback) => {
                let mut transform = JsCodeBlock { callback };
                host::render_utf8(
                    input,
                    parse_flags,
                    output_flags,
                    Some(&mut transform as &mut dyn CodeBlockTransform),
                    &mut output,
                )
            }
            None => host::render_utf8(input, parse_flags, output_flags, None, &mut output),
        };
        output.as_bytes()[..len].to_vec()
    })
}

#[wasm_bindgen(js_name = lastErrorCode)]
pub fn last_error_code() -> u32 {
    host::last_error().code
}

#[wasm_bindgen(js_name = lastErrorMessage)]
pub fn last_error_message() -> String {
    host::last_error().message
}

struct JsCodeBlock {
    callback: Function,
}

impl CodeBlockTransform for JsCodeBlock {
    fn transform(&mut self, lang: &[u8], code: &[u8]) -> Option<Vec<u8>> {
        let lang = JsValue::from_str(&String::from_utf8_lossy(lang));
        let code = JsValue::from_str(&String::from_utf8_lossy(code));

        match self.callback.call2(&JsValue::NULL, &lang, &code) {
            Ok(value) if value.is_null() || value.is_undefined() => None,
            Ok(value) => match value.as_string() {
                Some(text) => Some(text.into_bytes()),
                None if value.is_instance_of::<Uint8Array>() => {
                    Some(Uint8Array::new(&value).to_vec())
                }
                None => {
                    tracing::warn!("onCodeBlock returned neither string nor bytes, escaping");
                    None
                }
            },
            Err(err) => {
                tracing::warn!(error = ?err, "onCodeBlock threw, escaping code block");
                None
            }
        }
    }
}
