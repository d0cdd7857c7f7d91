//! Byte-oriented escaping and encoding primitives.
//!
//! Every function here appends to a [`Buffer`](crate::Buffer) and never
//! fails. They are split by destination context:
//!
//! - [`html`]: text and attribute escaping for HTML output
//! - [`json`]: string-body escaping for JSON output
//! - [`url`]: percent-encoding of link destinations embedded in attributes
//! - [`utf8`]: codepoint encoding and decoding
//! - [`entity`]: recognition and decoding of XML character references
//! - [`slug`]: ASCII-folding anchor identifiers for headings
//!
//! All escapers copy runs of bytes that need no escaping in one append, so
//! the cost of an escape pass is dominated by the number of special bytes,
//! not the input length.

pub mod entity;
pub mod html;
pub mod json;
pub mod slug;
pub mod url;
pub mod utf8;

pub use entity::{EntityRef, decode_entity_html, decode_entity_json, scan_entity};
pub use html::escape_html;
pub use json::escape_json;
pub use slug::{append_slug, slugify};
pub use url::escape_url;
pub use utf8::{REPLACEMENT_CHARACTER, append_codepoint, decode_codepoint};
