//! Pipeline stages between the HTTP surface and the engine.
//!
//! ```text
//! request ──▶ fetch ──▶ engine ──▶ encode ──▶ response
//! (validated)  (URL→temp file)      (PNG→base64)
//! ```
//!
//! 1. [`fetch`]  — materialise a URL source as a local temp file the
//!    engine can open; local sources skip this stage entirely
//! 2. [`encode`] — PNG-encode and base64-wrap each extracted image for
//!    the JSON response body

pub mod encode;
pub mod fetch;
