//! # EXIF Frame
//!
//! Frames a photo with a border, a brand logo and text lines filled from the
//! photo's own EXIF data, then exports the result as JPEG or PNG. JPEG output
//! keeps the source photo's EXIF block.
//!
//! # Architecture: Template → Geometry → Pixels
//!
//! ```text
//! 1. Decode    photo bytes  →  Bitmap + ExifFieldMap + raw APP1 segment
//! 2. Resolve   LayoutTemplate + sizes  →  ResolvedConfig   (pure arithmetic)
//! 3. Composite ResolvedConfig + fields  →  Surface         (one render pass)
//! 4. Export    Surface  →  JPEG/PNG bytes (+ EXIF spliced back into JPEG)
//! ```
//!
//! Every layout length is a fraction of the photo **width**, so one template
//! frames a 6000 px original and a 600 px preview identically. Resolution is
//! a pure function from template and sizes to pixel geometry; only the
//! compositor touches pixels, and it only ever draws what the resolver said.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Templates, resolved geometry, colors and text enums |
//! | [`fraction`] | Decimal → fraction strings for shutter speeds |
//! | [`template`] | `{{field}}` placeholder interpolation |
//! | [`exif`] | EXIF decoding into display fields; APP1 segment extraction and reinsertion |
//! | [`imaging`] | Layout resolver, compositor, drawing surfaces |
//! | [`session`] | Async editing session: decode off-thread, debounced renders, stale-load discard |
//! | [`presets`] | Built-in layouts (`none`, `bottom-band`, `framed`) |
//! | [`config`] | `exif-frame.toml` loading, preset merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding use the `image` crate, and text is
//! rasterised with `rusttype` from a TrueType file. No system libraries are
//! needed beyond a font, and without one the frame still renders (text is
//! skipped with a warning).
//!
//! ## EXIF Is Copied, Not Re-Encoded
//!
//! Encoders drop metadata. Rather than rebuild EXIF from parsed tags, the raw
//! APP1 segments of the source are carried through unchanged and spliced into
//! the encoded JPEG in place of its JFIF APP0 header. Makernotes and tags this
//! crate never parses survive intact.
//!
//! ## Swappable Surfaces
//!
//! The compositor draws through the [`imaging::Surface`] trait. The raster
//! implementation is the product; a recording mock lets the compositor's
//! draw order and arguments be tested without comparing pixels.

pub mod config;
pub mod exif;
pub mod fraction;
pub mod imaging;
pub mod output;
pub mod presets;
pub mod session;
pub mod template;
pub mod types;
