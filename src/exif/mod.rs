//! EXIF display fields and APP1 segment handling.
//!
//! - [`ExifFieldMap`]: the nine display strings templates interpolate
//! - [`ExifDecoder`] / [`NomExifDecoder`]: raw bytes → field map
//! - [`segments`]: JPEG marker walk, APP1 extraction and reinsertion

mod fields;
mod reader;
pub mod segments;

pub use fields::{ExifField, ExifFieldMap};
pub use reader::{ExifDecoder, ExifError, NomExifDecoder, RawTags, build_field_map, normalize_timestamp};
pub use segments::{extract_exif_segment, parse_segments, read_exif_segment, reinsert_exif_segment};
