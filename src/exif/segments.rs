//! JPEG marker walking and EXIF (APP1) splicing.
//!
//! Re-encoding a canvas drops every metadata segment and the encoder writes a
//! fresh APP0/JFIF header. To keep the camera's EXIF, the original APP1 bytes
//! are captured once per photo with [`parse_segments`] + [`extract_exif_segment`]
//! and spliced over that APP0 with [`reinsert_exif_segment`].
//!
//! Layout of the header region:
//!
//! ```text
//! FF D8                       SOI (no length)
//! FF Ex LL LL <LL-2 bytes>    APPn / DQT / SOF / ... (length includes itself)
//! FF DA ...                   SOS: entropy-coded data follows, stop here
//! ```
//!
//! Everything is byte addressing; scan data is never touched. Truncated or
//! malformed input ends the walk early instead of failing.

const MARKER: u8 = 0xFF;
const SOI: u8 = 0xD8;
const SOS: u8 = 0xDA;
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;

/// One marker segment: the marker bytes, the length field and the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Offset of the leading `0xFF` in the source buffer.
    pub offset: usize,
    pub bytes: &'a [u8],
}

impl Segment<'_> {
    /// The marker type byte, if the segment is at least two bytes long.
    pub fn marker(&self) -> Option<u8> {
        match self.bytes {
            [MARKER, kind, ..] => Some(*kind),
            _ => None,
        }
    }

    pub fn is_exif(&self) -> bool {
        self.marker() == Some(APP1)
    }
}

/// Walk the header region of a JPEG and collect its marker segments.
///
/// SOI is skipped, SOS ends the walk. A segment whose declared length runs
/// past the end of the buffer is returned truncated and ends the walk.
pub fn parse_segments(bytes: &[u8]) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut head = 0;

    while head < bytes.len() {
        match bytes.get(head..head + 2) {
            Some([MARKER, SOS]) => break,
            Some([MARKER, SOI]) => {
                head += 2;
                continue;
            }
            _ => {}
        }

        let Some(length) = bytes.get(head + 2..head + 4) else {
            log::debug!("JPEG header truncated at offset {head}");
            break;
        };
        let length = u16::from_be_bytes([length[0], length[1]]) as usize;
        let end = head + length + 2;

        segments.push(Segment {
            offset: head,
            bytes: &bytes[head..end.min(bytes.len())],
        });
        head = end;
    }

    segments
}

/// Concatenate every APP1 segment, in order. Empty when there is none.
pub fn extract_exif_segment(segments: &[Segment<'_>]) -> Vec<u8> {
    segments
        .iter()
        .filter(|s| s.is_exif())
        .flat_map(|s| s.bytes.iter().copied())
        .collect()
}

/// Convenience: [`parse_segments`] followed by [`extract_exif_segment`].
pub fn read_exif_segment(jpeg: &[u8]) -> Vec<u8> {
    extract_exif_segment(&parse_segments(jpeg))
}

/// Replace the APP0 segment right after SOI with `exif`.
///
/// Output is `SOI + exif + everything after APP0`. Input without an APP0 at
/// offset 2 is not a freshly encoded JPEG and is returned unchanged.
pub fn reinsert_exif_segment(jpeg: &[u8], exif: &[u8]) -> Vec<u8> {
    let app0_length = match jpeg {
        [_, _, MARKER, APP0, hi, lo, ..] => u16::from_be_bytes([*hi, *lo]) as usize,
        _ => {
            log::debug!("No APP0 marker after SOI, EXIF not reinserted");
            return jpeg.to_vec();
        }
    };
    let tail = &jpeg[(4 + app0_length).min(jpeg.len())..];

    let mut out = Vec::with_capacity(2 + exif.len() + tail.len());
    out.extend_from_slice(&[MARKER, SOI]);
    out.extend_from_slice(exif);
    out.extend_from_slice(tail);
    out
}

/// Total size of the APP0 segment (marker included) at offset 2, if any.
pub fn app0_segment_len(jpeg: &[u8]) -> Option<usize> {
    match jpeg {
        [_, _, MARKER, APP0, hi, lo, ..] => Some(2 + u16::from_be_bytes([*hi, *lo]) as usize),
        _ => None,
    }
}
