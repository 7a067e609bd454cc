use nom_exif::{EntryValue, Exif, ExifIter, ExifTag, MediaParser, MediaSource};
use std::io::Cursor;
use thiserror::Error;

use super::fields::ExifFieldMap;
use crate::fraction::{FractionValue, format_fraction};

#[derive(Error, Debug)]
pub enum ExifError {
    #[error("Failed to read EXIF: {0}")]
    Parse(String),
}

/// Turns raw image bytes into display fields.
///
/// Decoding never fails from the caller's point of view: a photo without
/// readable EXIF simply has an empty field map.
pub trait ExifDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> ExifFieldMap;
}

/// Tag values as read from the file, before display formatting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTags {
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,
    pub copyright: Option<String>,
    pub date_time_original: Option<String>,
    pub f_number: Option<String>,
    pub exposure_time: Option<FractionValue>,
    pub focal_length: Option<String>,
    pub iso: Option<String>,
}

/// Format raw tags into the display map.
pub fn build_field_map(raw: &RawTags) -> ExifFieldMap {
    let tag = |value: &Option<String>, before: &str, after: &str| match value {
        Some(v) => {
            let v = clean(v);
            if v.is_empty() {
                String::new()
            } else {
                format!("{before}{v}{after}")
            }
        }
        None => String::new(),
    };

    ExifFieldMap {
        brand: tag(&raw.make, "", ""),
        model: tag(&raw.model, "", ""),
        lens: tag(&raw.lens_model, "", ""),
        copyright: tag(&raw.copyright, "", ""),
        capture_time: raw
            .date_time_original
            .as_deref()
            .map(|v| normalize_timestamp(&clean(v)))
            .unwrap_or_default(),
        aperture: tag(&raw.f_number, "f/", ""),
        shutter_speed: format_fraction(raw.exposure_time.as_ref(), "s"),
        focal_length: tag(&raw.focal_length, "", "mm"),
        iso: tag(&raw.iso, "", ""),
    }
}

/// Collapse runs of spaces, drop NULs, trim.
fn clean(value: &str) -> String {
    let without_nul: String = value.chars().filter(|c| *c != '\0').collect();
    without_nul
        .split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// `2021:07:24 19:50:17` or `2021-07-24T19:50:17+08:00` → `2021-07-24 19:50:17`.
///
/// Anything that does not look like one of those is returned unchanged.
pub fn normalize_timestamp(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() < 19 {
        return value.to_string();
    }
    let digits_at = |idx: &[usize]| idx.iter().all(|&i| bytes[i].is_ascii_digit());
    let well_formed = digits_at(&[0, 1, 2, 3, 5, 6, 8, 9, 11, 12, 14, 15, 17, 18])
        && matches!(bytes[4], b':' | b'-')
        && matches!(bytes[7], b':' | b'-')
        && matches!(bytes[10], b' ' | b'T')
        && bytes[13] == b':'
        && bytes[16] == b':';
    if !well_formed {
        return value.to_string();
    }
    format!(
        "{}-{}-{} {}",
        &value[0..4],
        &value[5..7],
        &value[8..10],
        &value[11..19]
    )
}

/// [`ExifDecoder`] backed by `nom-exif`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NomExifDecoder;

impl NomExifDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn read_tags(&self, bytes: &[u8]) -> Result<RawTags, ExifError> {
        let mut parser = MediaParser::new();
        let ms = MediaSource::seekable(Cursor::new(bytes.to_vec()))
            .map_err(|e| ExifError::Parse(e.to_string()))?;
        let iter: ExifIter = parser
            .parse(ms)
            .map_err(|e| ExifError::Parse(e.to_string()))?;
        let exif: Exif = iter.into();

        let text = |tag: ExifTag| exif.get(tag).and_then(entry_to_string);
        let number = |tag: ExifTag| exif.get(tag).and_then(entry_to_number);

        Ok(RawTags {
            make: text(ExifTag::Make),
            model: text(ExifTag::Model),
            lens_model: text(ExifTag::LensModel),
            copyright: text(ExifTag::Copyright),
            date_time_original: text(ExifTag::DateTimeOriginal),
            f_number: number(ExifTag::FNumber),
            exposure_time: exif.get(ExifTag::ExposureTime).and_then(entry_to_fraction),
            focal_length: number(ExifTag::FocalLength),
            iso: number(ExifTag::ISOSpeedRatings),
        })
    }
}

impl ExifDecoder for NomExifDecoder {
    fn decode(&self, bytes: &[u8]) -> ExifFieldMap {
        match self.read_tags(bytes) {
            Ok(raw) => build_field_map(&raw),
            Err(e) => {
                log::debug!("{e}; using empty EXIF fields");
                ExifFieldMap::EMPTY
            }
        }
    }
}

fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = match val.as_str() {
        Some(s) => s.to_string(),
        None => val.to_string(),
    };
    let s = s.trim().trim_matches('"').to_string();
    if s.is_empty() { None } else { Some(s) }
}

/// Rationals become their shortest decimal (`4/1` → `4`, `71/10` → `7.1`).
fn entry_to_number(val: &EntryValue) -> Option<String> {
    match val {
        EntryValue::URational(r) if r.1 != 0 => Some(format!("{}", r.0 as f64 / r.1 as f64)),
        other => entry_to_string(other),
    }
}

fn entry_to_fraction(val: &EntryValue) -> Option<FractionValue> {
    match val {
        EntryValue::URational(r) => Some(FractionValue::rational(r.0 as u64, r.1 as u64)),
        other => entry_to_string(other).map(FractionValue::Decimal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a7r3() -> RawTags {
        RawTags {
            make: Some("SONY".into()),
            model: Some("ILCE-7RM3A".into()),
            lens_model: Some("FE 24-105mm F4 G OSS".into()),
            copyright: Some("houkunlin".into()),
            date_time_original: Some("2021:07:24 19:50:17".into()),
            f_number: Some("4".into()),
            exposure_time: Some(FractionValue::rational(1, 40)),
            focal_length: Some("105".into()),
            iso: Some("1000".into()),
        }
    }

    #[test]
    fn builds_display_fields() {
        let map = build_field_map(&a7r3());
        assert_eq!(map.brand, "SONY");
        assert_eq!(map.lens, "FE 24-105mm F4 G OSS");
        assert_eq!(map.capture_time, "2021-07-24 19:50:17");
        assert_eq!(map.aperture, "f/4");
        assert_eq!(map.shutter_speed, "1/40s");
        assert_eq!(map.focal_length, "105mm");
        assert_eq!(map.iso, "1000");
    }

    #[test]
    fn missing_tags_are_empty_without_affixes() {
        let map = build_field_map(&RawTags::default());
        assert_eq!(map, ExifFieldMap::EMPTY);
    }

    #[test]
    fn values_are_cleaned() {
        let raw = RawTags {
            make: Some("  NIKON   CORPORATION\0\0".into()),
            f_number: Some("\0".into()),
            ..RawTags::default()
        };
        let map = build_field_map(&raw);
        assert_eq!(map.brand, "NIKON CORPORATION");
        assert_eq!(map.aperture, "");
    }

    #[test]
    fn timestamps_are_normalized() {
        assert_eq!(normalize_timestamp("2022:07:01 19:18:47"), "2022-07-01 19:18:47");
        assert_eq!(
            normalize_timestamp("2022-07-01T19:18:47+08:00"),
            "2022-07-01 19:18:47"
        );
        assert_eq!(normalize_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn decoding_non_image_bytes_yields_empty_map() {
        let map = NomExifDecoder::new().decode(b"definitely not an image");
        assert_eq!(map, ExifFieldMap::EMPTY);
    }
}
