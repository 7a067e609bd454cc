use serde::{Deserialize, Serialize};

/// The nine display fields an overlay template can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExifField {
    Brand,
    Model,
    Lens,
    Copyright,
    CaptureTime,
    Aperture,
    ShutterSpeed,
    FocalLength,
    Iso,
}

impl ExifField {
    pub const ALL: [ExifField; 9] = [
        ExifField::Brand,
        ExifField::Model,
        ExifField::Lens,
        ExifField::Copyright,
        ExifField::CaptureTime,
        ExifField::Aperture,
        ExifField::ShutterSpeed,
        ExifField::FocalLength,
        ExifField::Iso,
    ];

    /// Canonical placeholder name.
    pub fn name(self) -> &'static str {
        match self {
            ExifField::Brand => "brand",
            ExifField::Model => "model",
            ExifField::Lens => "lens",
            ExifField::Copyright => "copyright",
            ExifField::CaptureTime => "captureTime",
            ExifField::Aperture => "aperture",
            ExifField::ShutterSpeed => "shutterSpeed",
            ExifField::FocalLength => "focalLength",
            ExifField::Iso => "iso",
        }
    }

    /// Localised placeholder name accepted alongside [`name`](Self::name).
    pub fn alias(self) -> &'static str {
        match self {
            ExifField::Brand => "相机品牌",
            ExifField::Model => "相机型号",
            ExifField::Lens => "镜头型号",
            ExifField::Copyright => "版权",
            ExifField::CaptureTime => "拍摄时间",
            ExifField::Aperture => "光圈",
            ExifField::ShutterSpeed => "快门",
            ExifField::FocalLength => "焦距",
            ExifField::Iso => "感光度",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == name || f.alias() == name)
    }
}

/// Decoded EXIF display strings. Absent tags are empty, never missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExifFieldMap {
    pub brand: String,
    pub model: String,
    pub lens: String,
    pub copyright: String,
    pub capture_time: String,
    pub aperture: String,
    pub shutter_speed: String,
    pub focal_length: String,
    pub iso: String,
}

impl ExifFieldMap {
    /// The map used before a photo is loaded and after it is cleared.
    pub const EMPTY: ExifFieldMap = ExifFieldMap {
        brand: String::new(),
        model: String::new(),
        lens: String::new(),
        copyright: String::new(),
        capture_time: String::new(),
        aperture: String::new(),
        shutter_speed: String::new(),
        focal_length: String::new(),
        iso: String::new(),
    };

    pub fn get(&self, field: ExifField) -> &str {
        match field {
            ExifField::Brand => &self.brand,
            ExifField::Model => &self.model,
            ExifField::Lens => &self.lens,
            ExifField::Copyright => &self.copyright,
            ExifField::CaptureTime => &self.capture_time,
            ExifField::Aperture => &self.aperture,
            ExifField::ShutterSpeed => &self.shutter_speed,
            ExifField::FocalLength => &self.focal_length,
            ExifField::Iso => &self.iso,
        }
    }

    pub fn set(&mut self, field: ExifField, value: String) {
        let slot = match field {
            ExifField::Brand => &mut self.brand,
            ExifField::Model => &mut self.model,
            ExifField::Lens => &mut self.lens,
            ExifField::Copyright => &mut self.copyright,
            ExifField::CaptureTime => &mut self.capture_time,
            ExifField::Aperture => &mut self.aperture,
            ExifField::ShutterSpeed => &mut self.shutter_speed,
            ExifField::FocalLength => &mut self.focal_length,
            ExifField::Iso => &mut self.iso,
        };
        *slot = value;
    }

    /// Look up a placeholder by canonical name or alias.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        ExifField::from_name(name).map(|f| self.get(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExifField, &str)> {
        ExifField::ALL.into_iter().map(|f| (f, self.get(f)))
    }
}
