//! Gallery image records and accepted image types.

use chrono::{DateTime, Utc};

use ucpl_core::GalleryImageId;

/// Caption given to every uploaded image.
pub const DEFAULT_CAPTION: &str = "UCPL Gallery";

/// Public URL prefix under which the File Store is served.
pub const GALLERY_URL_PREFIX: &str = "/assets/gallery";

/// A stored gallery image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub id: GalleryImageId,
    /// Generated file name inside the File Store.
    pub filename: String,
    /// Name of the file as uploaded. Descriptive only.
    pub original_name: String,
    pub caption: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GalleryImage {
    /// Public URL of the image file.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{GALLERY_URL_PREFIX}/{}", self.filename)
    }
}

/// A gallery image whose file has been written, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGalleryImage {
    pub filename: String,
    pub original_name: String,
    pub caption: String,
}

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    /// Look up an accepted kind from a declared MIME type.
    #[must_use]
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Display name used in error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Webp => "WEBP",
        }
    }

    /// Default file extension, including the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
            Self::Webp => ".webp",
        }
    }

    /// Whether `data` starts with this format's signature.
    #[must_use]
    pub fn matches_magic(self, data: &[u8]) -> bool {
        match self {
            Self::Jpeg => data.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Png => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
            Self::Webp => {
                data.get(0..4) == Some(b"RIFF".as_slice())
                    && data.get(8..12) == Some(b"WEBP".as_slice())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime() {
        assert_eq!(ImageKind::from_mime("image/jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_mime("IMAGE/PNG"), Some(ImageKind::Png));
        assert_eq!(
            ImageKind::from_mime("image/webp; charset=binary"),
            Some(ImageKind::Webp)
        );
        assert_eq!(ImageKind::from_mime("image/gif"), None);
        assert_eq!(ImageKind::from_mime("text/html"), None);
        assert_eq!(ImageKind::from_mime(""), None);
    }

    #[test]
    fn test_matches_magic() {
        assert!(ImageKind::Jpeg.matches_magic(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!ImageKind::Jpeg.matches_magic(b"GIF89a"));
        assert!(ImageKind::Png.matches_magic(&[0x89, b'P', b'N', b'G', 0x0D]));
        assert!(ImageKind::Webp.matches_magic(b"RIFF\x10\x00\x00\x00WEBPVP8 "));
        assert!(!ImageKind::Webp.matches_magic(b"RIFF\x10\x00\x00\x00WAVE"));
        assert!(!ImageKind::Webp.matches_magic(b"RIFF"));
    }

    #[test]
    fn test_url() {
        let image = GalleryImage {
            id: GalleryImageId::new(),
            filename: "1700000000000-000000042.jpg".to_string(),
            original_name: "reading-room.JPG".to_string(),
            caption: DEFAULT_CAPTION.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(image.url(), "/assets/gallery/1700000000000-000000042.jpg");
    }
}
