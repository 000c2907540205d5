//! Image extension inference from URL path or `Content-Type`.

use std::fmt;

/// Extensions an image may be stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageExt {
    Jpg,
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
}

impl ImageExt {
    pub const ALL: [ImageExt; 6] = [
        ImageExt::Jpg,
        ImageExt::Jpeg,
        ImageExt::Png,
        ImageExt::Gif,
        ImageExt::Webp,
        ImageExt::Bmp,
    ];

    /// Extension used when neither URL nor response says anything useful.
    pub const FALLBACK: ImageExt = ImageExt::Jpg;

    pub fn as_str(self) -> &'static str {
        match self {
            ImageExt::Jpg => "jpg",
            ImageExt::Jpeg => "jpeg",
            ImageExt::Png => "png",
            ImageExt::Gif => "gif",
            ImageExt::Webp => "webp",
            ImageExt::Bmp => "bmp",
        }
    }

    /// Parse a bare extension (no dot), case-insensitive.
    pub fn parse(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        ImageExt::ALL.into_iter().find(|e| e.as_str() == ext)
    }

    /// Extension of the last path segment of `url`, ignoring query and fragment.
    ///
    /// `jpeg` stays `jpeg` so the stored name mirrors the source.
    pub fn from_url(url: &str) -> Option<Self> {
        let path = match url::Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        let segment = path.rsplit('/').next()?;
        let (_, ext) = segment.rsplit_once('.')?;
        Self::parse(ext)
    }

    /// Extension for an image MIME type such as `image/png; charset=binary`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageExt::Jpg),
            "image/png" => Some(ImageExt::Png),
            "image/gif" => Some(ImageExt::Gif),
            "image/webp" => Some(ImageExt::Webp),
            "image/bmp" | "image/x-ms-bmp" => Some(ImageExt::Bmp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
