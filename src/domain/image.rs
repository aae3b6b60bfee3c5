// URLs of images on the hosted image service.

use std::fmt;

const HOST: &str = "https://res.cloudinary.com";

/// Height (in pixels) post images are scaled to.
pub const POST_IMAGE_HEIGHT: u32 = 600;

/// Height (in pixels) topic thumbnails are scaled to.
pub const TOPIC_THUMB_HEIGHT: u32 = 400;

/// Folder cover images are uploaded into.
pub const COVER_IMAGE_FOLDER: &str = "post-cover-images";

/// Folder images embedded in a post body are uploaded into.
pub const EMBED_IMAGE_FOLDER: &str = "post-images";

/// Builds delivery URLs for hosted images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrls {
    cloud_id: String,
}

impl ImageUrls {
    /// Create a URL builder for the given image-host account.
    #[must_use]
    pub fn new(cloud_id: impl Into<String>) -> Self {
        Self {
            cloud_id: cloud_id.into(),
        }
    }

    /// Scaled URL of an image, with an optional format extension.
    #[must_use]
    pub fn scaled(&self, height: u32, path: &str, ext: Option<&str>) -> String {
        let mut url = format!(
            "{HOST}/{}/image/upload/c_scale,h_{height}/{path}",
            self.cloud_id
        );
        if let Some(ext) = ext {
            url.push('.');
            url.push_str(ext);
        }
        url
    }

    /// URL of a post cover image.
    #[must_use]
    pub fn cover_image(&self, path: &str) -> String {
        self.scaled(POST_IMAGE_HEIGHT, path, Some("webp"))
    }

    /// URL of an image embedded in a post body.
    ///
    /// Embedded images keep the format they were uploaded with.
    #[must_use]
    pub fn embedded_image(&self, path: &str) -> String {
        self.scaled(POST_IMAGE_HEIGHT, path, None)
    }

    /// URL of a topic thumbnail.
    #[must_use]
    pub fn topic_thumb(&self, path: &str) -> String {
        self.scaled(TOPIC_THUMB_HEIGHT, path, Some("webp"))
    }
}

/// Destination folder of an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFolder {
    /// Post cover images.
    Cover,
    /// Images embedded in a post body.
    Embed,
}

impl ImageFolder {
    /// Folder name on the image host.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cover => COVER_IMAGE_FOLDER,
            Self::Embed => EMBED_IMAGE_FOLDER,
        }
    }
}

impl fmt::Display for ImageFolder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sniff the format of an encoded image from its leading bytes.
///
/// Returns `None` for anything other than PNG, JPEG, GIF or WEBP.
#[must_use]
pub fn detect_format(data: &[u8]) -> Option<&'static str> {
    match data {
        [0x89, b'P', b'N', b'G', ..] => Some("png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("jpg"),
        [b'G', b'I', b'F', b'8', ..] => Some("gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("webp"),
        _ => None,
    }
}
