use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use axum::extract::Multipart;
use image::ImageFormat;

use crate::{error::AppResult, forms::FormErrors};

pub const MAX_IMAGE_KB: usize = 700;
pub const IMAGE_DIR: &str = "movies/images";
pub const INVALID_IMAGE: &str = "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    /// The formats accepted for photos and posters.
    pub fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(ImageKind::Png),
            ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            ImageFormat::Gif => Some(ImageKind::Gif),
            ImageFormat::WebP => Some(ImageKind::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }
}

/// Guesses the format from the leading bytes, then decodes the whole image.
/// Only an image that decodes cleanly gets a kind.
pub fn decode_image(bytes: &[u8]) -> Option<ImageKind> {
    let format = image::guess_format(bytes).ok()?;
    let kind = ImageKind::from_format(format)?;
    match image::load_from_memory_with_format(bytes, format) {
        Ok(decoded) => {
            tracing::debug!(
                width = decoded.width(),
                height = decoded.height(),
                format = kind.extension(),
                "decoded upload"
            );
            Some(kind)
        },
        Err(err) => {
            tracing::debug!(error = %err, "rejected undecodable upload");
            None
        },
    }
}

/// A drained multipart body: repeated text fields keep every value.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<u8>>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if field.file_name().is_some() {
                let bytes = field.bytes().await?;
                // Browsers send an empty part for a file input left blank.
                if !bytes.is_empty() {
                    form.files.insert(name, bytes.to_vec());
                }
            } else {
                let text = field.text().await?;
                form.fields.entry(name).or_default().push(text);
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).and_then(|v| v.first()).cloned().unwrap_or_default()
    }

    pub fn all(&self, name: &str) -> Vec<String> {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files.remove(name)
    }
}

/// Size and decode checks for an uploaded photo or poster.
pub fn validate_image(
    field: &'static str,
    upload: Option<Vec<u8>>,
    errors: &mut FormErrors,
) -> Option<(ImageKind, Vec<u8>)> {
    let Some(bytes) = upload.filter(|b| !b.is_empty()) else {
        errors.add(field, crate::forms::REQUIRED);
        return None;
    };
    if bytes.len() > MAX_IMAGE_KB * 1024 {
        errors.add(field, format!("Files cannot be larger than {MAX_IMAGE_KB}KB"));
        return None;
    }
    let Some(kind) = decode_image(&bytes) else {
        errors.add(field, INVALID_IMAGE);
        return None;
    };
    Some((kind, bytes))
}

#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the image under a random name and returns its path relative to
    /// the media root, which is what the records store.
    pub async fn save_image(&self, kind: ImageKind, bytes: &[u8]) -> AppResult<String> {
        let dir = self.root.join(IMAGE_DIR);
        tokio::fs::create_dir_all(&dir).await?;
        let name = format!("{}.{}", uuid::Uuid::new_v4().simple(), kind.extension());
        tokio::fs::write(dir.join(&name), bytes).await?;
        tracing::debug!(file = %name, bytes = bytes.len(), "stored image");
        Ok(format!("{IMAGE_DIR}/{name}"))
    }

    /// Best effort; a missing file is not an error.
    pub async fn remove(&self, relative: &str) {
        if let Err(err) = tokio::fs::remove_file(self.root.join(relative)).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(file = %relative, error = %err, "failed to remove image");
            }
        }
    }
}

pub fn media_url(relative: &str) -> String {
    format!("/media/{relative}")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{Rgb, RgbImage};

    use super::*;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::from_pixel(4, 3, Rgb([200, 30, 30])).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_real_images() {
        assert_eq!(decode_image(&encoded(ImageFormat::Png)), Some(ImageKind::Png));
        assert_eq!(decode_image(&encoded(ImageFormat::Gif)), Some(ImageKind::Gif));
        assert_eq!(decode_image(b"hello world"), None);
    }

    #[test]
    fn rejects_corrupt_png() {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(b"this is definitely not image data");
        let mut errors = FormErrors::default();
        assert!(validate_image("photo", Some(bytes), &mut errors).is_none());
        assert_eq!(errors.get("photo"), [INVALID_IMAGE]);
    }

    #[test]
    fn rejects_truncated_png() {
        let mut bytes = encoded(ImageFormat::Png);
        bytes.truncate(bytes.len() / 2);
        assert_eq!(decode_image(&bytes), None);
    }

    #[test]
    fn rejects_oversized_images() {
        let mut bytes = encoded(ImageFormat::Png);
        bytes.resize(MAX_IMAGE_KB * 1024 + 1, 0);
        let mut errors = FormErrors::default();
        assert!(validate_image("photo", Some(bytes), &mut errors).is_none());
        assert_eq!(errors.get("photo"), ["Files cannot be larger than 700KB"]);
    }

    #[test]
    fn accepts_a_small_png() {
        let mut errors = FormErrors::default();
        let accepted = validate_image("poster", Some(encoded(ImageFormat::Png)), &mut errors);
        assert_eq!(accepted.map(|(kind, _)| kind), Some(ImageKind::Png));
        assert!(errors.is_empty());
    }

    #[test]
    fn rejects_missing_and_non_images() {
        let mut errors = FormErrors::default();
        assert!(validate_image("poster", None, &mut errors).is_none());
        assert!(validate_image("photo", Some(b"not an image".to_vec()), &mut errors).is_none());
        assert_eq!(errors.get("poster"), [crate::forms::REQUIRED]);
        assert_eq!(errors.get("photo"), [INVALID_IMAGE]);
    }

    #[tokio::test]
    async fn saves_under_media_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());
        let relative = store.save_image(ImageKind::Png, &encoded(ImageFormat::Png)).await.unwrap();
        assert!(relative.starts_with("movies/images/"));
        assert!(relative.ends_with(".png"));
        assert!(dir.path().join(&relative).exists());
        store.remove(&relative).await;
        assert!(!dir.path().join(&relative).exists());
    }
}
