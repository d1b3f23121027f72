//! Reading photos from disk for submission.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use facelens_core::upload::{person_name_from_file_name, UploadFile};
use std::io::Cursor;
use std::path::Path;

/// Read a file and encode it as base64, the form the API expects.
pub fn read_base64(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(STANDARD.encode(bytes))
}

/// Pixel height of an image file, or `None` if it cannot be decoded.
pub fn natural_height_of_file(path: &Path) -> Option<f32> {
    match image::image_dimensions(path) {
        Ok((_, h)) => Some(h as f32),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read image dimensions");
            None
        }
    }
}

/// Pixel height of a base64-encoded image, or `None` if it cannot be decoded.
pub fn natural_height_of_base64(data: &str) -> Option<f32> {
    let bytes = STANDARD.decode(data.trim()).ok()?;
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    reader.into_dimensions().ok().map(|(_, h)| h as f32)
}

/// Load photos named after the person they show.
///
/// Files whose name yields no person are skipped with a warning.
pub fn load_named_photos(paths: &[impl AsRef<Path>]) -> Result<Vec<UploadFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let Some(name) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(person_name_from_file_name)
        else {
            tracing::warn!(path = %path.display(), "cannot derive a person name; skipping");
            continue;
        };
        files.push(UploadFile {
            name,
            image_data: read_base64(path)?,
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("facelens-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_named_photos_groups_by_stem() {
        let dir = temp_dir("photos");
        let paths: Vec<_> = ["John Doe.jpg", "John Doe (2).jpg", "Jane Roe - Copy.png"]
            .iter()
            .map(|name| {
                let p = dir.join(name);
                std::fs::write(&p, b"hi").unwrap();
                p
            })
            .collect();

        let files = load_named_photos(&paths).unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].name, "John Doe");
        assert_eq!(files[1].name, "John Doe");
        assert_eq!(files[2].name, "Jane Roe");
        assert_eq!(files[0].image_data, "aGk=");

        let groups = facelens_core::group_uploads(files);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].images.len(), 2);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = read_base64(Path::new("/nonexistent/facelens.jpg")).unwrap_err();
        assert!(err.to_string().contains("facelens.jpg"));
    }

    #[test]
    fn test_natural_height_of_encoded_png() {
        let img = image::RgbImage::new(4, 6);
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png).unwrap();
        assert_eq!(natural_height_of_base64(&STANDARD.encode(&png)), Some(6.0));
        assert_eq!(natural_height_of_base64("not base64!"), None);
    }
}
