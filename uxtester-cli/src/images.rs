//! Reading screenshots from disk into request parts.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::Path;
use uxtester_types::ImagePart;

/// MIME type from the file extension.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

pub fn load_image(path: &Path) -> Result<ImagePart> {
    let Some(mime) = mime_for(path) else {
        bail!("{}: unsupported image type (use png, jpeg or webp)", path.display());
    };
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(ImagePart::new(STANDARD.encode(bytes), mime))
}

/// Load every path in order; the order is the screen order of the critique.
pub fn load_images(paths: &[impl AsRef<Path>]) -> Result<Vec<ImagePart>> {
    paths.iter().map(|p| load_image(p.as_ref())).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mime_is_derived_from_extension() {
        assert_eq!(mime_for(Path::new("a/b/home.PNG")), Some("image/png"));
        assert_eq!(mime_for(Path::new("shot.jpg")), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("shot.webp")), Some("image/webp"));
        assert_eq!(mime_for(Path::new("shot.gif")), None);
        assert_eq!(mime_for(Path::new("README")), None);
    }

    #[test]
    fn loads_and_encodes_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.png");
        let second = dir.path().join("b.jpeg");
        std::fs::File::create(&first).unwrap().write_all(b"\x89PNG").unwrap();
        std::fs::File::create(&second).unwrap().write_all(b"jpeg").unwrap();

        let parts = load_images(&[&first, &second]).unwrap();
        assert_eq!(parts[0], ImagePart::new("iVBORw==", "image/png"));
        assert_eq!(parts[1].mime_type, "image/jpeg");
        assert_eq!(parts[1].data, "anBlZw==");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_image(Path::new("/nonexistent/screen.png")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/screen.png"));
    }
}
