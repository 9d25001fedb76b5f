//! Image files to base64 data URLs, the upload format the backend expects.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use tripsnap_core::{Result, TripsnapError};

/// Encodes raw bytes as `data:<mime>;base64,<payload>`.
pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Reads an image file and encodes it as a data URL.
///
/// The MIME type is guessed from the extension; non-image files are rejected.
pub async fn encode_image_file(path: &Path) -> Result<String> {
    let mime = mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .ok_or_else(|| {
            TripsnapError::validation(format!("{} is not an image file", path.display()))
        })?;

    let bytes = tokio::fs::read(path).await?;
    tracing::debug!(
        "[Image] Encoded {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime
    );
    Ok(to_data_url(&bytes, mime.essence_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripsnap_core::data_url;

    #[test]
    fn test_to_data_url() {
        let url = to_data_url(b"hi", "image/png");
        assert_eq!(url, "data:image/png;base64,aGk=");
        assert!(data_url::is_image(&url));
    }

    #[tokio::test]
    async fn test_encode_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bread.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let url = encode_image_file(&path).await.unwrap();
        assert_eq!(url, "data:image/jpeg;base64,/9j/");
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = encode_image_file(&path).await.unwrap_err();
        assert!(err.is_validation());
    }
}
