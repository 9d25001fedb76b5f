//! `data:<mime>;base64,<payload>` strings used for image uploads.

/// Splits a base64 data URL into `(mime, payload)`.
pub fn split(data_url: &str) -> Option<(&str, &str)> {
    let rest = data_url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    if mime.is_empty() || payload.is_empty() {
        return None;
    }
    Some((mime, payload))
}

/// Whether `data_url` is a base64 data URL of an image type.
pub fn is_image(data_url: &str) -> bool {
    split(data_url).is_some_and(|(mime, _)| mime.starts_with("image/"))
}
