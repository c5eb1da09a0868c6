pub const UPLOADS_PREFIX: &str = "uploads/";
pub const PROCESSED_PREFIX: &str = "processed/";
pub const PROCESSED_SUFFIX: &str = "_processed.jpg";

pub fn is_upload(key: &str, uploads_prefix: &str) -> bool {
    key.starts_with(uploads_prefix)
}

/// `uploads/a/photo.png` -> `processed/photo_processed.jpg`
///
/// Only the last path segment is kept, cut at its first `.`.
pub fn processed_key(key: &str, processed_prefix: &str) -> String {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let stem = file_name.split('.').next().unwrap_or(file_name);
    format!("{}{}{}", processed_prefix, stem, PROCESSED_SUFFIX)
}

pub fn object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_prefix() {
        assert!(is_upload("uploads/photo.png", UPLOADS_PREFIX));
        assert!(!is_upload("other/photo.png", UPLOADS_PREFIX));
        assert!(!is_upload("uploadsphoto.png", UPLOADS_PREFIX));
    }

    #[test]
    fn processed_key_from_upload() {
        assert_eq!(
            processed_key("uploads/photo.png", PROCESSED_PREFIX),
            "processed/photo_processed.jpg"
        );
        assert_eq!(
            processed_key("uploads/2024/03/photo.png", PROCESSED_PREFIX),
            "processed/photo_processed.jpg"
        );
    }

    #[test]
    fn processed_key_cuts_at_first_dot() {
        assert_eq!(
            processed_key("uploads/archive.tar.gz", PROCESSED_PREFIX),
            "processed/archive_processed.jpg"
        );
        assert_eq!(
            processed_key("uploads/noext", PROCESSED_PREFIX),
            "processed/noext_processed.jpg"
        );
        assert_eq!(
            processed_key("uploads/.hidden", PROCESSED_PREFIX),
            "processed/_processed.jpg"
        );
    }

    #[test]
    fn url_format() {
        assert_eq!(
            object_url("lamp-uploads", "us-east-1", "processed/photo_processed.jpg"),
            "https://lamp-uploads.s3.us-east-1.amazonaws.com/processed/photo_processed.jpg"
        );
    }
}
