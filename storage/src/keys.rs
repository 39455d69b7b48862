//! Key layout shared by every backend.

use crate::{StorageError, StorageResult};

pub const MEDIA_PREFIX: &str = "images/";
pub const THUMBNAIL_PREFIX: &str = "thumbnails/";

/// Key of the primary object for an uploaded file.
pub fn media_key(file_name: &str) -> String {
    format!("{}{}", MEDIA_PREFIX, file_name)
}

/// Key of the generated thumbnail for a video.
pub fn thumbnail_key(file_name: &str) -> String {
    format!("{}{}_thumbnail.jpg", THUMBNAIL_PREFIX, file_name)
}

/// Last path segment of a key.
pub fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// File names become a single key segment, so they must not contain separators.
pub fn validate_file_name(file_name: &str) -> StorageResult<()> {
    if file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains('/')
        || file_name.contains('\\')
    {
        return Err(StorageError::InvalidKey(format!(
            "Invalid file name: {:?}",
            file_name
        )));
    }
    Ok(())
}

pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|s| s == "..") {
        return Err(StorageError::InvalidKey(format!("Invalid key: {:?}", key)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(media_key("mum.jpg"), "images/mum.jpg");
        assert_eq!(thumbnail_key("party.mp4"), "thumbnails/party.mp4_thumbnail.jpg");
        assert_eq!(file_name_of("images/mum.jpg"), "mum.jpg");
        assert_eq!(file_name_of("plain"), "plain");
    }

    #[test]
    fn test_rejects_traversal() {
        assert!(validate_key("images/../secret").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("images/a..b.jpg").is_ok());
        assert!(validate_file_name("a/b.jpg").is_err());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("beach day.JPG").is_ok());
    }
}
