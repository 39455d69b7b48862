use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "m4v", "3gp", "flv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

impl MediaType {
    /// Videos are recognised by extension, everything else is an image.
    pub fn classify(file_name: &str) -> Self {
        let is_video = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                VIDEO_EXTENSIONS
                    .iter()
                    .any(|v| v.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false);
        if is_video {
            MediaType::Video
        } else {
            MediaType::Image
        }
    }

    /// Lenient parse of the stored `fileType` field.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("video") => MediaType::Video,
            _ => MediaType::Image,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaType::Video)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document exactly as the backend returned it.
///
/// Field names on the wire match the documents written by the web client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDocument {
    pub id: String,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(rename = "fileType", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// A document that passed validation and can be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub id: String,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    pub file_name: String,
    pub media_type: MediaType,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl MediaRecord {
    /// Returns `None` when the media URL or file name is missing.
    pub fn from_document(doc: RecordDocument) -> Option<Self> {
        let media_url = doc.media_url.filter(|u| !u.is_empty())?;
        let file_name = doc.file_name.filter(|n| !n.is_empty())?;
        let media_type = MediaType::from_wire(doc.media_type.as_deref());
        Some(MediaRecord {
            id: doc.id,
            media_url,
            thumbnail_url: doc.thumbnail_url.filter(|u| !u.is_empty()),
            file_name,
            media_type,
            uploaded_at: doc.uploaded_at,
        })
    }

    pub fn to_document(&self) -> RecordDocument {
        RecordDocument {
            id: self.id.clone(),
            media_url: Some(self.media_url.clone()),
            thumbnail_url: self.thumbnail_url.clone(),
            file_name: Some(self.file_name.clone()),
            media_type: Some(self.media_type.as_str().to_string()),
            uploaded_at: self.uploaded_at,
        }
    }

    /// Thumbnail to show in the grid; videos without one fall back to nothing.
    pub fn preview_url(&self) -> Option<&str> {
        match self.media_type {
            MediaType::Image => Some(&self.media_url),
            MediaType::Video => self.thumbnail_url.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(MediaType::classify("party.MP4"), MediaType::Video);
        assert_eq!(MediaType::classify("clip.3gp"), MediaType::Video);
        assert_eq!(MediaType::classify("mum.jpeg"), MediaType::Image);
        assert_eq!(MediaType::classify("mp4"), MediaType::Image);
        assert_eq!(MediaType::classify("notes.txt"), MediaType::Image);
    }

    #[test]
    fn test_from_document_requires_url_and_name() {
        let doc = RecordDocument {
            id: "a.jpg".into(),
            media_url: Some("http://x/a.jpg".into()),
            file_name: None,
            ..Default::default()
        };
        assert!(MediaRecord::from_document(doc).is_none());

        let doc = RecordDocument {
            id: "a.jpg".into(),
            media_url: Some("http://x/a.jpg".into()),
            file_name: Some("a.jpg".into()),
            media_type: Some("unknown".into()),
            ..Default::default()
        };
        let record = MediaRecord::from_document(doc).unwrap();
        assert_eq!(record.media_type, MediaType::Image);
        assert_eq!(record.thumbnail_url, None);
    }

    #[test]
    fn test_wire_field_names() {
        let json = r#"{"id":"v.mp4","imageUrl":"u","fileName":"v.mp4","fileType":"video","thumbnailUrl":"t","uploadedAt":"2024-03-01T10:00:00Z"}"#;
        let doc: RecordDocument = serde_json::from_str(json).unwrap();
        let record = MediaRecord::from_document(doc.clone()).unwrap();
        assert!(record.media_type.is_video());
        assert_eq!(record.preview_url(), Some("t"));
        assert_eq!(record.to_document(), doc);
    }
}
