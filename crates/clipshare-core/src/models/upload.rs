use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One stored file inside an upload.
///
/// `storage_path` is always `uploads/{code}/{name}`; it is the key the object store
/// knows the blob by and the key the reaper deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub storage_path: String,
    pub public_url: String,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

/// Persisted metadata for one upload batch.
///
/// Created once by the ingestor and never mutated; destroyed as a whole by
/// the reaper. `files` keeps the order in which the files were uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: Uuid,
    pub code: String,
    pub files: Vec<FileEntry>,
    pub created_at: DateTime<Utc>,
}

impl UploadRecord {
    pub fn new(code: String, files: Vec<FileEntry>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            files,
            created_at,
        }
    }

    /// Point in time at which the record becomes eligible for deletion.
    pub fn expires_at(&self, retention: Duration) -> DateTime<Utc> {
        self.created_at + retention
    }

    /// A record is expired once its age reaches the retention window.
    ///
    /// Expired records stay resolvable until a sweep actually removes them.
    pub fn is_expired(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        now - self.created_at >= retention
    }
}

/// One element of an ingestion batch.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl NewFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }
}

/// File as exposed to clients (no internal storage path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SharedFile {
    pub name: String,
    /// Public URL the file can be fetched from
    pub url: String,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

impl From<&FileEntry> for SharedFile {
    fn from(entry: &FileEntry) -> Self {
        Self {
            name: entry.name.clone(),
            url: entry.public_url.clone(),
            content_type: entry.content_type.clone(),
            size: entry.size,
        }
    }
}

/// Response returned after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Short code to hand to the receiver
    pub code: String,
    /// Deep link into the receive flow (`?code=<code>`), when a public base URL is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
    pub files: Vec<SharedFile>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Manifest returned when a code is resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ManifestResponse {
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub files: Vec<SharedFile>,
}

impl ManifestResponse {
    pub fn from_record(record: &UploadRecord, retention: Duration) -> Self {
        Self {
            code: record.code.clone(),
            created_at: record.created_at,
            expires_at: record.expires_at(retention),
            files: record.files.iter().map(SharedFile::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            storage_path: format!("uploads/Ab3dE5gH/{}", name),
            public_url: format!("http://localhost:4000/files/uploads/Ab3dE5gH/{}", name),
            content_type: "image/png".to_string(),
            size: Some(3),
        }
    }

    #[test]
    fn expiry_is_inclusive_of_the_retention_boundary() {
        let created = Utc::now();
        let record = UploadRecord::new("Ab3dE5gH".to_string(), vec![entry("a.png")], created);
        let retention = Duration::minutes(5);

        assert!(!record.is_expired(created + Duration::minutes(4), retention));
        assert!(record.is_expired(created + Duration::minutes(5), retention));
        assert!(record.is_expired(created + Duration::minutes(10), retention));
        assert_eq!(record.expires_at(retention), created + retention);
    }

    #[test]
    fn manifest_keeps_upload_order_and_hides_storage_paths() {
        let record = UploadRecord::new(
            "Ab3dE5gH".to_string(),
            vec![entry("b.pdf"), entry("a.png")],
            Utc::now(),
        );
        let manifest = ManifestResponse::from_record(&record, Duration::minutes(5));

        let names: Vec<_> = manifest.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.pdf", "a.png"]);

        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json["files"][0].get("storage_path").is_none());
        assert_eq!(json["files"][0]["url"], "http://localhost:4000/files/uploads/Ab3dE5gH/b.pdf");
    }
}
