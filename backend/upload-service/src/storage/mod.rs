// Storage module for S3 integration

pub mod s3_client;
pub mod sniff;

#[cfg(test)]
pub(crate) mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::config::StorageConfig;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to load SDK config: {0}")]
    Config(String),

    #[error("failed to upload file: {0}")]
    Backend(String),
}

/// The single capability the upload path needs from an object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, content_type: &str, body: Bytes) -> Result<(), StorageError>;
}

/// How a stored key is turned into a public URL
///
/// Neither strategy checks that the object is actually readable at the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicUrl {
    /// `https://{bucket}.s3.{region}.amazonaws.com/{key}`
    VirtualHosted { bucket: String, region: String },
    /// `{base}/{key}`, for CDNs and S3-compatible stores
    BaseUrl(String),
}

impl PublicUrl {
    pub fn from_config(config: &StorageConfig, resolved_region: &str) -> Self {
        match &config.public_base_url {
            Some(base) => PublicUrl::BaseUrl(base.trim_end_matches('/').to_string()),
            None => PublicUrl::VirtualHosted {
                bucket: config.bucket.clone(),
                region: resolved_region.to_string(),
            },
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        match self {
            PublicUrl::VirtualHosted { bucket, region } => {
                format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
            }
            PublicUrl::BaseUrl(base) => format!("{}/{}", base, key),
        }
    }
}

/// Stores uploaded bytes under generated keys and hands back their public URLs
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
    public_url: PublicUrl,
}

impl StorageClient {
    pub fn new(store: Arc<dyn ObjectStore>, public_url: PublicUrl) -> Self {
        Self { store, public_url }
    }

    /// Store `body` under `{directory}/{uuid}{ext}` and return its public URL
    pub async fn store(
        &self,
        body: Bytes,
        directory: &str,
        original_filename: &str,
    ) -> Result<String, StorageError> {
        let key = object_key(directory, original_filename);
        let content_type = sniff::detect_content_type(&body);

        tracing::debug!(
            key = %key,
            content_type = %content_type,
            size = body.len(),
            "Putting object"
        );

        self.store.put_object(&key, content_type, body).await?;

        Ok(self.public_url.url_for(&key))
    }
}

/// Generate a fresh storage key; only the extension of `original_filename` is kept
pub fn object_key(directory: &str, original_filename: &str) -> String {
    format!(
        "{}/{}{}",
        directory,
        Uuid::new_v4(),
        extension(original_filename)
    )
}

/// Extension of the file's base name, dot included, or `""`
pub fn extension(filename: &str) -> &str {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    match base.rfind('.') {
        Some(idx) => &base[idx..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio_test::assert_ok;

    fn client(store: Arc<MemoryStore>) -> StorageClient {
        StorageClient::new(
            store,
            PublicUrl::VirtualHosted {
                bucket: "media".to_string(),
                region: "us-east-1".to_string(),
            },
        )
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("photo.png"), ".png");
        assert_eq!(extension("archive.tar.gz"), ".gz");
        assert_eq!(extension("README"), "");
        assert_eq!(extension(".bashrc"), ".bashrc");
        assert_eq!(extension("trailing."), ".");
        assert_eq!(extension("dir.d/noext"), "");
        assert_eq!(extension("C:\\Users\\me\\report.pdf"), ".pdf");
        assert_eq!(extension(""), "");
    }

    #[test]
    fn test_object_key_shape() {
        let key = object_key("archive", "scan.pdf");
        let rest = key.strip_prefix("archive/").unwrap();
        let id = rest.strip_suffix(".pdf").unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_object_keys_are_unique() {
        assert_ne!(object_key("uploads", "a.txt"), object_key("uploads", "a.txt"));
    }

    #[test]
    fn test_virtual_hosted_url() {
        let url = PublicUrl::VirtualHosted {
            bucket: "media".to_string(),
            region: "eu-west-1".to_string(),
        };
        assert_eq!(
            url.url_for("uploads/x.png"),
            "https://media.s3.eu-west-1.amazonaws.com/uploads/x.png"
        );
    }

    #[test]
    fn test_base_url_from_config() {
        let config = StorageConfig {
            region: None,
            bucket: "media".to_string(),
            public_base_url: Some("https://cdn.example.com/".to_string()),
        };
        let url = PublicUrl::from_config(&config, "us-east-1");
        assert_eq!(url.url_for("uploads/x.png"), "https://cdn.example.com/uploads/x.png");

        let config = StorageConfig {
            public_base_url: None,
            ..config
        };
        assert_eq!(
            PublicUrl::from_config(&config, "us-east-1"),
            PublicUrl::VirtualHosted {
                bucket: "media".to_string(),
                region: "us-east-1".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_store_sniffs_content_type() {
        let store = Arc::new(MemoryStore::new());
        let png = Bytes::from_static(b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR");

        let url = assert_ok!(client(store.clone()).store(png, "uploads", "notes.txt").await);

        let objects = store.objects();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].content_type, "image/png");
        assert!(objects[0].key.starts_with("uploads/"));
        assert!(objects[0].key.ends_with(".txt"));
        assert_eq!(
            url,
            format!("https://media.s3.us-east-1.amazonaws.com/{}", objects[0].key)
        );
    }

    #[tokio::test]
    async fn test_store_propagates_backend_error() {
        let store = Arc::new(MemoryStore::failing_on(1));
        let result = client(store.clone())
            .store(Bytes::from_static(b"hello"), "uploads", "a.txt")
            .await;

        assert!(matches!(result, Err(StorageError::Backend(_))));
        assert!(store.objects().is_empty());
    }
}
