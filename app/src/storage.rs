use std::collections::BTreeMap;

pub use self::local::{LocalObjectStore, ObjectHead};
#[cfg(feature = "aws-sdk")]
pub use self::s3::S3ObjectStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid object location: {0:?}")]
    InvalidKey(String),
    #[error("could not write s3://{bucket}/{key}: {message}")]
    Remote {
        bucket: String,
        key: String,
        message: String,
    },
}

/// A single object write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub metadata: BTreeMap<String, String>,
}

/// Where processed artifacts go. One handle is created at cold start and
/// shared by every invocation.
#[async_trait::async_trait]
pub trait ObjectStore: std::fmt::Debug + Send + Sync {
    async fn put_object(&self, object: PutObject) -> Result<(), StoreError>;
    fn name(&self) -> &'static str;
}

mod local {
    use std::path::{Component, Path, PathBuf};

    use serde::{Deserialize, Serialize};

    use super::{ObjectStore, PutObject, StoreError};

    const METADATA_SUFFIX: &str = ".metadata.json";

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    pub struct ObjectHead {
        pub content_type: String,
        pub metadata: std::collections::BTreeMap<String, String>,
    }

    /// Lays objects out on disk as `<root>/<bucket>/<key>`, with the content
    /// type and metadata in a `<key>.metadata.json` sidecar.
    #[derive(Debug, Clone)]
    pub struct LocalObjectStore {
        root: PathBuf,
    }

    impl LocalObjectStore {
        pub fn new<P: Into<PathBuf>>(root: P) -> Self {
            Self { root: root.into() }
        }

        pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
            let relative = Path::new(bucket).join(key);
            let escapes = relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
            if bucket.is_empty() || key.is_empty() || bucket.contains('/') || escapes {
                return Err(StoreError::InvalidKey(format!("{}/{}", bucket, key)));
            }
            Ok(self.root.join(relative))
        }

        fn head_path(path: &Path) -> PathBuf {
            let mut name = path.as_os_str().to_owned();
            name.push(METADATA_SUFFIX);
            PathBuf::from(name)
        }

        pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
            let path = self.object_path(bucket, key)?;
            Ok(tokio::fs::read(&path).await?)
        }

        pub async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectHead, StoreError> {
            let path = self.object_path(bucket, key)?;
            let head = tokio::fs::read(Self::head_path(&path)).await?;
            Ok(serde_json::from_slice(&head)?)
        }
    }

    #[async_trait::async_trait]
    impl ObjectStore for LocalObjectStore {
        async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
            let path = self.object_path(&object.bucket, &object.key)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            log::trace!("write {:?}", path);
            tokio::fs::write(&path, &object.body).await?;
            let head = ObjectHead {
                content_type: object.content_type,
                metadata: object.metadata,
            };
            tokio::fs::write(Self::head_path(&path), serde_json::to_vec_pretty(&head)?).await?;
            Ok(())
        }

        fn name(&self) -> &'static str {
            "LocalObjectStore"
        }
    }
}

#[cfg(feature = "aws-sdk")]
mod s3 {
    use aws_sdk_s3::{error::DisplayErrorContext, primitives::ByteStream};

    use super::{ObjectStore, PutObject, StoreError};

    #[derive(Debug, Clone)]
    pub struct S3ObjectStore {
        client: aws_sdk_s3::Client,
    }

    impl S3ObjectStore {
        pub fn new(client: aws_sdk_s3::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait::async_trait]
    impl ObjectStore for S3ObjectStore {
        async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
            let PutObject {
                bucket,
                key,
                body,
                content_type,
                metadata,
            } = object;
            self.client
                .put_object()
                .bucket(&bucket)
                .key(&key)
                .body(ByteStream::from(body))
                .content_type(content_type)
                .set_metadata(Some(metadata.into_iter().collect()))
                .send()
                .await
                .map_err(|e| StoreError::Remote {
                    message: DisplayErrorContext(&e).to_string(),
                    bucket,
                    key,
                })?;
            Ok(())
        }

        fn name(&self) -> &'static str {
            "S3"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(bucket: &str, key: &str) -> PutObject {
        PutObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body: b"{\"ok\":true}".to_vec(),
            content_type: "application/json".to_string(),
            metadata: BTreeMap::from([("processed-by".to_string(), "aws-lambda".to_string())]),
        }
    }

    #[tokio::test]
    async fn local_store_writes_body_and_head() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store
            .put_object(put("lamp-uploads", "processed/photo_processed.jpg"))
            .await
            .unwrap();

        let on_disk = dir
            .path()
            .join("lamp-uploads/processed/photo_processed.jpg");
        assert!(on_disk.exists());

        let body = store
            .get_object("lamp-uploads", "processed/photo_processed.jpg")
            .await
            .unwrap();
        assert_eq!(body, b"{\"ok\":true}");

        let head = store
            .head_object("lamp-uploads", "processed/photo_processed.jpg")
            .await
            .unwrap();
        assert_eq!(head.content_type, "application/json");
        assert_eq!(head.metadata["processed-by"], "aws-lambda");
    }

    #[tokio::test]
    async fn local_store_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store.put_object(put("b", "k.json")).await.unwrap();
        let mut second = put("b", "k.json");
        second.body = b"second".to_vec();
        store.put_object(second).await.unwrap();
        assert_eq!(store.get_object("b", "k.json").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn local_store_refuses_to_escape_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());
        for (bucket, key) in [
            ("b", "../../etc/passwd"),
            ("b", "/abs"),
            ("", "k"),
            ("b", ""),
            ("a/b", "k"),
        ] {
            let err = store.put_object(put(bucket, key)).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)), "{}/{}", bucket, key);
        }
    }
}
