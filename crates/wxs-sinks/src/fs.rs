use std::path::{Component, Path, PathBuf};

use tokio::fs::{create_dir_all, write};
use tracing::debug;
use wxs_core::{ObjectStore, PipelineError, PipelineResult, PutObjectAck, PutObjectRequest};

/// Object store laid out on the local filesystem as `root/<bucket>/<key>`
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolve an object path; `None` if bucket or key would escape the root
    pub fn object_path(&self, bucket: &str, key: &str) -> Option<PathBuf> {
        let relative = Path::new(bucket).join(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if bucket.is_empty() || key.is_empty() || escapes {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl ObjectStore for FsObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> PipelineResult<PutObjectAck> {
        let Some(path) = self.object_path(&request.bucket, &request.key) else {
            return Ok(PutObjectAck { status: 400 });
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::WriteFailed(format!("{}: {}", parent.display(), e)))?;
        }
        write(&path, request.body.as_bytes())
            .await
            .map_err(|e| PipelineError::WriteFailed(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), bytes = request.body.len(), "Object written");
        Ok(PutObjectAck { status: 200 })
    }
}
