use super::Storage;
use async_trait::async_trait;
use eyre::eyre;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

/// Directory-backed stand-in for the remote service: the bucket is a
/// subdirectory under `root` and objects are plain files inside it. The
/// semantics mirror S3 where it matters, in particular `delete_bucket`
/// refuses a non-empty bucket.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    bucket_name: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, bucket_name: &str) -> Self {
        LocalStorage {
            root: root.into(),
            bucket_name: bucket_name.to_owned(),
        }
    }

    fn bucket_path(&self) -> PathBuf {
        self.root.join(&self.bucket_name)
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.bucket_path().join(key)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn create_bucket(&self) -> eyre::Result<()> {
        let path = self.bucket_path();
        if path.exists() {
            return Err(eyre!(
                "Could not create bucket {}: it already exists",
                self.bucket_name
            ));
        }

        match fs::create_dir_all(&path) {
            Ok(_) => Ok(()),
            Err(e) => Err(eyre!(
                "Could not create bucket {} with error: {}",
                self.bucket_name,
                e
            )),
        }
    }

    async fn upload(&self, key: &str, data: &[u8]) -> eyre::Result<()> {
        match fs::write(self.object_path(key), data) {
            Ok(_) => Ok(()),
            Err(e) => Err(eyre!(
                "Could not upload {} to bucket {} with error: {}",
                key,
                self.bucket_name,
                e
            )),
        }
    }

    async fn list(&self) -> eyre::Result<Vec<String>> {
        let entries = match fs::read_dir(self.bucket_path()) {
            Ok(entries) => entries,
            Err(e) => {
                return Err(eyre!(
                    "Could not list bucket {} with error: {}",
                    self.bucket_name,
                    e
                ))
            }
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            keys.push(entry.file_name().to_string_lossy().into_owned());
        }
        keys.sort();

        Ok(keys)
    }

    async fn batch_delete(&self, keys: HashSet<String>) -> eyre::Result<()> {
        for key in keys {
            match fs::remove_file(self.object_path(&key)) {
                Ok(_) => {}
                Err(e) => {
                    return Err(eyre!(
                        "Could not delete {} from bucket {} with error: {}",
                        key,
                        self.bucket_name,
                        e
                    ))
                }
            }
        }

        Ok(())
    }

    async fn delete_bucket(&self) -> eyre::Result<()> {
        // Non-recursive on purpose, deleting a non-empty bucket must fail
        match fs::remove_dir(self.bucket_path()) {
            Ok(_) => Ok(()),
            Err(e) => Err(eyre!(
                "Could not delete bucket {} with error: {}",
                self.bucket_name,
                e
            )),
        }
    }
}
