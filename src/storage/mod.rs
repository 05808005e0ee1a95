use async_trait::async_trait;
use eyre::eyre;
use futures_util::future::join_all;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::utils;

pub mod local;
pub mod s3;

const MAX_UPLOAD_RETRIES: usize = 3;

/// The four remote operations the demo needs, plus single-object upload. The
/// adapter owns the bucket identity; callers never pass a bucket name.
#[async_trait]
pub trait Storage {
    async fn create_bucket(&self) -> eyre::Result<()>;
    async fn upload(&self, key: &str, data: &[u8]) -> eyre::Result<()>;
    async fn list(&self) -> eyre::Result<Vec<String>>;
    async fn batch_delete(&self, keys: HashSet<String>) -> eyre::Result<()>;
    async fn delete_bucket(&self) -> eyre::Result<()>;

    /// Browse URL for the bucket, if the backend has one.
    fn public_url(&self) -> Option<String> {
        None
    }
}

/// Uploads every file in the staging directory (non-recursive), keyed by its
/// filename. All uploads are launched together and driven to completion; the
/// fan-out is unbounded, which is fine for the file counts this demo deals
/// with. Every upload runs even if a sibling fails, and the aggregate error
/// names each file that failed.
pub async fn upload_all(storage: Rc<dyn Storage>, staging_dir: &Path) -> eyre::Result<Vec<String>> {
    let mut filenames = Vec::new();
    for entry in fs::read_dir(staging_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            filenames.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    filenames.sort();

    let pb = utils::create_progress_bar(filenames.len() as u64);

    let uploads = filenames.iter().map(|filename| {
        let storage = Rc::clone(&storage);
        let path = staging_dir.join(filename);
        let key = filename.clone();
        let pb = pb.clone();

        async move {
            let result = upload_with_retries(storage, &path, &key).await;
            pb.inc(1);
            (key, result)
        }
    });

    let results = join_all(uploads).await;
    pb.finish_and_clear();

    let failed: Vec<String> = results
        .iter()
        .filter_map(|(key, result)| {
            result
                .as_ref()
                .err()
                .map(|e| format!("{}: {}", key, e))
        })
        .collect();

    if failed.is_empty() {
        Ok(filenames)
    } else {
        Err(eyre!(
            "{} of {} uploads failed: {}",
            failed.len(),
            filenames.len(),
            failed.join("; ")
        ))
    }
}

/// Retry only covers uploads. Bucket create and delete fail on conflicts that
/// a retry can never fix.
async fn upload_with_retries(
    storage: Rc<dyn Storage>,
    path: &Path,
    key: &str,
) -> eyre::Result<()> {
    let data = tokio::fs::read(path).await?;

    let mut retries = 0;
    loop {
        match storage.upload(key, &data).await {
            Ok(_) => return Ok(()),
            Err(e) => {
                retries += 1;
                if retries >= MAX_UPLOAD_RETRIES {
                    return Err(e);
                }
                println!("{}, retrying...", e);
            }
        }
    }
}

/// Empties the bucket and then deletes it. The object listing is re-queried
/// here rather than reusing the upload-time set, since objects may have been
/// added by an external actor in the meantime. Object deletion must complete
/// before the bucket delete is issued.
pub async fn empty_and_delete(storage: Rc<dyn Storage>) -> eyre::Result<()> {
    let keys = storage.list().await?;

    if !keys.is_empty() {
        storage.batch_delete(keys.into_iter().collect()).await?;
    }

    storage.delete_bucket().await
}

#[cfg(test)]
mod test {
    use super::local::LocalStorage;
    use super::{empty_and_delete, upload_all, Storage};
    use std::collections::HashSet;
    use std::fs;
    use std::rc::Rc;

    #[tokio::test]
    async fn should_round_trip_staged_filenames_through_upload_and_list() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = tmp.path().join("files");
        fs::create_dir_all(&staging).unwrap();

        for index in 0..3 {
            fs::write(staging.join(format!("movie-{}.mp4", index)), b"video").unwrap();
        }
        for index in 0..10 {
            fs::write(staging.join(format!("file{}.txt", index)), "File 0 Line 1\n").unwrap();
        }

        let storage: Rc<dyn Storage> =
            Rc::new(LocalStorage::new(tmp.path().join("remote"), "deletebucket-0"));
        storage.create_bucket().await.unwrap();

        let uploaded = upload_all(Rc::clone(&storage), &staging).await.unwrap();
        assert_eq!(uploaded.len(), 13);

        let listed: HashSet<String> = storage.list().await.unwrap().into_iter().collect();
        let staged: HashSet<String> = uploaded.into_iter().collect();
        assert_eq!(listed, staged);
    }

    #[tokio::test]
    async fn should_fail_to_delete_bucket_that_still_holds_objects() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(tmp.path().join("remote"), "deletebucket-1");

        storage.create_bucket().await.unwrap();
        storage.upload("file0.txt", b"File 0 Line 1\n").await.unwrap();

        assert!(storage.delete_bucket().await.is_err());
    }

    #[tokio::test]
    async fn should_empty_bucket_before_deleting_it() {
        let tmp = tempfile::tempdir().unwrap();
        let storage: Rc<dyn Storage> =
            Rc::new(LocalStorage::new(tmp.path().join("remote"), "deletebucket-2"));

        storage.create_bucket().await.unwrap();
        storage.upload("file0.txt", b"File 0 Line 1\n").await.unwrap();
        storage.upload("file1.txt", b"File 1 Line 1\n").await.unwrap();

        empty_and_delete(Rc::clone(&storage)).await.unwrap();

        assert!(storage.list().await.is_err());
    }

    #[tokio::test]
    async fn should_report_which_uploads_failed() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = tmp.path().join("files");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("file0.txt"), "File 0 Line 1\n").unwrap();

        // Bucket never created, so every upload fails
        let storage: Rc<dyn Storage> =
            Rc::new(LocalStorage::new(tmp.path().join("remote"), "deletebucket-3"));

        let error = upload_all(storage, &staging).await.unwrap_err();
        assert!(error.to_string().contains("file0.txt"));
    }
}
