use std::path::PathBuf;
use std::rc::Rc;

use crate::staging;
use crate::storage::{self, Storage};
use crate::utils;

/// What to do with the bucket once everything is uploaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeardownChoice {
    Delete,
    Keep,
}

pub struct RunOptions {
    pub source_dir: PathBuf,
    pub sample_files: Vec<String>,
    pub staging_dir: PathBuf,
    pub text_file_count: usize,
    pub min_lines: usize,
    pub max_lines: usize,
    /// None asks the operator on stdin
    pub teardown: Option<TeardownChoice>,
}

pub struct CommandHandler {
    storage: Rc<dyn Storage>,
    bucket_name: String,
}

impl CommandHandler {
    pub fn new(storage: Rc<dyn Storage>, bucket_name: &str) -> Self {
        CommandHandler {
            storage,
            bucket_name: bucket_name.to_owned(),
        }
    }

    /// Runs the whole demo: create bucket, stage local files, upload them
    /// concurrently, optionally tear the bucket down, remove the staging
    /// directory. If a step fails everything created so far is left in place
    /// for inspection, except that a staging failure removes the just-created
    /// (still empty) bucket so nothing billable is left orphaned.
    pub async fn handle_run(&self, opts: &RunOptions) -> eyre::Result<()> {
        println!("Creating bucket {}", self.bucket_name);
        self.storage.create_bucket().await?;

        println!("Staging local files in {}", opts.staging_dir.display());
        if let Err(e) = self.stage(opts).await {
            println!("Staging failed, removing bucket {}", self.bucket_name);
            if let Err(delete_err) = storage::empty_and_delete(Rc::clone(&self.storage)).await {
                println!("{}", delete_err);
            }
            return Err(e);
        }

        println!("Uploading files to bucket {}", self.bucket_name);
        let uploaded = storage::upload_all(Rc::clone(&self.storage), &opts.staging_dir).await?;
        println!("Uploaded {} files", uploaded.len());

        if let Some(url) = self.storage.public_url() {
            println!("You can now view the files at {}", url);
        }

        let choice = match opts.teardown {
            Some(choice) => choice,
            None => {
                if utils::prompt_yes_no("Would you like to delete the bucket? [y|n]")? {
                    TeardownChoice::Delete
                } else {
                    TeardownChoice::Keep
                }
            }
        };

        match choice {
            TeardownChoice::Delete => {
                println!("Removing all objects from bucket {}", self.bucket_name);
                storage::empty_and_delete(Rc::clone(&self.storage)).await?;
                println!("Bucket {} deleted", self.bucket_name);
            }
            TeardownChoice::Keep => {
                println!(
                    "Bucket {} kept. Remember, you are charged for storage!",
                    self.bucket_name
                );
            }
        }

        // The staging directory goes away on both branches. The run has done
        // its job by now, so a cleanup failure is only reported.
        println!("Removing staging directory {}", opts.staging_dir.display());
        if let Err(e) = staging::cleanup(&opts.staging_dir) {
            println!("{}", e);
        }

        Ok(())
    }

    async fn stage(&self, opts: &RunOptions) -> eyre::Result<()> {
        staging::stage_binary_files(&opts.source_dir, &opts.sample_files, &opts.staging_dir)?;
        staging::generate_text_files(
            &opts.staging_dir,
            opts.text_file_count,
            opts.min_lines,
            opts.max_lines,
        )
        .await
    }

    /// Empties and deletes an existing bucket, for runs that answered "n"
    /// to the prompt earlier.
    pub async fn handle_teardown(&self) -> eyre::Result<()> {
        println!("Removing all objects from bucket {}", self.bucket_name);
        storage::empty_and_delete(Rc::clone(&self.storage)).await?;
        println!("Bucket {} deleted", self.bucket_name);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{CommandHandler, RunOptions, TeardownChoice};
    use crate::storage::local::LocalStorage;
    use crate::storage::Storage;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;

    fn options(tmp: &Path, teardown: TeardownChoice) -> RunOptions {
        RunOptions {
            source_dir: tmp.join("samples"),
            sample_files: vec![
                "movie-360.mp4".to_string(),
                "movie-540.mp4".to_string(),
                "movie-720.mp4".to_string(),
            ],
            staging_dir: tmp.join("files"),
            text_file_count: 10,
            min_lines: 5,
            max_lines: 100,
            teardown: Some(teardown),
        }
    }

    fn write_samples(tmp: &Path) {
        let samples = tmp.join("samples");
        fs::create_dir_all(&samples).unwrap();
        for name in ["movie-360.mp4", "movie-540.mp4", "movie-720.mp4"] {
            fs::write(samples.join(name), b"not really a video").unwrap();
        }
    }

    #[tokio::test]
    async fn should_keep_bucket_and_objects_but_remove_staging_on_keep() {
        let tmp = tempfile::tempdir().unwrap();
        write_samples(tmp.path());

        let storage: Rc<dyn Storage> =
            Rc::new(LocalStorage::new(tmp.path().join("remote"), "deletebucket-0"));
        let handler = CommandHandler::new(Rc::clone(&storage), "deletebucket-0");

        handler
            .handle_run(&options(tmp.path(), TeardownChoice::Keep))
            .await
            .unwrap();

        let keys = storage.list().await.unwrap();
        assert_eq!(keys.len(), 13);
        assert!(!tmp.path().join("files").exists());
    }

    #[tokio::test]
    async fn should_tear_everything_down_on_delete() {
        let tmp = tempfile::tempdir().unwrap();
        write_samples(tmp.path());

        let storage: Rc<dyn Storage> =
            Rc::new(LocalStorage::new(tmp.path().join("remote"), "deletebucket-0"));
        let handler = CommandHandler::new(Rc::clone(&storage), "deletebucket-0");

        handler
            .handle_run(&options(tmp.path(), TeardownChoice::Delete))
            .await
            .unwrap();

        assert!(!tmp.path().join("remote").join("deletebucket-0").exists());
        assert!(!tmp.path().join("files").exists());
    }

    #[tokio::test]
    async fn should_abort_and_remove_bucket_when_sample_file_is_missing() {
        let tmp = tempfile::tempdir().unwrap();
        // Samples directory exists but holds none of the expected files
        fs::create_dir_all(tmp.path().join("samples")).unwrap();

        let storage: Rc<dyn Storage> =
            Rc::new(LocalStorage::new(tmp.path().join("remote"), "deletebucket-0"));
        let handler = CommandHandler::new(Rc::clone(&storage), "deletebucket-0");

        let result = handler
            .handle_run(&options(tmp.path(), TeardownChoice::Keep))
            .await;

        assert!(result.is_err());
        assert!(!tmp.path().join("remote").join("deletebucket-0").exists());
    }

    #[tokio::test]
    async fn should_fail_fast_when_bucket_name_is_taken() {
        let tmp = tempfile::tempdir().unwrap();
        write_samples(tmp.path());

        let storage: Rc<dyn Storage> =
            Rc::new(LocalStorage::new(tmp.path().join("remote"), "deletebucket-0"));
        storage.create_bucket().await.unwrap();

        let handler = CommandHandler::new(Rc::clone(&storage), "deletebucket-0");
        let result = handler
            .handle_run(&options(tmp.path(), TeardownChoice::Keep))
            .await;

        assert!(result.is_err());
        // Nothing was staged, bucket creation is the first step
        assert!(!tmp.path().join("files").exists());
    }

    #[tokio::test]
    async fn should_empty_and_delete_existing_bucket_on_teardown() {
        let tmp = tempfile::tempdir().unwrap();

        let storage: Rc<dyn Storage> =
            Rc::new(LocalStorage::new(tmp.path().join("remote"), "deletebucket-0"));
        storage.create_bucket().await.unwrap();
        storage.upload("file0.txt", b"File 0 Line 1\n").await.unwrap();

        let handler = CommandHandler::new(Rc::clone(&storage), "deletebucket-0");
        handler.handle_teardown().await.unwrap();

        assert!(!tmp.path().join("remote").join("deletebucket-0").exists());
    }
}
