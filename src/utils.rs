use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use eyre::eyre;

pub const DEFAULT_REGION_NAME: &str = "eu-north-1";
pub const DEFAULT_BUCKET_PREFIX: &str = "deletebucket";

pub fn get_aws_region_name_from_env() -> String {
    env::var("AWS_REGION_NAME").unwrap_or_else(|_| DEFAULT_REGION_NAME.to_string())
}

pub fn get_aws_endpoint_from_env() -> Option<String> {
    env::var("AWS_ENDPOINT").ok()
}

pub fn get_bucket_prefix_from_env() -> String {
    env::var("BUCKET_PREFIX").unwrap_or_else(|_| DEFAULT_BUCKET_PREFIX.to_string())
}

/// Bucket names must be unique within the region, so derive one from the
/// creation time.
pub fn generate_bucket_name(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    format!("{}-{}", prefix, timestamp)
}

pub fn create_dir_if_not_exist(path: &Path) -> eyre::Result<()> {
    match fs::create_dir_all(path) {
        Ok(_) => Ok(()),
        Err(e) => Err(eyre!(
            "Could not create directory {} with error: {}",
            path.display(),
            e
        )),
    }
}

pub fn prompt_yes_no(question: &str) -> eyre::Result<bool> {
    print!("{} ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    pb
}
