use clap::{Parser, Subcommand};

/// A demo tool that creates a scratch S3 bucket, stages sample files locally
/// and fan-out uploads them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a bucket, stage local sample files and upload them concurrently
    Run {
        /// Directory holding the binary sample files to stage
        #[arg(long, default_value = "samples")]
        source_dir: String,

        /// Binary sample file to copy from the source directory (repeatable)
        #[arg(long = "sample-file")]
        sample_files: Vec<String>,

        /// Local staging directory for the files queued for upload
        #[arg(long, default_value = "files")]
        staging_dir: String,

        /// Number of random text files to generate
        #[arg(long, default_value_t = 10)]
        text_files: usize,

        /// Minimum number of lines per generated text file
        #[arg(long, default_value_t = 5)]
        min_lines: usize,

        /// Maximum number of lines per generated text file
        #[arg(long, default_value_t = 100)]
        max_lines: usize,

        /// Delete the bucket after the upload without prompting
        #[arg(long)]
        yes: bool,

        /// Keep the bucket after the upload without prompting
        #[arg(long, conflicts_with = "yes")]
        keep: bool,
    },
    /// Delete every object in an existing bucket, then the bucket itself
    Teardown {
        /// Name of the bucket to empty and delete
        bucket: String,
    },
}

impl Cli {
    pub fn parse_arguments() -> Self {
        Cli::parse()
    }
}
