use std::rc::Rc;

use crate::args::{Cli, Commands};
use crate::command_handler::{CommandHandler, RunOptions, TeardownChoice};
use crate::config::Config;
use crate::storage::s3::S3Storage;
use crate::storage::Storage;

mod args;
mod command_handler;
mod config;
mod staging;
mod storage;
mod utils;

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let cli = Cli::parse_arguments();

    match cli.command {
        Some(Commands::Run {
            source_dir,
            sample_files,
            staging_dir,
            text_files,
            min_lines,
            max_lines,
            yes,
            keep,
        }) => {
            let bucket_name = utils::generate_bucket_name(&config.bucket_prefix);
            let storage: Rc<dyn Storage> =
                Rc::new(S3Storage::from_config(&config, &bucket_name)?);
            let handler = CommandHandler::new(storage, &bucket_name);

            let teardown = if yes {
                Some(TeardownChoice::Delete)
            } else if keep {
                Some(TeardownChoice::Keep)
            } else {
                None
            };

            let opts = RunOptions {
                source_dir: source_dir.into(),
                sample_files,
                staging_dir: staging_dir.into(),
                text_file_count: text_files,
                min_lines,
                max_lines,
                teardown,
            };

            handler.handle_run(&opts).await?;
        }
        Some(Commands::Teardown { bucket }) => {
            let storage: Rc<dyn Storage> = Rc::new(S3Storage::from_config(&config, &bucket)?);
            let handler = CommandHandler::new(storage, &bucket);

            handler.handle_teardown().await?;
        }
        None => {
            println!("Welcome to 🪣 bucketdrop!");
            println!("Please give a valid command");
        }
    }

    Ok(())
}
