use std::fs;
use std::path::Path;

use eyre::eyre;
use futures_util::future::join_all;
use rand::Rng;

use crate::utils;

/// Copies each named sample file byte-for-byte from the source directory into
/// the staging directory. A missing source file is fatal for the run.
pub fn stage_binary_files(
    source_dir: &Path,
    filenames: &[String],
    dest_dir: &Path,
) -> eyre::Result<()> {
    utils::create_dir_if_not_exist(dest_dir)?;

    for filename in filenames {
        let source = source_dir.join(filename);
        match fs::copy(&source, dest_dir.join(filename)) {
            Ok(_) => {}
            Err(e) => {
                return Err(eyre!(
                    "Could not copy sample file {} with error: {}",
                    source.display(),
                    e
                ))
            }
        }
    }

    Ok(())
}

/// Writes `count` text files into the staging directory. File `i` is named
/// `file{i}.txt` and holds `File {i} Line {n}` for n starting at 1, with the
/// line count drawn uniformly from `[min_lines, max_lines]`. The writes have
/// no ordering dependency on each other and are driven concurrently.
pub async fn generate_text_files(
    dest_dir: &Path,
    count: usize,
    min_lines: usize,
    max_lines: usize,
) -> eyre::Result<()> {
    if min_lines > max_lines {
        return Err(eyre!(
            "Invalid line count range: min {} is larger than max {}",
            min_lines,
            max_lines
        ));
    }

    utils::create_dir_if_not_exist(dest_dir)?;

    let writes = (0..count).map(|index| {
        let path = dest_dir.join(format!("file{}.txt", index));
        let line_count = rand::thread_rng().gen_range(min_lines..=max_lines);

        async move {
            let mut contents = String::new();
            for line in 1..=line_count {
                contents.push_str(&format!("File {} Line {}\n", index, line));
            }

            match tokio::fs::write(&path, contents).await {
                Ok(_) => Ok(()),
                Err(e) => Err(eyre!(
                    "Could not write text file {} with error: {}",
                    path.display(),
                    e
                )),
            }
        }
    });

    for result in join_all(writes).await {
        result?;
    }

    Ok(())
}

/// Removes the staging directory and everything in it. Callers treat a
/// failure here as non-fatal once the rest of the run has completed.
pub fn cleanup(dest_dir: &Path) -> eyre::Result<()> {
    match fs::remove_dir_all(dest_dir) {
        Ok(_) => Ok(()),
        Err(e) => Err(eyre!(
            "Could not remove staging directory {} with error: {}",
            dest_dir.display(),
            e
        )),
    }
}
