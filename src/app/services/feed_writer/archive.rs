//! Compression of a written feed into a single archive

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Pack every `.txt` file directly inside `dir` into a deflated archive at `target`
///
/// Entries are stored under their bare file names in name order. Returns the
/// number of entries written.
pub fn compress_feed(dir: &Path, target: &Path) -> Result<usize> {
    let members = feed_files(dir)?;

    let file = File::create(target)
        .map_err(|e| Error::io(format!("Failed to create archive {}", target.display()), e))?;
    let mut zip = zip::ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &members {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        debug!("Compressing {}", name);

        zip.start_file(name, options)
            .map_err(|e| Error::archive(format!("Failed to add {} to archive", name), e))?;
        let mut reader = BufReader::new(
            File::open(path)
                .map_err(|e| Error::io(format!("Failed to open {}", path.display()), e))?,
        );
        std::io::copy(&mut reader, &mut zip)
            .map_err(|e| Error::io(format!("Failed to compress {}", name), e))?;
    }

    zip.finish()
        .map_err(|e| Error::archive(format!("Failed to finalize {}", target.display()), e))?;

    info!(
        "Compressed {} files into {}",
        members.len(),
        target.display()
    );
    Ok(members.len())
}

fn feed_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut members = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            Error::io(
                format!("Failed to list {}", dir.display()),
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            )
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            members.push(path.to_path_buf());
        }
    }
    Ok(members)
}
