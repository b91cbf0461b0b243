//! Dataset archive download and extraction.

use super::catalog;
use crate::error::BenchError;
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// Something that can turn a dataset URL into a local matrix file.
pub trait DatasetSource {
    /// Fetch `url` and place its matrix file at `dest`.
    fn materialize(&self, url: &str, dest: &Path) -> crate::Result<PathBuf>;
}

/// Downloads `.tar.gz`, `.tgz` and `.tar` archives over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpDownloader {
    show_progress: bool,
}

impl HttpDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a progress bar while downloading.
    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn progress_bar(&self, total: Option<u64>, url: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = total.map_or_else(ProgressBar::no_length, ProgressBar::new);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:20} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(catalog::archive_stem(url).to_string());
        pb
    }

    fn fetch(&self, url: &str, dest: &Path) -> crate::Result<()> {
        let download_err = |reason: String| BenchError::Download {
            url: url.to_string(),
            reason,
        };

        let response = ureq::get(url).call().map_err(|e| download_err(e.to_string()))?;
        let total = response
            .headers()
            .get("Content-Length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let pb = self.progress_bar(total, url);
        let mut reader = response.into_body().into_reader();
        let mut file = File::create(dest)?;
        let mut buffer = vec![0u8; 256 * 1024];

        loop {
            let n = reader
                .read(&mut buffer)
                .map_err(|e| download_err(e.to_string()))?;
            if n == 0 {
                break;
            }
            file.write_all(&buffer[..n])?;
            pb.inc(n as u64);
        }
        pb.finish_and_clear();
        Ok(())
    }
}

impl DatasetSource for HttpDownloader {
    fn materialize(&self, url: &str, dest: &Path) -> crate::Result<PathBuf> {
        let scratch = tempfile::tempdir()?;
        let archive = scratch.path().join("archive");

        tracing::info!("Downloading {url}");
        self.fetch(url, &archive)?;
        extract_matrix(&archive, url, dest)?;
        tracing::info!("Dataset received: {}", dest.display());
        Ok(dest.to_path_buf())
    }
}

/// Unpack `archive` and copy the matrix file it holds to `dest`.
///
/// The archive must hold exactly one `.mtx` file, or several of which one is
/// named after the archive itself.
pub fn extract_matrix(archive: &Path, url: &str, dest: &Path) -> crate::Result<()> {
    let format_err = |reason: String| BenchError::ArchiveFormat {
        url: url.to_string(),
        reason,
    };

    let unpacked = tempfile::tempdir()?;
    let mut magic = [0u8; 2];
    let gzipped = File::open(archive)?.read_exact(&mut magic).is_ok() && magic == [0x1f, 0x8b];

    let file = BufReader::new(File::open(archive)?);
    let result = if gzipped {
        tar::Archive::new(GzDecoder::new(file)).unpack(unpacked.path())
    } else {
        tar::Archive::new(file).unpack(unpacked.path())
    };
    result.map_err(|e| format_err(format!("not a tar archive: {e}")))?;

    let mut found = Vec::new();
    collect_matrices(unpacked.path(), &mut found)?;
    found.sort();

    let stem = catalog::archive_stem(url);
    let chosen = match found.as_slice() {
        [] => return Err(format_err("archive does not contain a .mtx file".to_string())),
        [only] => only.clone(),
        many => many
            .iter()
            .find(|p| p.file_stem().is_some_and(|s| s == stem))
            .cloned()
            .ok_or_else(|| {
                let listing: String = many
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| format!("\n\t- {}", n.to_string_lossy()))
                    .collect();
                format_err(format!("ambiguous .mtx files, none named {stem}.mtx:{listing}"))
            })?,
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&chosen, dest)?;
    Ok(())
}

fn collect_matrices(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_matrices(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "mtx") {
            out.push(path);
        }
    }
    Ok(())
}
