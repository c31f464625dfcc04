//! Writing rendered exports to stdout, files and ZIP bundles

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use blockport_core::error::{BlockportError, Result};

/// A named document destined for a directory or a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub content: String,
}

impl OutputFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Where a multi-file export ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Written {
    Files(Vec<PathBuf>),
    Bundle { path: PathBuf, entries: usize },
}

impl Written {
    pub fn paths(&self) -> Vec<PathBuf> {
        match self {
            Written::Files(paths) => paths.clone(),
            Written::Bundle { path, .. } => vec![path.clone()],
        }
    }
}

/// Write a single document to `path`, or to stdout when no path is given
pub fn write_document(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| {
                    BlockportError::io_operation("create directory", parent.display(), e)
                })?;
            }
            fs::write(path, content)
                .map_err(|e| BlockportError::io_operation("write", path.display(), e))?;
            debug!(path = %path.display(), bytes = content.len(), "wrote document");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

/// Write `files` into `dir`, or into one ZIP bundle named `bundle_name`
/// when there are more than `threshold` of them
pub fn write_files(
    dir: &Path,
    files: &[OutputFile],
    threshold: usize,
    bundle_name: &str,
) -> Result<Written> {
    fs::create_dir_all(dir)
        .map_err(|e| BlockportError::io_operation("create directory", dir.display(), e))?;

    if files.len() > threshold {
        let path = dir.join(bundle_name);
        write_bundle(&path, files)?;
        info!(path = %path.display(), entries = files.len(), "wrote bundle");
        return Ok(Written::Bundle {
            path,
            entries: files.len(),
        });
    }

    let mut paths = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.name);
        fs::write(&path, &file.content)
            .map_err(|e| BlockportError::io_operation("write", path.display(), e))?;
        paths.push(path);
    }
    info!(dir = %dir.display(), files = paths.len(), "wrote files");
    Ok(Written::Files(paths))
}

fn write_bundle(path: &Path, files: &[OutputFile]) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| BlockportError::io_operation("create bundle", path.display(), e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in files {
        zip.start_file(entry.name.as_str(), deflated)
            .map_err(|e| BlockportError::failed_operation("add bundle entry", e))?;
        zip.write_all(entry.content.as_bytes())?;
    }
    zip.finish()
        .map_err(|e| BlockportError::failed_operation("finish bundle", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn files(n: usize) -> Vec<OutputFile> {
        (1..=n)
            .map(|i| OutputFile::new(format!("{:02}_part.md", i), format!("# Part {}\n", i)))
            .collect()
    }

    #[test]
    fn test_files_at_threshold_written_loose() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_files(dir.path(), &files(2), 2, "bundle.zip").unwrap();

        let paths = written.paths();
        assert_eq!(paths.len(), 2);
        assert_eq!(fs::read_to_string(&paths[1]).unwrap(), "# Part 2\n");
        assert!(!dir.path().join("bundle.zip").exists());
    }

    #[test]
    fn test_files_above_threshold_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_files(dir.path(), &files(3), 2, "bundle.zip").unwrap();

        let path = dir.path().join("bundle.zip");
        assert_eq!(
            written,
            Written::Bundle {
                path: path.clone(),
                entries: 3
            }
        );

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);
        let mut content = String::new();
        archive
            .by_name("03_part.md")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "# Part 3\n");
    }

    #[test]
    fn test_write_document_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.md");
        write_document(Some(&path), "- a").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "- a");
    }
}
