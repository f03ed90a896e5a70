//! Read-only snapshot of a dump directory.
//!
//! The directory is listed once; every stage works from this listing and
//! reads file contents on demand. Nothing under the directory is modified.

use crate::errors::{Result, SummaryError};
use crate::observability::set_current_file;
use rayon::prelude::*;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DumpFile {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl DumpFile {
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|ext| ext.to_str())
    }

    pub fn read_to_string(&self) -> Result<String> {
        let bytes = fs::read(&self.path).map_err(|e| SummaryError::io(&self.path, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Stream lines, replacing invalid UTF-8. Line endings are stripped.
    pub fn for_each_line<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, &str) -> std::ops::ControlFlow<()>,
    {
        let file = fs::File::open(&self.path).map_err(|e| SummaryError::io(&self.path, e))?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| SummaryError::io(&self.path, e))?;
            if read == 0 {
                break;
            }
            line_no += 1;
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            if visit(line_no, line).is_break() {
                break;
            }
        }
        Ok(())
    }
}

/// Top-level files of a dump directory, sorted by name.
#[derive(Clone, Debug, Default)]
pub struct DumpDirectory {
    root: PathBuf,
    files: Vec<DumpFile>,
}

impl DumpDirectory {
    /// List the directory. This is the only fatal failure of a run.
    pub fn scan(root: &Path) -> Result<Self> {
        let metadata = fs::metadata(root).map_err(|source| SummaryError::DirectoryUnreadable {
            path: root.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(SummaryError::DirectoryUnreadable {
                path: root.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let mut files = Vec::new();
        let mut skipped_count = 0;
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // An unreadable root surfaces here as a depth-0 error.
                    if err.depth() == 0 {
                        let source = err
                            .into_io_error()
                            .unwrap_or_else(|| std::io::Error::other("walk failed"));
                        return Err(SummaryError::DirectoryUnreadable {
                            path: root.to_path_buf(),
                            source,
                        });
                    }
                    if skipped_count < 10 {
                        tracing::warn!("Skipping directory entry: {}", err);
                    }
                    skipped_count += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            files.push(DumpFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
                size_bytes,
            });
        }

        if skipped_count > 10 {
            tracing::warn!("Skipped {} additional directory entries", skipped_count - 10);
        }

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[DumpFile] {
        &self.files
    }

    pub fn get(&self, name: &str) -> Option<&DumpFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Files whose name matches any of the shell-style patterns, in name
    /// order and without duplicates.
    pub fn matching(&self, patterns: &[&str]) -> Vec<&DumpFile> {
        let compiled: Vec<glob::Pattern> = patterns
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect();
        self.files
            .iter()
            .filter(|f| compiled.iter().any(|p| p.matches(&f.name)))
            .collect()
    }

    /// Files whose name starts with `prefix`.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a DumpFile> + 'a {
        self.files.iter().filter(move |f| f.name.starts_with(prefix))
    }
}

/// Run `op` over every file, in parallel when asked. Results keep the input
/// order either way, so later numbering does not depend on scheduling.
pub fn map_files<'a, T, F>(
    files: &[&'a DumpFile],
    parallel: bool,
    op: F,
) -> Vec<(&'a DumpFile, Result<T>)>
where
    T: Send,
    F: Fn(&DumpFile) -> Result<T> + Sync + Send,
{
    let run = |file: &&'a DumpFile| {
        let _file = set_current_file(&file.name);
        (*file, op(*file))
    };
    if parallel {
        files.par_iter().map(run).collect()
    } else {
        files.iter().map(run).collect()
    }
}
