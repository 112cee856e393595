//! Data loader module for discovering and parsing streaming history exports
//!
//! Spotify delivers listening history as a set of JSON files, each holding an
//! array of playback records. The extended export names them
//! `Streaming_History_Audio_2023_1.json` and friends inside a
//! `Spotify Extended Streaming History/` folder; the account-data export
//! uses `StreamingHistory0.json` (pass `--prefix StreamingHistory` for
//! those). This module finds the files below a data directory and normalizes
//! every record into a [`StreamEvent`].
//!
//! Loading is all-or-nothing: the first malformed file or record aborts the
//! load with a [`SpotistatError::Parse`] or [`SpotistatError::Schema`].
//!
//! # Examples
//!
//! ```no_run
//! use spotistat::data_loader::{DataLoader, DEFAULT_FILE_PREFIX};
//! use std::path::Path;
//!
//! # async fn example() -> spotistat::Result<()> {
//! let loader = DataLoader::discover(Path::new("my_spotify_data"), DEFAULT_FILE_PREFIX)?;
//! let events = loader.load_events().await?;
//! println!("Loaded {} streams from {} files", events.len(), loader.files().len());
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SpotistatError};
use crate::types::{RawStreamRecord, StreamEvent};
use futures::stream::{Stream, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// File-name prefix of the extended streaming history export
pub const DEFAULT_FILE_PREFIX: &str = "Streaming_History";

/// Loader for a fixed, ordered list of history files
pub struct DataLoader {
    /// Files to load, in load order
    files: Vec<PathBuf>,
    /// Whether to show a progress bar
    show_progress: bool,
}

impl DataLoader {
    /// Create a loader for an explicit list of files
    ///
    /// Events are loaded in the order the files are given.
    pub fn from_files(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            show_progress: false,
        }
    }

    /// Find history files below `data_dir`
    ///
    /// Walks the directory recursively and keeps regular files whose name
    /// starts with `prefix` and ends with `.json` (case-insensitive
    /// extension). Files are returned sorted by path so load order is stable
    /// across platforms.
    ///
    /// # Errors
    ///
    /// Returns [`SpotistatError::NoHistoryFiles`] when nothing matches, or an
    /// IO error if the directory cannot be read.
    pub fn discover(data_dir: &Path, prefix: &str) -> Result<Self> {
        if !data_dir.is_dir() {
            return Err(SpotistatError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("data directory not found: {}", data_dir.display()),
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(data_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                SpotistatError::Io(
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                )
            })?;
            if entry.file_type().is_file() && Self::is_history_file(entry.path(), prefix) {
                files.push(entry.into_path());
            }
        }

        if files.is_empty() {
            return Err(SpotistatError::NoHistoryFiles(data_dir.to_path_buf()));
        }

        files.sort();
        debug!(
            "Discovered {} history files in {}",
            files.len(),
            data_dir.display()
        );
        Ok(Self::from_files(files))
    }

    /// Check whether a path looks like a streaming history export
    pub fn is_history_file(path: &Path, prefix: &str) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        is_json && name.starts_with(prefix)
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Files this loader reads, in load order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Stream normalized events from every file in order
    ///
    /// The stream ends after the first error.
    pub fn load_events_stream(&self) -> impl Stream<Item = Result<StreamEvent>> + '_ {
        async_stream::stream! {
            let progress = self.progress_bar();

            for path in &self.files {
                if let Some(ref pb) = progress {
                    pb.set_message(
                        path.file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                    );
                }

                match Self::load_file(path).await {
                    Ok(events) => {
                        for event in events {
                            yield Ok(event);
                        }
                    }
                    Err(e) => {
                        if let Some(ref pb) = progress {
                            pb.abandon_with_message("Failed");
                        }
                        yield Err(e);
                        return;
                    }
                }

                if let Some(ref pb) = progress {
                    pb.inc(1);
                }
            }

            if let Some(pb) = progress {
                pb.finish_with_message(format!("Loaded {} files", self.files.len()));
            }
        }
    }

    /// Load every file into one ordered collection
    ///
    /// # Errors
    ///
    /// Fails on the first IO, parse or schema error; no partial result is
    /// returned.
    pub async fn load_events(&self) -> Result<Vec<StreamEvent>> {
        let events: Vec<StreamEvent> = self.load_events_stream().try_collect().await?;
        info!(
            "Loaded {} stream events from {} files",
            events.len(),
            self.files.len()
        );
        Ok(events)
    }

    /// Count the events a load would produce without keeping them
    pub async fn count_events(&self) -> Result<usize> {
        let stream = self.load_events_stream();
        tokio::pin!(stream);

        let mut count = 0;
        while let Some(result) = stream.next().await {
            result?;
            count += 1;
        }
        Ok(count)
    }

    async fn load_file(path: &Path) -> Result<Vec<StreamEvent>> {
        let contents = tokio::fs::read_to_string(path).await?;
        let events = Self::parse_history(&contents, path)?;
        debug!("Parsed {} records from {}", events.len(), path.display());
        Ok(events)
    }

    /// Parse the contents of one export file
    ///
    /// `path` is only used for error context.
    ///
    /// # Errors
    ///
    /// - [`SpotistatError::Parse`] if the text is not JSON, not an array, or
    ///   holds a non-object element, or a timestamp cannot be parsed
    /// - [`SpotistatError::Schema`] if a record lacks the timestamp or
    ///   duration field or a known field has the wrong type
    pub fn parse_history(contents: &str, path: &Path) -> Result<Vec<StreamEvent>> {
        let value: Value = serde_json::from_str(contents).map_err(|e| SpotistatError::Parse {
            file: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let Value::Array(records) = value else {
            return Err(SpotistatError::Parse {
                file: path.to_path_buf(),
                error: "expected a JSON array of stream records".to_string(),
            });
        };

        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                if !record.is_object() {
                    return Err(SpotistatError::Parse {
                        file: path.to_path_buf(),
                        error: format!("record {index} is not a JSON object"),
                    });
                }

                let raw: RawStreamRecord =
                    serde_json::from_value(record).map_err(|e| SpotistatError::Schema {
                        file: path.to_path_buf(),
                        record: index,
                        error: e.to_string(),
                    })?;
                StreamEvent::from_raw(raw, path, index)
            })
            .collect()
    }

    fn progress_bar(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(self.files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    }
}
