use std::{
    future::Future,
    io::ErrorKind,
    path::PathBuf,
};

use fs4::tokio::AsyncFileExt;
use thiserror::Error;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::debug;

use super::entities::UsageInterval;

const INTERVAL_FILE_NAME: &str = "intervals.jsonl";

/// Failures of the interval store.
///
/// A record that does not parse aborts the whole scan. Reporting on top of a
/// partially readable store would produce silently wrong totals, so the caller
/// gets the error instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access the interval store")]
    Io(#[from] std::io::Error),
    #[error("malformed interval record on line {line}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Write side of the interval store. One append per closed interval.
pub trait IntervalSink {
    fn append(&mut self, interval: UsageInterval) -> impl Future<Output = Result<(), StoreError>>;
}

/// Read side of the interval store.
pub trait IntervalSource {
    fn scan_all(&self) -> impl Future<Output = Result<Vec<UsageInterval>, StoreError>> + Send;
}

/// Durable append-only store keeping one JSON record per line.
///
/// Appends and scans take `fs4` file locks, so a tracker writing while a
/// report runs never observes a partially written record.
pub struct IntervalStore {
    path: PathBuf,
}

impl IntervalStore {
    pub fn new(data_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            path: data_dir.join(INTERVAL_FILE_NAME),
        })
    }

    async fn append_with_file(file: &mut File, interval: &UsageInterval) -> Result<(), StoreError> {
        let mut buffer = serde_json::to_vec(interval).map_err(std::io::Error::from)?;
        buffer.push(b'\n');
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }

    async fn scan_file(file: File) -> Result<Vec<UsageInterval>, StoreError> {
        file.lock_shared()?;
        let mut lines = BufReader::new(file).lines();
        let mut intervals = vec![];
        let mut line_number = 0usize;
        let mut malformed = None;
        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            match serde_json::from_str::<UsageInterval>(&line) {
                Ok(v) => intervals.push(v),
                Err(source) => {
                    malformed = Some(StoreError::MalformedRecord {
                        line: line_number,
                        source,
                    });
                    break;
                }
            }
        }

        lines.into_inner().into_inner().unlock_async().await?;

        match malformed {
            Some(e) => Err(e),
            None => Ok(intervals),
        }
    }
}

impl IntervalSink for IntervalStore {
    async fn append(&mut self, interval: UsageInterval) -> Result<(), StoreError> {
        debug!("Appending interval {:?}", interval);
        let mut file = File::options()
            .append(true)
            .create(true)
            .open(&self.path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::append_with_file(&mut file, &interval).await;
        file.unlock_async().await?;
        result
    }
}

impl IntervalSource for IntervalStore {
    async fn scan_all(&self) -> Result<Vec<UsageInterval>, StoreError> {
        debug!("Scanning {:?}", self.path);
        let file = match File::open(&self.path).await {
            Ok(v) => v,
            // A store that was never written to is an empty store.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        Self::scan_file(file).await
    }
}
