//! The report channel: a live, ordered stream of `key=value` lines
//! consumed by the supervising process. Every line is flushed as it
//! is written; a bare `commit` line finalizes the buffered status.

use crate::prelude::*;
use async_std::fs::File;
use futures::AsyncWriteExt;
use std::collections::BTreeMap;

/// Where report lines go. The single method must make the line
/// durable (flushed) before returning, so a supervisor reading the
/// other end of a pipe sees each event without delay.
#[async_trait::async_trait]
pub trait ReportSink: Send {
    async fn write_line(&mut self, line: &str) -> Result<()>;
}

/// Sink backed by a file or FIFO path.
pub struct FileSink {
    file: File,
}

#[async_trait::async_trait]
impl ReportSink for FileSink {
    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.file
            .write_all(line.as_bytes())
            .await
            .map_err(Error::IOError)?;
        self.file.write_all(b"\n").await.map_err(Error::IOError)?;
        self.file.flush().await.map_err(Error::IOError)
    }
}

/// Exclusive handle on the report stream for one judge run.
pub struct ReportChannel<S> {
    sink: S,
}

impl ReportChannel<FileSink> {
    /// Acquire the report sink for the duration of the run.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref()).await.map_err(Error::IOError)?;
        Ok(Self::new(FileSink { file }))
    }
}

impl<S: ReportSink> ReportChannel<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    pub async fn raw(&mut self, key: &str, val: &str) -> Result<()> {
        trace!("report: {}={}", key, val);
        self.sink.write_line(&format!("{}={}", key, val)).await
    }

    /// Current score of the solution, 0 to 100.
    pub async fn score(&mut self, score: f64) -> Result<()> {
        self.raw("score", &score.to_string()).await
    }

    /// Current status, a short phrase like "Accepted".
    pub async fn status(&mut self, status: &str) -> Result<()> {
        self.raw("status", status).await
    }

    /// Progress text, e.g. "Running on case 1".
    pub async fn message(&mut self, message: &str) -> Result<()> {
        self.raw("message", message).await
    }

    /// Named measurements, serialized as a one-line JSON object.
    /// By convention `cpu` is elapsed milliseconds.
    pub async fn metrics(&mut self, metrics: &BTreeMap<String, f64>) -> Result<()> {
        let val = serde_json::to_string(metrics).map_err(Error::JSONError)?;
        self.raw("metrics", &val).await
    }

    /// Ask the supervisor to persist everything emitted since the
    /// previous commit. Must be the last event of a well-formed run.
    pub async fn commit(&mut self) -> Result<()> {
        trace!("report: commit");
        self.sink.write_line("commit").await
    }
}
