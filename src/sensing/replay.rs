//! Recorded landmark traces, one JSON sample per line.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines},
    sync::mpsc,
};

use crate::models::Sample;

pub struct SampleReader<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl SampleReader<BufReader<File>> {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .await
            .with_context(|| format!("failed to open sample trace {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: AsyncBufRead + Unpin> SampleReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    /// Next sample, skipping blank lines. `None` at end of input.
    pub async fn next_sample(&mut self) -> Result<Option<Sample>> {
        while let Some(line) = self
            .lines
            .next_line()
            .await
            .context("failed to read sample trace")?
        {
            self.line_number += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let sample = serde_json::from_str::<Sample>(trimmed)
                .with_context(|| format!("invalid sample on line {}", self.line_number))?;
            return Ok(Some(sample));
        }
        Ok(None)
    }

    /// Pushes every sample into `tx`, waiting for room. Stops early, without
    /// error, if the receiver goes away. Returns the number of samples sent.
    pub async fn feed(mut self, tx: mpsc::Sender<Sample>) -> Result<usize> {
        let mut sent = 0;
        while let Some(sample) = self.next_sample().await? {
            if tx.send(sample).await.is_err() {
                break;
            }
            sent += 1;
        }
        Ok(sent)
    }
}

pub async fn read_samples(path: &Path) -> Result<Vec<Sample>> {
    let mut reader = SampleReader::open(path).await?;
    let mut samples = Vec::new();
    while let Some(sample) = reader.next_sample().await? {
        samples.push(sample);
    }
    Ok(samples)
}
