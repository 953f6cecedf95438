//! Audit sinks for [`TransitionRecord`] values.
//!
//! Delivery is best effort: a sink never fails the transition that produced
//! the record. Sinks that can fail (file, channel) log the problem with
//! `tracing` and drop the record.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::workflow::TransitionRecord;

/// Receives one record per successful status change.
pub trait AuditSink {
    fn record(&self, record: &TransitionRecord);
}

impl<S: AuditSink + ?Sized> AuditSink for &S {
    fn record(&self, record: &TransitionRecord) {
        (**self).record(record);
    }
}

impl<S: AuditSink + ?Sized> AuditSink for Arc<S> {
    fn record(&self, record: &TransitionRecord) {
        (**self).record(record);
    }
}

/// Fan out to two sinks, in order.
impl<A: AuditSink, B: AuditSink> AuditSink for (A, B) {
    fn record(&self, record: &TransitionRecord) {
        self.0.record(record);
        self.1.record(record);
    }
}

/// Emits each record as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &TransitionRecord) {
        info!(
            target: "taskflow::audit",
            record_id = %record.id,
            task_id = record.task_id,
            from = %record.from,
            to = %record.to,
            actor = %record.actor_id,
            reason = record.reason.as_deref().unwrap_or(""),
            at = %record.timestamp,
            "[AUDIT] status changed"
        );
    }
}

/// Appends records to a JSON-lines file.
#[derive(Debug, Clone)]
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &TransitionRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, record: &TransitionRecord) {
        if let Err(e) = self.append(record) {
            warn!(task_id = record.task_id, error = %e, "failed to write audit record");
        }
    }
}

/// Reads back every record written by a [`JsonlAuditSink`].
/// A missing file is an empty history.
pub fn read_history(path: &Path) -> Result<Vec<TransitionRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: malformed audit record", path.display(), i + 1))
        })
        .collect()
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<TransitionRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TransitionRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &TransitionRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

/// Hands records to a background writer without blocking the caller.
///
/// Pair with [`spawn_audit_writer`]; dropping every sender ends the writer.
#[derive(Debug, Clone)]
pub struct ChannelAuditSink {
    tx: mpsc::UnboundedSender<TransitionRecord>,
}

impl ChannelAuditSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransitionRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AuditSink for ChannelAuditSink {
    fn record(&self, record: &TransitionRecord) {
        if self.tx.send(record.clone()).is_err() {
            warn!(
                task_id = record.task_id,
                "audit channel closed, dropping transition record"
            );
        }
    }
}

/// Drain `rx` into `sink` on a tokio task. Resolves to the number of records
/// delivered once all senders are gone.
pub fn spawn_audit_writer<S>(
    mut rx: mpsc::UnboundedReceiver<TransitionRecord>,
    sink: S,
) -> JoinHandle<usize>
where
    S: AuditSink + Send + 'static,
{
    tokio::spawn(async move {
        let mut delivered = 0;
        while let Some(record) = rx.recv().await {
            sink.record(&record);
            delivered += 1;
        }
        debug!(delivered, "audit writer finished");
        delivered
    })
}
