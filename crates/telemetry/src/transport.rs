//! Batching transport for collected report entries.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{TelemetryError, TelemetryResult};
use crate::event::{ReportPayload, ReportedEntry};
use crate::session::TelemetrySession;

/// Configuration for the report transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Maximum entries sent in one payload
    pub batch_size: usize,
    /// Maximum entries held before new ones are rejected
    pub max_queue_size: usize,
    /// Time allowed for a single send
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_queue_size: 10000,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Set the batch size. Zero is treated as one.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the maximum queue size.
    pub fn with_max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = size;
        self
    }

    /// Set the send timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Destination for report payloads.
///
/// The upload endpoint lives outside this crate; implement this trait to
/// connect one.
pub trait ReportSink {
    /// Deliver one payload.
    fn send(&mut self, payload: &ReportPayload) -> impl Future<Output = TelemetryResult<()>> + Send;
}

/// Sink that drops every payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn send(&mut self, _payload: &ReportPayload) -> impl Future<Output = TelemetryResult<()>> + Send {
        std::future::ready(Ok(()))
    }
}

/// Sink that keeps payloads in memory.
///
/// Clones share storage, so a clone kept by the caller sees everything sent
/// through the transport.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    payloads: Arc<Mutex<Vec<ReportPayload>>>,
    failing: Arc<AtomicBool>,
}

impl MemorySink {
    /// Create an empty sink that accepts every payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads received so far.
    pub fn payloads(&self) -> Vec<ReportPayload> {
        self.payloads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Total entries across all received payloads.
    pub fn entry_count(&self) -> usize {
        self.payloads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(ReportPayload::len)
            .sum()
    }

    /// Make subsequent sends fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl ReportSink for MemorySink {
    fn send(&mut self, payload: &ReportPayload) -> impl Future<Output = TelemetryResult<()>> + Send {
        let result = if self.failing.load(Ordering::SeqCst) {
            Err(TelemetryError::Transport("sink unavailable".to_string()))
        } else {
            payload.to_json().map_err(TelemetryError::from).map(|_| {
                self.payloads
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(payload.clone());
            })
        };
        std::future::ready(result)
    }
}

/// Queues report entries and sends them to a sink in batches.
#[derive(Debug)]
pub struct TelemetryTransport<S> {
    config: TransportConfig,
    queue: Vec<ReportedEntry>,
    sink: S,
    offline: bool,
    failed_send_count: u32,
    sent_count: u64,
}

impl<S: ReportSink> TelemetryTransport<S> {
    /// Create a transport with default configuration.
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, TransportConfig::default())
    }

    /// Create a transport with full configuration.
    pub fn with_config(sink: S, config: TransportConfig) -> Self {
        Self {
            config,
            queue: Vec::new(),
            sink,
            offline: false,
            failed_send_count: 0,
            sent_count: 0,
        }
    }

    /// Queue an entry for sending.
    pub fn queue(&mut self, entry: ReportedEntry) -> TelemetryResult<()> {
        if self.queue.len() >= self.config.max_queue_size {
            return Err(TelemetryError::QueueFull);
        }
        self.queue.push(entry);
        Ok(())
    }

    /// Check if a full batch is waiting.
    pub fn should_flush(&self) -> bool {
        self.queue.len() >= self.config.batch_size
    }

    /// Get the number of queued entries.
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Get a reference to the queued entries.
    pub fn queued_entries(&self) -> &[ReportedEntry] {
        &self.queue
    }

    /// Send every queued entry, one batch per payload.
    ///
    /// Returns the number of entries sent. On failure the unsent entries stay
    /// queued for the next flush; batches already delivered by this call are
    /// still counted in [`sent_count`](Self::sent_count).
    pub async fn flush(&mut self, session: &TelemetrySession) -> TelemetryResult<usize> {
        if self.offline {
            return Err(TelemetryError::Offline);
        }

        let mut sent = 0;
        while !self.queue.is_empty() {
            let count = self.queue.len().min(self.config.batch_size.max(1));
            let payload = ReportPayload::new(session, self.queue[..count].to_vec());

            let result = match tokio::time::timeout(self.config.timeout, self.sink.send(&payload)).await {
                Ok(result) => result,
                Err(_) => Err(TelemetryError::Timeout(self.config.timeout)),
            };

            if let Err(e) = result {
                self.failed_send_count += 1;
                tracing::warn!(
                    target: "telemetry::transport",
                    error = %e,
                    sent = sent,
                    pending = self.queue.len(),
                    failures = self.failed_send_count,
                    "report send failed"
                );
                return Err(e);
            }

            self.queue.drain(..count);
            self.failed_send_count = 0;
            self.sent_count += count as u64;
            sent += count;

            tracing::debug!(
                target: "telemetry::transport",
                entries = count,
                pending = self.queue.len(),
                "report batch sent"
            );
        }

        Ok(sent)
    }

    /// Set offline mode.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Check if transport is in offline mode.
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Get the number of consecutive failed sends.
    pub fn failed_send_count(&self) -> u32 {
        self.failed_send_count
    }

    /// Get the total number of entries delivered since creation.
    pub fn sent_count(&self) -> u64 {
        self.sent_count
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// The sink payloads are sent to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Clear all queued entries without sending.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Take ownership of queued entries (for persistence/retry).
    pub fn take_queued(&mut self) -> Vec<ReportedEntry> {
        std::mem::take(&mut self.queue)
    }
}
