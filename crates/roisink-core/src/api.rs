//! Core API (C10): the `Sink` handle exposed to the viewer and the CLI.
//! `Sink` is `Arc`-backed and cheaply cloneable, following the teacher's
//! handle-clone pattern for long-lived pipeline objects.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;

use roisink_decode::{install_license, LicenseKey, Symbology};
use roisink_journal::JournalWriter;
use roisink_ring::{DecodeJob, JobQueue, Slot, SlotRing, DEFAULT_SLOT_NUM};

use crate::ack::AckEmitter;
use crate::config::Config;
use crate::error::SinkError;
use crate::health::spawn_stats_thread;
use crate::receiver::spawn_receiver;
use crate::stats::{SinkStats, Stats};
use crate::transport::{FrameSink, FrameSource, ZmqAckPublisher, ZmqSubscriber};
use crate::workers::{spawn_workers, WorkerPoolConfig};

pub const DATA_PORT: u16 = 5555;
pub const ACK_PORT: u16 = 5556;
pub const STATS_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ManualDecodeError {
    #[error("slot {0} is not populated")]
    SlotEmpty(usize),
}

/// Everything needed to start a `Sink`: CLI flags plus the loaded config
/// file, already merged per spec.md §6's precedence (`--host`/`--client`
/// override config, config overrides built-in defaults).
pub struct SinkOptions {
    pub host: String,
    pub client_ip: String,
    pub dbr: bool,
    pub config: Config,
    pub journal_dir: PathBuf,
    pub license_key: Option<LicenseKey>,
}

struct Inner {
    ring: Arc<SlotRing>,
    queue: Option<Arc<JobQueue>>,
    journal: Option<Arc<JournalWriter>>,
    stats: Arc<SinkStats>,
    recv_seq_counter: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

/// The handle consumed by the viewer and the CLI. Clone freely — every
/// clone shares the same underlying pipeline and the same `shutdown()`.
#[derive(Clone)]
pub struct Sink {
    inner: Arc<Inner>,
}

impl Sink {
    /// Start the whole receive-decode-log pipeline: binds the data
    /// subscriber, dials the ACK publisher, and — when `options.dbr` is
    /// set and the license validates — starts the decoder pool and
    /// journal. A failed license disables C6/C7/C8 but leaves the ring
    /// and receiver running (spec.md §7 failure semantics).
    pub fn start(options: SinkOptions) -> Result<Self, SinkError> {
        let ctx = zmq::Context::new();
        let subscriber = ZmqSubscriber::bind(&ctx, &options.host, DATA_PORT).map_err(SinkError::Transport)?;
        let publisher = ZmqAckPublisher::connect(&ctx, &options.client_ip, ACK_PORT).map_err(SinkError::Transport)?;

        Self::start_with_transport(options, subscriber, publisher)
    }

    /// As [`Sink::start`], but with the transport already constructed —
    /// the seam tests use to drive the pipeline with an in-memory fake.
    pub fn start_with_transport<Source, AckSink>(
        options: SinkOptions,
        source: Source,
        ack_sink: AckSink,
    ) -> Result<Self, SinkError>
    where
        Source: FrameSource + 'static,
        AckSink: FrameSink + 'static,
    {
        let ring = Arc::new(SlotRing::new(DEFAULT_SLOT_NUM));
        let stats = Arc::new(SinkStats::new());
        let recv_seq_counter = Arc::new(AtomicU64::new(0));
        let shutdown = Arc::new(AtomicBool::new(false));
        let ack = Arc::new(AckEmitter::new(ack_sink));

        let (queue, journal, worker_handles) = if options.dbr {
            match Self::try_start_decoder_pool(&options, Arc::clone(&ring), Arc::clone(&stats), Arc::clone(&shutdown)) {
                Ok((queue, journal, handles)) => (Some(queue), Some(journal), handles),
                Err(err) => {
                    tracing::error!(%err, "decoder pool disabled at startup");
                    (None, None, Vec::new())
                }
            }
        } else {
            (None, None, Vec::new())
        };

        let mut handles = worker_handles;
        handles.push(spawn_receiver(
            source,
            ack,
            Arc::clone(&ring),
            queue.clone(),
            Arc::clone(&stats),
            Arc::clone(&recv_seq_counter),
            Arc::clone(&shutdown),
        ));
        handles.push(spawn_stats_thread(Arc::clone(&stats), STATS_INTERVAL, Arc::clone(&shutdown)));

        Ok(Self {
            inner: Arc::new(Inner {
                ring,
                queue,
                journal,
                stats,
                recv_seq_counter,
                shutdown,
                handles: Mutex::new(handles),
            }),
        })
    }

    fn try_start_decoder_pool(
        options: &SinkOptions,
        ring: Arc<SlotRing>,
        stats: Arc<SinkStats>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<(Arc<JobQueue>, Arc<JournalWriter>, Vec<JoinHandle<()>>), SinkError> {
        let key = options.license_key.clone().unwrap_or_else(|| LicenseKey::new(String::new()));
        install_license(&key).map_err(SinkError::License)?;

        let journal = Arc::new(JournalWriter::create(&options.journal_dir).map_err(SinkError::Journal)?);
        let queue = Arc::new(JobQueue::new(roisink_ring::DEFAULT_CAPACITY));
        let pool_config = WorkerPoolConfig {
            thread_count: options.config.max_parallel_tasks,
            decode_timeout_ms: options.config.timeout_ms,
            symbologies: Symbology::ALL.to_vec(),
        };
        let handles = spawn_workers(&pool_config, Arc::clone(&queue), ring, Arc::clone(&journal), stats, shutdown);
        Ok((queue, journal, handles))
    }

    #[must_use]
    pub fn snapshot_stats(&self) -> Stats {
        self.inner.stats.snapshot()
    }

    #[must_use]
    pub fn read_slot(&self, index: usize) -> Option<Slot> {
        self.inner.ring.read(index)
    }

    #[must_use]
    pub fn latest_index(&self) -> Option<usize> {
        self.inner.ring.latest_index()
    }

    /// Assign a fresh `recv_seq` (sharing the receiver's counter) and
    /// enqueue the given slot's current JPEG bytes for decoding. Fails if
    /// the slot has never been written, or if the decoder pool was never
    /// started (no `--dbr`, or license init failed).
    pub fn submit_manual_decode(&self, slot_index: usize) -> Result<u64, ManualDecodeError> {
        let slot = self.inner.ring.read(slot_index).ok_or(ManualDecodeError::SlotEmpty(slot_index))?;
        let Some(queue) = &self.inner.queue else {
            return Err(ManualDecodeError::SlotEmpty(slot_index));
        };

        let recv_seq = self.inner.recv_seq_counter.fetch_add(1, Ordering::Relaxed) + 1;
        queue.enqueue(DecodeJob { recv_seq, image_bytes: slot.image_bytes, slot_index });
        Ok(recv_seq)
    }

    /// Idempotent: stops the receiver and workers, flushes the journal
    /// (via drop), and closes transports. Safe to call from any clone,
    /// any number of times — only the first caller actually joins.
    pub fn shutdown(&self) {
        if self.inner.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut handles = self.inner.handles.lock().unwrap();
        for handle in handles.drain(..) {
            let _ = handle.join();
        }
    }
}
