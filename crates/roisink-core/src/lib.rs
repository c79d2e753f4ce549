//! The receive-decode-log pipeline: transport, the receiver loop, loss
//! detection, ACK emission, decoder-pool scheduling, statistics, and the
//! `Sink` handle the viewer and CLI consume.

mod ack;
mod api;
mod config;
mod error;
mod health;
mod loss;
mod receiver;
mod stats;
mod transport;
mod workers;

pub use ack::AckEmitter;
pub use api::{ManualDecodeError, Sink, SinkOptions, ACK_PORT, DATA_PORT, STATS_INTERVAL};
pub use config::{Config, ConfigError};
pub use error::SinkError;
pub use loss::{LossDetector, LossReport};
pub use stats::{SinkStats, Stats};
pub use transport::{FrameSink, FrameSource, TransportError, ZmqAckPublisher, ZmqSubscriber};
