//! End-to-end tests against [`Sink::start_with_transport`] using
//! in-memory `FrameSource`/`FrameSink` fakes in place of real sockets —
//! the same seam `roisink-core`'s own unit tests drive, exercised here
//! from outside the crate to confirm the public API is enough to wire a
//! whole pipeline together.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use roisink_core::{Config, FrameSink, FrameSource, Sink, SinkOptions, TransportError};
use roisink_proto::{encode_frame, CropRecord, Frame};
use roisink_decode::LicenseKey;
use serde_json::json;

struct OneShotSource {
    frames: Mutex<VecDeque<Vec<u8>>>,
}

impl OneShotSource {
    fn new(frames: Vec<Vec<u8>>) -> Self {
        Self { frames: Mutex::new(frames.into()) }
    }
}

impl FrameSource for OneShotSource {
    fn recv_timeout(&self, _timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        thread::sleep(Duration::from_millis(5));
        Ok(self.frames.lock().unwrap().pop_front())
    }
}

#[derive(Default)]
struct RecordingAckSink {
    sent: Mutex<Vec<Vec<u8>>>,
}

impl FrameSink for RecordingAckSink {
    fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(payload.to_vec());
        Ok(())
    }
}

fn jpeg_crop() -> CropRecord {
    CropRecord {
        metadata: json!({
            "roi": {"x": 10, "y": 20, "width": 30, "height": 40, "label": "pkg", "confidence": 0.9},
            "camera": {"id": 1},
            "pose": {"position": [1.0, 2.0, 3.0]},
            "yaw_deg": 12.5,
        }),
        image: vec![0xFF, 0xD8, 0xFF, 0xD9],
    }
}

fn temp_journal_dir() -> PathBuf {
    std::env::temp_dir().join(format!("roisink-it-{}", std::process::id()))
}

#[test]
fn without_dbr_the_ring_fills_but_nothing_is_decoded() {
    let frame = Frame { frame_sequence: 1, timestamp_ms: 1_000, crops: vec![jpeg_crop()] };
    let source = OneShotSource::new(vec![encode_frame(&frame)]);

    let options = SinkOptions {
        host: "0.0.0.0".into(),
        client_ip: "127.0.0.1".into(),
        dbr: false,
        config: Config::default(),
        journal_dir: temp_journal_dir(),
        license_key: None,
    };

    let sink = Sink::start_with_transport(options, source, RecordingAckSink::default()).unwrap();

    wait_until(|| sink.latest_index().is_some(), Duration::from_secs(2));

    let slot = sink.read_slot(sink.latest_index().unwrap()).unwrap();
    assert_eq!(slot.recv_seq, 1);
    assert!(slot.decoded.is_none());

    let stats = sink.snapshot_stats();
    assert_eq!(stats.received_crops, 1);
    assert_eq!(stats.decode_attempts, 0);

    sink.shutdown();
}

#[test]
fn invalid_license_disables_the_decoder_pool_but_not_the_receiver() {
    let frame = Frame { frame_sequence: 1, timestamp_ms: 1_000, crops: vec![jpeg_crop()] };
    let source = OneShotSource::new(vec![encode_frame(&frame)]);

    let options = SinkOptions {
        host: "0.0.0.0".into(),
        client_ip: "127.0.0.1".into(),
        dbr: true,
        config: Config::default(),
        journal_dir: temp_journal_dir(),
        license_key: Some(LicenseKey::new("not-a-valid-key")),
    };

    let sink = Sink::start_with_transport(options, source, RecordingAckSink::default()).unwrap();

    wait_until(|| sink.latest_index().is_some(), Duration::from_secs(2));

    let stats = sink.snapshot_stats();
    assert_eq!(stats.decode_attempts, 0);
    assert!(sink.submit_manual_decode(sink.latest_index().unwrap()).is_err());

    sink.shutdown();
}

fn wait_until(mut predicate: impl FnMut() -> bool, timeout: Duration) {
    let deadline = std::time::Instant::now() + timeout;
    while !predicate() {
        if std::time::Instant::now() > deadline {
            panic!("condition not met within timeout");
        }
        thread::sleep(Duration::from_millis(10));
    }
}
