//! Pub/sub transport over `zmq`, standing in for the producer's `pynng`
//! Sub0/Pub0 sockets (documented substitution, see DESIGN.md). The
//! receiver and ACK emitter are generic over [`FrameSource`]/[`FrameSink`]
//! rather than coupled directly to `zmq::Socket`, so both can be driven by
//! an in-memory fake in tests without opening real sockets.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport error: {0}")]
    Zmq(#[from] zmq::Error),
}

/// The receive side of the data subscription (data port 5555).
pub trait FrameSource: Send {
    /// Block for up to `timeout` waiting for one message. `Ok(None)` means
    /// the timeout elapsed with nothing received — the caller rechecks
    /// its shutdown flag and calls again.
    fn recv_timeout(&self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError>;
}

/// The publish side of the ACK channel (ACK port 5556).
pub trait FrameSink: Send {
    fn send(&self, payload: &[u8]) -> Result<(), TransportError>;
}

pub struct ZmqSubscriber {
    socket: zmq::Socket,
}

impl ZmqSubscriber {
    /// Bind a SUB socket at `host:port` and subscribe to every topic (the
    /// producer doesn't multiplex by topic).
    pub fn bind(ctx: &zmq::Context, host: &str, port: u16) -> Result<Self, TransportError> {
        let socket = ctx.socket(zmq::SUB)?;
        socket.bind(&format!("tcp://{host}:{port}"))?;
        socket.set_subscribe(b"")?;
        Ok(Self { socket })
    }
}

impl FrameSource for ZmqSubscriber {
    fn recv_timeout(&self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        self.socket.set_rcvtimeo(i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX))?;
        match self.socket.recv_bytes(0) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

pub struct ZmqAckPublisher {
    socket: zmq::Socket,
}

impl ZmqAckPublisher {
    /// Dial the producer's ACK port. Non-blocking: `connect` returns
    /// immediately regardless of whether the peer is currently listening,
    /// matching spec.md §4.3's "non-blocking dial".
    pub fn connect(ctx: &zmq::Context, client_ip: &str, port: u16) -> Result<Self, TransportError> {
        let socket = ctx.socket(zmq::PUB)?;
        socket.connect(&format!("tcp://{client_ip}:{port}"))?;
        Ok(Self { socket })
    }
}

impl FrameSink for ZmqAckPublisher {
    fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        self.socket.send(payload, zmq::DONTWAIT).map_err(Into::into)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::{FrameSink, FrameSource, TransportError};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays a fixed list of frames, then reports timeouts forever.
    pub struct ScriptedSource {
        frames: Mutex<std::collections::VecDeque<Vec<u8>>>,
    }

    impl ScriptedSource {
        pub fn new(frames: Vec<Vec<u8>>) -> Self {
            Self { frames: Mutex::new(frames.into()) }
        }
    }

    impl FrameSource for ScriptedSource {
        fn recv_timeout(&self, _timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
            Ok(self.frames.lock().unwrap().pop_front())
        }
    }

    /// Records every payload sent to it, for assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Mutex<Vec<Vec<u8>>>,
    }

    impl FrameSink for RecordingSink {
        fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(payload.to_vec());
            Ok(())
        }
    }
}
