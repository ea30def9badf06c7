//! Command wire protocol.
//!
//! Requests and responses travel as length-delimited frames, each frame a
//! bincode-encoded message. The command arguments are already positional
//! byte strings, so the protocol carries them directly; there is no
//! string re-encoding between the client and the dispatch table.

use std::io;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use trellis_repl::ApplyOutcome;

/// One command request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// The operation name.
    pub op: String,
    /// The positional byte-string arguments.
    pub args: Vec<Bytes>,
    /// Serve this read from the local engine snapshot instead of going
    /// through the command log. Only meaningful for `GetRow`/`GetCols`.
    #[serde(default)]
    pub local: bool,
}

impl Request {
    /// Creates a replicated command request.
    pub fn new(op: impl Into<String>, args: Vec<Bytes>) -> Self {
        Self {
            op: op.into(),
            args,
            local: false,
        }
    }

    /// Creates a local-read request.
    pub fn local_read(op: impl Into<String>, args: Vec<Bytes>) -> Self {
        Self {
            op: op.into(),
            args,
            local: true,
        }
    }
}

/// One command response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// The serialized result bytes; empty for writes and failures.
    pub data: Bytes,
    /// The failure reason, when the command failed.
    pub error: Option<String>,
}

impl Response {
    /// Creates a failure response.
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            data: Bytes::new(),
            error: Some(error.into()),
        }
    }

    /// Whether the command succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl From<ApplyOutcome> for Response {
    fn from(outcome: ApplyOutcome) -> Self {
        Self {
            data: outcome.data,
            error: outcome.error,
        }
    }
}

/// Builds the frame codec used on both ends of a connection.
pub(crate) fn codec(max_frame_bytes: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(max_frame_bytes)
        .new_codec()
}

/// A connected protocol client.
///
/// Commands are issued one at a time per connection; open more clients
/// for concurrency.
pub struct Client {
    framed: Framed<TcpStream, LengthDelimitedCodec>,
}

impl Client {
    /// Connects to a server.
    pub async fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            framed: Framed::new(stream, codec(default_client_frame_bytes())),
        })
    }

    /// Issues one command and waits for its response.
    pub async fn call(&mut self, request: Request) -> io::Result<Response> {
        let encoded = bincode::serialize(&request)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        self.framed.send(encoded.into()).await?;

        let frame = self
            .framed
            .next()
            .await
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed"))??;
        bincode::deserialize(&frame).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

fn default_client_frame_bytes() -> usize {
    crate::config::ServerConfig::default().max_frame_bytes
}
