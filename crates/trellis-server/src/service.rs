//! The TCP command service.
//!
//! One spawned task per connection; each task decodes request frames,
//! submits them to the command log (or the local read path), and writes
//! back response frames. A malformed frame produces an error response; a
//! failed connection is logged and dropped without disturbing the accept
//! loop.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};
use trellis_repl::{Applier, Command, CommandLog};

use crate::protocol::{self, Request, Response};

/// The TCP command server.
pub struct Server {
    listener: TcpListener,
    log: Arc<dyn CommandLog>,
    applier: Arc<Applier>,
    max_frame_bytes: usize,
}

impl Server {
    /// Binds the listener. The server does not accept connections until
    /// [`serve`](Server::serve) is called.
    pub async fn bind(
        addr: &str,
        log: Arc<dyn CommandLog>,
        applier: Arc<Applier>,
        max_frame_bytes: usize,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            log,
            applier,
            max_frame_bytes,
        })
    }

    /// The bound address, useful when binding to port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts and serves connections until the task is dropped.
    pub async fn serve(self) -> io::Result<()> {
        info!(addr = %self.local_addr()?, "listening");
        loop {
            let (socket, peer) = self.listener.accept().await?;
            let log = Arc::clone(&self.log);
            let applier = Arc::clone(&self.applier);
            let max_frame_bytes = self.max_frame_bytes;
            tokio::spawn(async move {
                debug!(%peer, "connection opened");
                if let Err(err) = handle_conn(socket, log, applier, max_frame_bytes).await {
                    debug!(%peer, error = %err, "connection closed");
                }
            });
        }
    }
}

async fn handle_conn(
    socket: TcpStream,
    log: Arc<dyn CommandLog>,
    applier: Arc<Applier>,
    max_frame_bytes: usize,
) -> io::Result<()> {
    let mut framed = Framed::new(socket, protocol::codec(max_frame_bytes));
    while let Some(frame) = framed.next().await {
        let frame = frame?;
        let response = match bincode::deserialize::<Request>(&frame) {
            Ok(request) => dispatch(request, &log, &applier),
            Err(err) => {
                warn!(error = %err, "malformed request frame");
                Response::fail(format!("malformed request frame: {err}"))
            }
        };
        let encoded = bincode::serialize(&response)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        framed.send(encoded.into()).await?;
    }
    Ok(())
}

fn dispatch(request: Request, log: &Arc<dyn CommandLog>, applier: &Arc<Applier>) -> Response {
    let cmd = Command::new(request.op, request.args);
    if request.local {
        applier.read(&cmd).into()
    } else {
        match log.append(cmd) {
            Ok(outcome) => outcome.into(),
            Err(err) => Response::fail(err.to_string()),
        }
    }
}
