//! Push delivery of call notices from the operator console.
//!
//! Each notice is one UDP datagram carrying the bare
//! `{ticketNumber, counterNumber, calledAtTimestamp}` JSON object.

use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use ticket_call::{AnnouncementRequest, CallEvent, CallOrigin, Error, Result};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const MAX_DATAGRAM: usize = 4096;

/// A stream of call notices. `Ok(None)` means the feed is closed for good.
#[async_trait]
pub trait CallFeed: Send {
    async fn next_call(&mut self) -> Result<Option<AnnouncementRequest>>;
}

/// Receives call notices, one per datagram.
pub struct UdpCallFeed {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpCallFeed {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| Error::DetectorTransport(format!("binding {addr}: {e}")))?;
        Ok(Self {
            socket,
            buf: vec![0u8; MAX_DATAGRAM],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket
            .local_addr()
            .map_err(|e| Error::DetectorTransport(e.to_string()))
    }
}

#[async_trait]
impl CallFeed for UdpCallFeed {
    /// Malformed datagrams are logged and skipped; only socket failures
    /// surface as errors.
    async fn next_call(&mut self) -> Result<Option<AnnouncementRequest>> {
        loop {
            let (len, from) = self
                .socket
                .recv_from(&mut self.buf)
                .await
                .map_err(|e| Error::DetectorTransport(format!("udp receive: {e}")))?;
            match serde_json::from_slice::<AnnouncementRequest>(&self.buf[..len]) {
                Ok(call) => return Ok(Some(call)),
                Err(e) => warn!(%from, error = %e, "dropping malformed call notice"),
            }
        }
    }
}

/// Sends call notices to every configured display.
pub struct UdpCallPublisher {
    socket: UdpSocket,
    peers: Vec<SocketAddr>,
}

impl UdpCallPublisher {
    pub async fn new(peers: Vec<SocketAddr>) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| Error::DetectorTransport(format!("binding publisher: {e}")))?;
        Ok(Self { socket, peers })
    }

    /// Returns how many peers the notice was handed to.
    pub async fn publish(&self, call: &AnnouncementRequest) -> Result<usize> {
        let payload = serde_json::to_vec(call)
            .map_err(|e| Error::DetectorTransport(format!("encoding notice: {e}")))?;
        let mut delivered = 0;
        for peer in &self.peers {
            match self.socket.send_to(&payload, peer).await {
                Ok(_) => delivered += 1,
                Err(e) => warn!(%peer, error = %e, "failed to send call notice"),
            }
        }
        if delivered == 0 && !self.peers.is_empty() {
            return Err(Error::DetectorTransport("no display reachable".into()));
        }
        Ok(delivered)
    }
}

/// Forward every notice from `feed` into the sequencer channel.
pub async fn listen<F: CallFeed>(mut feed: F, events: mpsc::Sender<CallEvent>) {
    loop {
        match feed.next_call().await {
            Ok(Some(call)) => {
                let event = CallEvent::new(call, CallOrigin::Broadcast);
                if events.send(event).await.is_err() {
                    debug!("sequencer gone, broadcast listener stopping");
                    break;
                }
            }
            Ok(None) => {
                debug!("broadcast feed closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "broadcast receive failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}
