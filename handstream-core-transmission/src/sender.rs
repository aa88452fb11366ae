use std::net::SocketAddr;

use async_trait::async_trait;
use log::debug;
use tokio::net::UdpSocket;

use handstream_core::error::SendError;
use handstream_core::traits::PayloadSender;
use handstream_core::types::MAX_DATAGRAM_SIZE;

/// One UDP endpoint per channel, bound once for the sender's lifetime.
///
/// `send` transmits exactly one datagram per payload. Payloads over
/// [`MAX_DATAGRAM_SIZE`] are rejected without touching the socket; transmit
/// errors are reported to the caller and never retried.
pub struct DatagramSender {
    socket: Option<UdpSocket>,
    destination: SocketAddr,
}

impl DatagramSender {
    /// Binds an ephemeral local endpoint and aims it at `destination`.
    pub async fn connect(destination: SocketAddr) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        debug!(
            "Datagram sender bound to {}, destination {}",
            socket.local_addr()?,
            destination
        );

        Ok(Self {
            socket: Some(socket),
            destination,
        })
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }
}

#[async_trait]
impl PayloadSender for DatagramSender {
    async fn send(&mut self, payload: &[u8]) -> Result<(), SendError> {
        if payload.len() > MAX_DATAGRAM_SIZE {
            return Err(SendError::OversizedPayload {
                size: payload.len(),
            });
        }

        let socket = self.socket.as_ref().ok_or(SendError::Closed)?;
        let sent = socket.send_to(payload, self.destination).await?;
        debug!("Sent {} bytes to {}", sent, self.destination);
        Ok(())
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!("Datagram sender to {} closed", self.destination);
        }
    }
}
