use std::net::SocketAddr;

use bytes::Bytes;
use log::debug;
use tokio::net::UdpSocket;

use handstream_core::error::ReceiveError;
use handstream_core::types::{FrameRecord, MAX_DATAGRAM_SIZE};

/// Receives raw datagrams on a bound local port.
pub struct DatagramReceiver {
    socket: Option<UdpSocket>,
    buffer: Vec<u8>,
}

impl DatagramReceiver {
    pub async fn bind(address: SocketAddr) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(address).await?;
        debug!("Datagram receiver bound to {}", socket.local_addr()?);

        Ok(Self {
            socket: Some(socket),
            // One byte of headroom so an over-cap datagram is observable
            // instead of silently truncated.
            buffer: vec![0u8; MAX_DATAGRAM_SIZE + 1],
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|socket| socket.local_addr().ok())
    }

    /// Waits for the next datagram and returns its payload.
    pub async fn recv(&mut self) -> Result<Bytes, ReceiveError> {
        let socket = self.socket.as_ref().ok_or(ReceiveError::Closed)?;
        let (len, from) = socket.recv_from(&mut self.buffer).await?;
        debug!("Received {} bytes from {}", len, from);
        Ok(Bytes::copy_from_slice(&self.buffer[..len]))
    }

    pub fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!("Datagram receiver closed");
        }
    }
}

/// Receives landmark channel datagrams and parses them into
/// [`FrameRecord`]s. A malformed datagram only fails that one record; the
/// caller decides whether to keep listening.
pub struct LandmarkReceiver {
    inner: DatagramReceiver,
}

impl LandmarkReceiver {
    pub async fn bind(address: SocketAddr) -> std::io::Result<Self> {
        Ok(Self {
            inner: DatagramReceiver::bind(address).await?,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.local_addr()
    }

    pub async fn recv_record(&mut self) -> Result<FrameRecord, ReceiveError> {
        let datagram = self.inner.recv().await?;
        let record = serde_json::from_slice(&datagram)?;
        Ok(record)
    }

    pub fn close(&mut self) {
        self.inner.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::DatagramSender;

    use handstream_core::traits::PayloadSender;

    #[tokio::test]
    async fn landmark_receiver_parses_records() {
        let mut receiver = LandmarkReceiver::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let mut sender = DatagramSender::connect(receiver.local_addr().unwrap())
            .await
            .unwrap();

        let record = FrameRecord::new(9, Vec::new());
        sender
            .send(&serde_json::to_vec(&record).unwrap())
            .await
            .unwrap();

        let received = receiver.recv_record().await.unwrap();
        assert_eq!(received.frame_number, 9);
        assert_eq!(received.hands_detected, 0);
    }

    #[tokio::test]
    async fn malformed_datagram_is_reported_not_fatal() {
        let mut receiver = LandmarkReceiver::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let mut sender = DatagramSender::connect(receiver.local_addr().unwrap())
            .await
            .unwrap();

        sender.send(b"{not json").await.unwrap();
        assert!(matches!(
            receiver.recv_record().await,
            Err(ReceiveError::MalformedRecord(_))
        ));

        // The channel keeps working after a bad datagram.
        let record = FrameRecord::new(10, Vec::new());
        sender
            .send(&serde_json::to_vec(&record).unwrap())
            .await
            .unwrap();
        assert_eq!(receiver.recv_record().await.unwrap().frame_number, 10);
    }

    #[tokio::test]
    async fn recv_after_close_fails() {
        let mut receiver = DatagramReceiver::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        receiver.close();
        receiver.close();

        assert!(matches!(receiver.recv().await, Err(ReceiveError::Closed)));
    }
}
