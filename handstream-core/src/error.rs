use thiserror::Error;

/// Fatal session conditions. Any of these terminates the streaming state;
/// everything else is absorbed by the loop and reflected in counters.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Frame read failed: {0}")]
    ReadFailed(String),

    #[error("End of stream")]
    EndOfStream,

    #[error("Unsupported configuration: {0}")]
    Unsupported(String),
}

/// Non-fatal transmit failures. The session counts them and keeps going;
/// UDP is best-effort and this layer adds no reliability.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("Payload of {size} bytes exceeds the safe datagram size")]
    OversizedPayload { size: usize },

    #[error("Sender is closed")]
    Closed,

    #[error("Transmit failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal codec failures: the offending frame is dropped, the session
/// continues.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Frame buffer does not match {width}x{height} RGB8")]
    BadDimensions { width: u32, height: u32 },

    #[error("Codec error: {0}")]
    Codec(String),
}

/// Failures on the receiving side. A malformed record only invalidates the
/// datagram that carried it.
#[derive(Error, Debug)]
pub enum ReceiveError {
    #[error("Receiver is closed")]
    Closed,

    #[error("Receive failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed landmark record: {0}")]
    MalformedRecord(#[from] serde_json::Error),
}
