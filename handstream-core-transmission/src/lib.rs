//! Fire-and-forget UDP transport for handstream: one payload per datagram,
//! a hard size cap instead of fragmentation, no delivery guarantees.

pub mod receiver;
pub mod sender;

pub use receiver::{DatagramReceiver, LandmarkReceiver};
pub use sender::DatagramSender;
