//! handstream is a small toolkit to capture webcam frames, run an optional
//! hand landmark extractor over them and forward both channels over UDP to a
//! local receiver. Transmission is fire-and-forget: one datagram per payload,
//! no retries, oversized payloads are dropped rather than fragmented.
//!
//! This crate holds the data model, the trait seams towards external
//! collaborators (frame sources, codecs, landmark inference, transports) and
//! the capture session state machine that ties them together.

pub mod error;
pub mod extractors;
pub mod helpers;
pub mod session;
pub mod stats;
pub mod traits;
pub mod types;
