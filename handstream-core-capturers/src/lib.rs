//! Frame sources for handstream capture sessions: a `nokhwa`-backed webcam
//! source (feature `webcam`, on by default) and a synthetic generator for
//! hardware-free runs and tests.

#[cfg(feature = "webcam")]
pub mod camera;
pub mod synthetic;

#[cfg(feature = "webcam")]
pub use camera::NokhwaFrameSource;
pub use synthetic::SyntheticFrameSource;
