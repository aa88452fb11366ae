pub use handstream_core::*;

#[cfg(feature = "capturers")]
pub mod capture {
    pub use handstream_core_capturers::*;
}

#[cfg(feature = "codecs")]
pub mod codecs {
    pub use handstream_core_codecs::*;
}

#[cfg(feature = "transmission")]
pub mod transmission {
    pub use handstream_core_transmission::*;
}
