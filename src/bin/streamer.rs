use std::net::SocketAddr;

use clap::Parser;
use log::{error, info};

use handstream::capture::SyntheticFrameSource;
#[cfg(feature = "webcam")]
use handstream::capture::NokhwaFrameSource;
use handstream::codecs::{JpegFrameEncoder, DEFAULT_JPEG_QUALITY};
use handstream::extractors::WavingExtractor;
use handstream::session::{CaptureSession, StopHandle, TickReport};
use handstream::traits::{FrameSource, SessionObserver};
use handstream::transmission::DatagramSender;

#[derive(Parser)]
#[clap(
    name = "streamer",
    about = "Captures webcam frames and streams JPEG images and hand landmark JSON over UDP"
)]
struct Options {
    /// Camera device index
    #[clap(long, default_value_t = 0)]
    camera_index: u32,

    /// Use the synthetic frame generator instead of a camera
    #[clap(long)]
    synthetic: bool,

    /// Requested capture width (best-effort device hint)
    #[clap(long, default_value_t = 640)]
    width: u32,

    /// Requested capture height (best-effort device hint)
    #[clap(long, default_value_t = 480)]
    height: u32,

    /// Requested frame rate (best-effort device hint)
    #[clap(long, default_value_t = 30)]
    frame_rate: u32,

    /// Destination of the JPEG image channel
    #[clap(long, default_value = "127.0.0.1:8383")]
    frame_destination: SocketAddr,

    /// Destination of the landmark channel
    #[clap(long, default_value = "127.0.0.1:8384")]
    landmark_destination: SocketAddr,

    /// JPEG quality (1-100)
    #[clap(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    jpeg_quality: u8,

    /// Emit a synthetic waving hand on the landmark channel (demo aid when
    /// no inference backend is wired up)
    #[clap(long)]
    demo_hands: bool,

    /// Log every iteration instead of the periodic summary only
    #[clap(long)]
    debug_ticks: bool,

    /// Stop after this many frames (0 = run until interrupted)
    #[clap(long, default_value_t = 0)]
    max_frames: u64,
}

/// Requests a stop once the configured frame limit is reached.
struct FrameLimit {
    limit: u64,
    handle: StopHandle,
}

impl SessionObserver for FrameLimit {
    fn on_tick(&mut self, tick: &TickReport) {
        if self.limit > 0 && tick.record.frame_number >= self.limit {
            info!("Frame limit of {} reached", self.limit);
            self.handle.stop();
        }
    }
}

struct TickPrinter;

impl SessionObserver for TickPrinter {
    fn on_tick(&mut self, tick: &TickReport) {
        info!(
            "Frame {} | {}x{} | hands: {}",
            tick.record.frame_number,
            tick.frame.width,
            tick.frame.height,
            tick.record.hands_detected
        );
    }
}

fn build_source(options: &Options) -> Box<dyn FrameSource + Send> {
    if options.synthetic {
        return Box::new(
            SyntheticFrameSource::new(options.width, options.height)
                .frame_rate(options.frame_rate),
        );
    }

    #[cfg(feature = "webcam")]
    {
        Box::new(NokhwaFrameSource::new(
            options.camera_index,
            options.width,
            options.height,
            options.frame_rate,
        ))
    }
    #[cfg(not(feature = "webcam"))]
    {
        info!("Built without webcam support, falling back to the synthetic source");
        Box::new(
            SyntheticFrameSource::new(options.width, options.height)
                .frame_rate(options.frame_rate),
        )
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let options = Options::parse();

    let frame_sender = DatagramSender::connect(options.frame_destination).await?;
    let landmark_sender = DatagramSender::connect(options.landmark_destination).await?;

    let mut session = CaptureSession::new(build_source(&options))
        .image_channel(JpegFrameEncoder::new(options.jpeg_quality), frame_sender)
        .landmark_channel(landmark_sender);

    if options.demo_hands {
        session = session.extractor(WavingExtractor::new());
    }
    if options.debug_ticks {
        session = session.observer(TickPrinter);
    }
    if options.max_frames > 0 {
        let handle = session.stop_handle();
        session = session.observer(FrameLimit {
            limit: options.max_frames,
            handle,
        });
    }

    let stop = session.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping capture");
            stop.stop();
        }
    });

    info!(
        "Streaming to {} (frames) and {} (landmarks)",
        options.frame_destination, options.landmark_destination
    );

    if let Err(fault) = session.run().await {
        error!("Capture session ended with a fault: {}", fault);
    }

    Ok(())
}
