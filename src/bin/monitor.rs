use std::net::SocketAddr;

use clap::Parser;
use log::{debug, error, info, warn};

use handstream::codecs::JpegFrameDecoder;
use handstream::error::ReceiveError;
use handstream::transmission::{DatagramReceiver, LandmarkReceiver};

#[derive(Parser)]
#[clap(
    name = "monitor",
    about = "Listens for handstream frame and landmark datagrams and logs what arrives"
)]
struct Options {
    /// Local address of the image channel
    #[clap(long, default_value = "0.0.0.0:8383")]
    frame_listen: SocketAddr,

    /// Local address of the landmark channel
    #[clap(long, default_value = "0.0.0.0:8384")]
    landmark_listen: SocketAddr,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let options = Options::parse();

    let mut frames = DatagramReceiver::bind(options.frame_listen).await?;
    let mut landmarks = LandmarkReceiver::bind(options.landmark_listen).await?;
    let decoder = JpegFrameDecoder;

    info!(
        "Listening for frames on {} and landmarks on {}",
        options.frame_listen, options.landmark_listen
    );

    loop {
        tokio::select! {
            datagram = frames.recv() => match datagram {
                Ok(payload) => match decoder.decode(&payload) {
                    Ok(frame) => info!(
                        "Frame {}x{} ({} bytes on the wire)",
                        frame.width,
                        frame.height,
                        payload.len()
                    ),
                    Err(fault) => warn!("Discarding frame datagram: {}", fault),
                },
                Err(fault) => {
                    error!("Image channel receive failed: {}", fault);
                    break;
                }
            },
            record = landmarks.recv_record() => match record {
                Ok(record) => {
                    info!(
                        "Record {}: {} hand(s)",
                        record.frame_number, record.hands_detected
                    );
                    for hand in &record.hands {
                        if let Some(wrist) = hand.landmarks.first() {
                            debug!(
                                "  {} ({:.2}) wrist at ({:.3}, {:.3})",
                                hand.label, hand.confidence, wrist.x, wrist.y
                            );
                        }
                    }
                }
                Err(ReceiveError::MalformedRecord(fault)) => {
                    warn!("Discarding malformed landmark datagram: {}", fault);
                }
                Err(fault) => {
                    error!("Landmark channel receive failed: {}", fault);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, shutting down");
                break;
            }
        }
    }

    frames.close();
    landmarks.close();
    Ok(())
}
