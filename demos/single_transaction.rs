//! Single Transaction Example
//!
//! Sends one frame on channel 0 and waits for the first frame received:
//!
//! 1. INIT - accept every frame, 125 kbps, normal mode
//! 2. START
//! 3. Write one frame (ID 0x610)
//! 4. Poll until a frame is pending, then read it
//! 5. STOP

use std::time::{Duration, Instant};

use canalyst_ii::{
    Bitrate, CanMessage, CanalystError, CanalystII, Channel, FrameBuffer, InitConfig,
};

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {} ({})", e, e.kind());
        std::process::exit(1);
    }
}

fn run() -> canalyst_ii::Result<()> {
    let mut dev = CanalystII::open()?;
    println!("Found device: {}", dev.transport());

    let channel = Channel::Zero;
    dev.init(channel, &InitConfig::new(Bitrate::Kbps125))?;
    dev.start(channel)?;
    println!("{} started at {}", channel, Bitrate::Kbps125);

    let message = CanMessage::new(0x610, &[0x40, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])?;
    dev.write(channel, &FrameBuffer::from_messages(&[message])?)?;
    println!("CAN TX: {}", message);

    let start = Instant::now();
    loop {
        match dev.read(channel) {
            Ok(frames) => {
                for frame in frames.iter() {
                    println!("CAN RX: {}", frame);
                }
                break;
            }
            Err(CanalystError::BufferEmpty) if start.elapsed() < RECEIVE_TIMEOUT => continue,
            Err(CanalystError::BufferEmpty) => {
                println!("No frame received within {:?}", RECEIVE_TIMEOUT);
                break;
            }
            Err(e) => return Err(e),
        }
    }

    dev.flush_tx_buffer(channel, Duration::from_secs(1))?;
    dev.stop(channel)?;
    dev.close()
}
