//! Test All Bitrates Example
//!
//! Tests every supported bitrate with channel 0 wired to channel 1:
//! 1. Initializes and starts both channels at the bitrate
//! 2. Sends a test frame on CAN0
//! 3. Verifies the frame arrives on CAN1 with the correct payload

use std::time::{Duration, Instant};

use canalyst_ii::{
    Bitrate, CanMessage, CanalystError, CanalystII, Channel, FrameBuffer, InitConfig, UsbDevice,
};

// Test configuration
const TEST_CAN_ID: u32 = 0x123;
const TEST_DATA: [u8; 8] = [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xBA, 0xBE];
const READ_TIMEOUT: Duration = Duration::from_millis(1000);

fn main() {
    env_logger::init();

    match run() {
        Ok(failed) if failed == 0 => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> canalyst_ii::Result<usize> {
    let mut dev = CanalystII::open()?;
    println!("Found device: {}", dev.transport());
    println!("Connect CAN0 to CAN1 (with termination) before running.");
    println!();

    let mut failed = 0;
    for bitrate in Bitrate::ALL {
        match test_bitrate(&mut dev, bitrate) {
            Ok(true) => println!("[PASS] {}", bitrate),
            Ok(false) => {
                println!("[FAIL] {}: payload mismatch", bitrate);
                failed += 1;
            }
            Err(e) => {
                println!("[FAIL] {}: {}", bitrate, e);
                failed += 1;
            }
        }
    }

    println!();
    println!(
        "{} of {} bitrates passed",
        Bitrate::ALL.len() - failed,
        Bitrate::ALL.len()
    );

    dev.close()?;
    Ok(failed)
}

fn test_bitrate(dev: &mut CanalystII<UsbDevice>, bitrate: Bitrate) -> canalyst_ii::Result<bool> {
    let config = InitConfig::new(bitrate);
    for channel in Channel::ALL {
        dev.stop(channel)?;
        dev.init(channel, &config)?;
        dev.clear_rx_buffer(channel)?;
        dev.start(channel)?;
    }

    let message = CanMessage::new(TEST_CAN_ID, &TEST_DATA)?;
    dev.write(Channel::Zero, &FrameBuffer::from_messages(&[message])?)?;

    let result = wait_for_frame(dev, Channel::One);
    dev.flush_tx_buffer(Channel::Zero, Duration::from_secs(1))?;
    for channel in Channel::ALL {
        dev.stop(channel)?;
    }

    let received = result?;
    if received.can_id != TEST_CAN_ID || received.data() != &TEST_DATA[..] {
        println!("  expected {}", message);
        println!("  received {}", received);
        return Ok(false);
    }
    Ok(true)
}

fn wait_for_frame(
    dev: &mut CanalystII<UsbDevice>,
    channel: Channel,
) -> canalyst_ii::Result<CanMessage> {
    let start = Instant::now();
    loop {
        match dev.read(channel) {
            Ok(frames) => {
                if let Some(frame) = frames.messages().first() {
                    return Ok(*frame);
                }
            }
            Err(CanalystError::BufferEmpty) => {}
            Err(e) => return Err(e),
        }
        if start.elapsed() >= READ_TIMEOUT {
            return Err(CanalystError::BufferEmpty);
        }
    }
}
