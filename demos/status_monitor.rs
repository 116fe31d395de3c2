//! Status Monitor Example
//!
//! Starts both channels and prints the pending message counts and the CAN
//! controller status once a second.
//!
//! The CAN status register names are inferred from the vendor DLL and have not
//! been checked against the firmware; treat the values as indicative.

use std::thread;
use std::time::Duration;

use canalyst_ii::{Bitrate, CanalystII, Channel, InitConfig};

const SAMPLES: usize = 10;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> canalyst_ii::Result<()> {
    println!("{}", "=".repeat(60));
    println!("Canalyst-II Status Monitor");
    println!("{}", "=".repeat(60));
    println!();

    let mut dev = CanalystII::open()?.with_timeout(Duration::from_millis(500));
    println!("Found device: {}", dev.transport());

    let config = InitConfig::new(Bitrate::Kbps500);
    for channel in Channel::ALL {
        dev.init(channel, &config)?;
        dev.clear_rx_buffer(channel)?;
        dev.start(channel)?;
        println!("{}: started at {}", channel, Bitrate::Kbps500);
    }
    println!();

    for sample in 0..SAMPLES {
        println!("{}", "-".repeat(60));
        println!("Sample {}/{}", sample + 1, SAMPLES);
        for channel in Channel::ALL {
            let messages = dev.message_status(channel)?;
            let status = dev.get_status(channel)?;
            println!(
                "{}: rx_pending={} tx_pending={}",
                channel, messages.rx_pending, messages.tx_pending
            );
            println!("{}", status);
        }
        thread::sleep(Duration::from_secs(1));
    }

    for channel in Channel::ALL {
        dev.stop(channel)?;
    }
    dev.close()
}
