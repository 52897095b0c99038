//! wasm-audio harness binary
//!
//! Native stand-in for the browser host. With no arguments it loops live
//! input through the pass-through processor to the output device; given a
//! file path it plays the file through the processor instead.

use std::io::BufRead;
use std::time::Duration;

use wasm_audio::host::{FilePlayback, HostError, LiveLoopback};
use wasm_audio::settings::Settings;

fn main() {
    env_logger::init();
    log::info!("Starting wasm-audio harness");

    let settings = Settings::load();

    let result = match std::env::args().nth(1) {
        Some(path) => run_file(&path, &settings),
        None => run_live(&settings),
    };

    settings.save();

    if let Err(e) = result {
        log::error!("Harness failed: {}", e);
        std::process::exit(1);
    }
}

/// Loop live input through the processor until Enter is pressed.
fn run_live(settings: &Settings) -> Result<(), HostError> {
    let mut loopback = LiveLoopback::new(settings);
    if loopback.devices.is_empty() {
        return Err(HostError::DeviceNotFound);
    }

    loopback.start()?;
    println!("Loopback running; press Enter to stop.");

    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);

    loopback.stop();
    Ok(())
}

/// Play a file through the processor until it finishes (Ctrl-C to abort).
fn run_file(path: &str, settings: &Settings) -> Result<(), HostError> {
    let mut playback = FilePlayback::play(path, settings)?;
    if settings.loop_playback {
        println!("Looping {}; Ctrl-C to stop.", path);
    }

    while playback.is_running() {
        std::thread::sleep(Duration::from_millis(100));
    }

    playback.stop();
    Ok(())
}
