//! Demonstration of the sign-stream capture pipeline.
//!
//! This example shows how to:
//! 1. Build a frame source and detector
//! 2. Start a capture session
//! 3. Drive the frame loop
//! 4. Watch sequences flow through the gate, validator, and transport
//!
//! Run with: cargo run --example recognize_demo
//!
//! The demo uses the synthetic source and scripted detector, so no camera
//! or model is required.

use std::time::{Duration, Instant};

use sign_stream_agent::{
    config::Config,
    core::DispatchRecord,
    detect::ScriptedDetector,
    session::FrameLoop,
    source::SyntheticSource,
    stats::create_shared_stats,
    transport::Transport,
    VERSION,
};

/// Transport that prints each dispatched sequence instead of sending it.
struct PrintingTransport {
    dispatched: usize,
}

impl Transport for PrintingTransport {
    fn dispatch(&mut self, record: DispatchRecord, history: &[String]) {
        self.dispatched += 1;
        println!(
            "  Dispatch #{}: {} frames x {} values (history: {} signs)",
            self.dispatched,
            record.frame_count(),
            record.sequence.first().map_or(0, |v| v.len()),
            history.len()
        );
    }
}

fn main() {
    println!("Sign-Stream Agent v{VERSION} - Recognition Demo");
    println!("===============================================");
    println!();

    let config = Config::default();
    println!(
        "Sequence: {} frames, retain {} after flush, throttle {} ms",
        config.n_frames,
        config.retain_frames,
        config.throttle.as_millis()
    );
    println!("Frame rate: {:.1} fps", config.frame_rate);
    println!();

    let frame_interval = config.frame_interval();
    let stats = create_shared_stats();

    let source = SyntheticSource::new(config.source.frame_width, config.source.frame_height);
    let detector = ScriptedDetector::full_body();
    let transport = PrintingTransport { dispatched: 0 };

    let mut frame_loop = FrameLoop::new(config, source, detector, transport, stats.clone());

    let session_id = match frame_loop.start() {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Error starting capture: {e}");
            return;
        }
    };
    println!("Session ID: {session_id}");
    println!("Capturing for 5 seconds...");
    println!();

    let start = Instant::now();
    let mut last_progress = 0;

    while start.elapsed() < Duration::from_secs(5) {
        match frame_loop.tick() {
            Ok(_report) => {}
            Err(e) => {
                eprintln!("Capture error: {e}");
                break;
            }
        }

        // Show the window filling up once per ten frames.
        let submitted = frame_loop.frames_submitted();
        if submitted / 10 > last_progress {
            last_progress = submitted / 10;
            println!(
                "  [{} frames] window at {}/30",
                submitted,
                frame_loop.window_len()
            );
        }

        std::thread::sleep(frame_interval);
    }

    println!();
    println!("Stopping capture...");
    if let Some(summary) = frame_loop.stop() {
        println!(
            "Session complete: {} frames submitted, {} sequences dispatched",
            summary.frames_submitted, summary.sequences_dispatched
        );
    }

    println!();
    println!("{}", stats.summary());
    println!();
    println!("Demo complete!");
}
