//! Sign-Stream Agent CLI
//!
//! Continuous sign-language capture pipeline.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use sign_stream_agent::{
    config::Config,
    detect::ScriptedDetector,
    session::{CaptureError, FrameLoop, SessionSummary},
    source::SyntheticSource,
    stats::create_shared_stats_with_persistence,
    transport::{NullTransport, Transport},
    VERSION,
};

#[cfg(feature = "transport")]
use sign_stream_agent::transport::{HttpTransport, PredictorConfig};

#[derive(Parser)]
#[command(name = "sign-stream")]
#[command(author = "Sign-Stream")]
#[command(version = VERSION)]
#[command(about = "Continuous sign-language capture pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start capturing and dispatching sequences
    Start {
        /// Capture rate in frames per second
        #[arg(long)]
        fps: Option<f64>,

        /// Dispatch sequences to a remote predictor (requires transport feature)
        #[arg(long)]
        remote: bool,

        /// Predictor host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Predictor port
        #[arg(long, default_value = "5000")]
        port: u16,
    },

    /// Pause capture
    Pause,

    /// Resume capture
    Resume,

    /// Show current pipeline status
    Status,

    /// Merge exported session reports
    Export {
        /// Output directory for reports
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Export format (json or jsonl)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            fps,
            remote,
            host,
            port,
        } => {
            cmd_start(fps, remote, &host, port);
        }
        Commands::Pause => {
            cmd_pause();
        }
        Commands::Resume => {
            cmd_resume();
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Export { output, format } => {
            cmd_export(output, &format);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

#[allow(unused_variables)]
fn cmd_start(fps: Option<f64>, remote: bool, host: &str, port: u16) {
    println!("Sign-Stream Agent v{VERSION}");
    println!();

    // Load or create configuration
    let mut config = Config::load().unwrap_or_default();
    if let Some(fps) = fps {
        config.frame_rate = fps;
    }
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    println!("Starting capture...");
    println!("  Frame rate: {:.1} fps", config.frame_rate);
    println!(
        "  Sequence: {} frames, retain {}",
        config.n_frames, config.retain_frames
    );
    println!("  Throttle: {} ms", config.throttle.as_millis());

    // Wire up the transport
    #[cfg(feature = "transport")]
    let (transport, prediction_rx): (Box<dyn Transport>, _) = if remote {
        match HttpTransport::spawn(PredictorConfig::new(host, port)) {
            Ok(http) => {
                println!("  Remote dispatch: enabled ({host}:{port})");
                println!("  Device ID: {}", http.device_id());
                let rx = http.results().clone();
                (Box::new(http), Some(rx))
            }
            Err(e) => {
                eprintln!("Warning: Transport initialization failed: {e}");
                eprintln!("Continuing without remote dispatch.");
                (Box::new(NullTransport), None)
            }
        }
    } else {
        println!("  Remote dispatch: disabled");
        (Box::new(NullTransport), None)
    };

    #[cfg(not(feature = "transport"))]
    let transport: Box<dyn Transport> = {
        if remote {
            eprintln!(
                "Warning: --remote flag ignored (transport feature not enabled at compile time)"
            );
        }
        Box::new(NullTransport)
    };

    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Set up pipeline stats
    let stats = create_shared_stats_with_persistence(config.data_path.join("stats.json"));

    // Build the frame loop
    let source = SyntheticSource::new(config.source.frame_width, config.source.frame_height);
    let detector = ScriptedDetector::full_body();
    let mut frame_loop = FrameLoop::new(config.clone(), source, detector, transport, stats.clone());

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc_handler(r);

    // Support pause/resume from another process by polling the config file.
    let mut paused = config.paused;
    let mut last_config_check = std::time::Instant::now();

    if paused {
        println!("Capture is currently paused.");
        println!("Run `sign-stream resume` to start capturing.");
        println!();
    } else if let Err(e) = frame_loop.start() {
        eprintln!("Error starting capture: {e}");
        std::process::exit(1);
    }

    let frame_interval = config.frame_interval();

    // Main frame loop
    while running.load(Ordering::SeqCst) {
        // Periodically reload config so `sign-stream pause/resume` can
        // control a running agent.
        if last_config_check.elapsed() >= Duration::from_secs(1) {
            if let Ok(cfg) = Config::load() {
                if cfg.paused != paused {
                    paused = cfg.paused;

                    if paused {
                        println!();
                        println!("Pausing capture...");
                        if let Some(summary) = frame_loop.stop() {
                            report_session(&summary);
                            export_session(&config, &summary);
                        }
                    } else {
                        println!();
                        println!("Resuming capture...");
                        if let Err(e) = frame_loop.start() {
                            eprintln!("Error resuming capture: {e}");
                            std::process::exit(1);
                        }
                    }
                }
            }
            last_config_check = std::time::Instant::now();
        }

        if paused {
            thread::sleep(Duration::from_millis(100));
            continue;
        }

        match frame_loop.tick() {
            Ok(report) => {
                if report.sequences_dispatched > 0 {
                    println!(
                        "[{}] Sequence dispatched ({} frames buffered)",
                        Utc::now().format("%H:%M:%S"),
                        frame_loop.window_len()
                    );
                }
                if report.sequences_rejected > 0 {
                    println!(
                        "[{}] Sequence rejected by validator",
                        Utc::now().format("%H:%M:%S")
                    );
                }
            }
            Err(CaptureError::DetectorFailure(msg)) => {
                eprintln!("Detector failure: {msg}");
                eprintln!("Capture stopped. Restart the agent to continue.");
                break;
            }
            Err(e) => {
                eprintln!("Capture error: {e}");
                break;
            }
        }

        // Consume out-of-band recognition results
        #[cfg(feature = "transport")]
        if let Some(ref rx) = prediction_rx {
            while let Ok(outcome) = rx.try_recv() {
                match outcome {
                    Ok(prediction) => {
                        let accepted =
                            frame_loop.record_prediction(&prediction.label, prediction.confidence);
                        frame_loop.set_sentence(&prediction.sentence);
                        println!(
                            "[{}] Recognized: {} ({:.2}){}",
                            Utc::now().format("%H:%M:%S"),
                            prediction.label,
                            prediction.confidence,
                            if accepted { "" } else { " — below threshold" }
                        );
                        if !prediction.sentence.is_empty() {
                            println!("  Sentence: {}", prediction.sentence);
                        }
                    }
                    Err(e) => {
                        eprintln!("[predictor] Request failed: {e}");
                    }
                }
            }
        }

        thread::sleep(frame_interval);
    }

    // Stop capture
    println!();
    println!("Stopping capture...");
    if let Some(summary) = frame_loop.stop() {
        report_session(&summary);
        export_session(&config, &summary);
    }

    // Save pipeline stats
    if let Err(e) = stats.save() {
        eprintln!("Warning: Could not save pipeline stats: {e}");
    }

    // Final stats
    println!();
    println!("{}", stats.summary());
}

/// Print a finished session to the console.
fn report_session(summary: &SessionSummary) {
    println!(
        "Session {}: {} frames, {} sequences dispatched, {} rejected",
        summary.session_id,
        summary.frames_submitted,
        summary.sequences_dispatched,
        summary.sequences_rejected
    );
    if !summary.signs.is_empty() {
        println!("  Signs: {}", summary.signs.join(" "));
    }
    if !summary.sentence.is_empty() {
        println!("  Sentence: {}", summary.sentence);
    }
}

/// Write a finished session's report into the export directory.
fn export_session(config: &Config, summary: &SessionSummary) {
    let export_path = config.export_path.join(format!(
        "session_{}.json",
        Utc::now().format("%Y%m%d_%H%M%S")
    ));

    if let Some(parent) = export_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match serde_json::to_string_pretty(summary) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&export_path, json) {
                eprintln!("Error writing session report: {e}");
            } else {
                println!("Exported session report to {export_path:?}");
            }
        }
        Err(e) => {
            eprintln!("Error serializing session report: {e}");
        }
    }
}

fn cmd_pause() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = true;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Capture paused. Use 'sign-stream resume' to continue.");
}

fn cmd_resume() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = false;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Capture resumed.");
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Sign-Stream Agent Status");
    println!("========================");
    println!();

    println!("Configuration:");
    println!("  Frame rate: {:.1} fps", config.frame_rate);
    println!(
        "  Sequence: {} frames, retain {}",
        config.n_frames, config.retain_frames
    );
    println!("  Throttle: {} ms", config.throttle.as_millis());
    println!("  Min confidence: {:.2}", config.min_confidence);
    println!(
        "  Strict signs: {} (confidence {:.2})",
        config.strict_signs.join(", "),
        config.strict_confidence
    );
    println!("  Paused: {}", config.paused);
    println!();

    // Load and show cumulative stats if available
    let stats_path = config.data_path.join("stats.json");
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                if let Some(frames) = stats.get("frames_captured") {
                    println!("  Frames captured: {frames}");
                }
                if let Some(detections) = stats.get("detections_received") {
                    println!("  Detections received: {detections}");
                }
                if let Some(dispatched) = stats.get("sequences_dispatched") {
                    println!("  Sequences dispatched: {dispatched}");
                }
                if let Some(rejected) = stats.get("sequences_rejected") {
                    println!("  Sequences rejected: {rejected}");
                }
                if let Some(stale) = stats.get("stale_results_discarded") {
                    println!("  Stale results discarded: {stale}");
                }
            }
        }
    } else {
        println!("No previous run data found.");
    }
}

fn cmd_export(output: Option<PathBuf>, format: &str) {
    let config = Config::load().unwrap_or_default();
    let export_dir = output.unwrap_or(config.export_path.clone());

    // Find all session report files
    let session_files: Vec<PathBuf> = std::fs::read_dir(&export_dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
                .collect()
        })
        .unwrap_or_default();

    if session_files.is_empty() {
        println!("No session reports found in {export_dir:?}");
        println!("Run 'sign-stream start' to begin capturing.");
        return;
    }

    println!(
        "Found {} session report(s) in {:?}",
        session_files.len(),
        export_dir
    );

    // Combine all reports
    let mut all_sessions: Vec<SessionSummary> = Vec::new();
    for file in &session_files {
        if let Ok(content) = std::fs::read_to_string(file) {
            if let Ok(summary) = serde_json::from_str::<SessionSummary>(&content) {
                all_sessions.push(summary);
            }
        }
    }

    println!("Total sessions: {}", all_sessions.len());

    // Export based on format
    let output_path = export_dir.join(format!(
        "export_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        if format == "jsonl" { "jsonl" } else { "json" }
    ));

    let result = if format == "jsonl" {
        // JSON Lines format
        let lines: Vec<String> = all_sessions
            .iter()
            .filter_map(|s| serde_json::to_string(s).ok())
            .collect();
        std::fs::write(&output_path, lines.join("\n"))
    } else {
        // Pretty JSON format
        match serde_json::to_string_pretty(&all_sessions) {
            Ok(json) => std::fs::write(&output_path, json),
            Err(e) => {
                eprintln!("Error serializing: {e}");
                return;
            }
        }
    };

    match result {
        Ok(_) => println!("Exported to {output_path:?}"),
        Err(e) => eprintln!("Error writing export: {e}"),
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
