//! Shotscope CLI — terminal console for gunshot analysis

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use shotscope::audio::{ClipEvent, PlaybackController};
use shotscope::error::ClipError;

use shotscope_app::config;
use shotscope_app::detector::{Detector, HttpDetector};
use shotscope_app::error::{AnalysisError, AppError, Result};
use shotscope_app::workflow::{AnalysisRecord, AnalysisWorkflow};

/// Worst-case wait for one analysis (connect + model inference on a cold
/// backend)
const ANALYZE_TIMEOUT: Duration = Duration::from_secs(90);

const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "shotscope", about = "Gunshot detection analysis console", version)]
struct Cli {
    /// Detection backend base URL (overrides SHOTSCOPE_BACKEND_URL)
    #[arg(long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one audio file and print the result card
    Analyze {
        /// Audio file to analyze
        file: PathBuf,
        /// Review the clip with playback afterwards
        #[arg(long)]
        play: bool,
    },
    /// Analyze every supported audio file in a directory
    Batch {
        /// Directory of audio files
        dir: PathBuf,
    },
    /// Check detection backend health
    Status,
}

fn main() {
    let cli = Cli::parse();

    let built = match cli.backend {
        Some(url) => HttpDetector::with_base_url(url),
        None => HttpDetector::new(),
    };
    let detector: Arc<dyn Detector> = match built {
        Ok(detector) => Arc::new(detector),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Command::Analyze { file, play }) => run_analyze(detector, &file, play),
        Some(Command::Batch { dir }) => run_batch(detector, &dir),
        Some(Command::Status) => run_status(detector.as_ref()),
        None => run_interactive(detector),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_analyze(detector: Arc<dyn Detector>, file: &Path, play: bool) -> Result<()> {
    let mut workflow = AnalysisWorkflow::new(detector);
    let record = analyze_one(&mut workflow, file)?;
    print_record(&record);
    if play {
        review_playback(&record)?;
    }
    Ok(())
}

fn run_batch(detector: Arc<dyn Detector>, dir: &Path) -> Result<()> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_supported(path))
        .collect();
    files.sort();

    if files.is_empty() {
        println!("No supported audio files in {}", dir.display());
        return Ok(());
    }

    println!("Analyzing {} file(s) in {}", files.len(), dir.display());
    let mut workflow = AnalysisWorkflow::new(detector);
    let mut detected = 0usize;
    let mut errors = 0usize;
    for path in &files {
        if let Err(e) = workflow.upload_path(path) {
            println!("  {:<36} skipped: {}", display_name(path), e);
            errors += 1;
            continue;
        }
        workflow.start();
        if !workflow.wait_for_complete(ANALYZE_TIMEOUT) {
            println!("  {:<36} timed out", display_name(path));
            workflow.reset();
            errors += 1;
            continue;
        }
        if let Some(record) = workflow.active() {
            println!("  {:<36} {}", display_name(path), record.verdict_line());
            if record.is_error() {
                errors += 1;
            } else if record.detected() {
                detected += 1;
            }
        }
    }

    println!();
    println!(
        "Analyzed {}: {} detection(s), {} error(s)",
        files.len(),
        detected,
        errors
    );
    Ok(())
}

fn run_status(detector: &dyn Detector) -> Result<()> {
    println!("Backend: {}", detector.endpoint());
    let status = detector.service_status()?;
    println!("Status:  {}", status.status.as_deref().unwrap_or("unknown"));
    if let Some(service) = &status.service {
        println!("Service: {}", service);
    }
    if let Some(version) = &status.version {
        println!("Version: {}", version);
    }
    println!(
        "Model:   {}",
        if status.model_loaded {
            "loaded"
        } else {
            "not loaded"
        }
    );
    if let Some(info) = &status.model_info {
        println!("Info:    {}", info);
    }
    Ok(())
}

fn run_interactive(detector: Arc<dyn Detector>) -> Result<()> {
    println!("{} (type 'help' for commands)", config::app::NAME);
    let mut workflow = AnalysisWorkflow::new(Arc::clone(&detector));
    let mut review: Option<Review> = None;

    let mut line = String::new();
    loop {
        // Report playback that ended between prompts
        if let Some(r) = &review {
            while let Some(event) = r.controller.try_recv_event() {
                if matches!(event, ClipEvent::Finished) {
                    println!("Playback finished");
                }
            }
        }
        workflow.poll();

        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if io::stdin().read_line(&mut line)? == 0 {
            break; // stdin closed
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (cmd, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));

        match cmd {
            "analyze" | "a" => {
                if rest.is_empty() {
                    println!("Usage: analyze <path>");
                    continue;
                }
                match analyze_one(&mut workflow, Path::new(rest.trim())) {
                    Ok(record) => print_record(&record),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "list" | "ls" => {
                if workflow.history().is_empty() {
                    println!("No analyses yet");
                    continue;
                }
                let active_id = workflow.active().map(|r| r.id().to_string());
                for (i, record) in workflow.history().iter().enumerate() {
                    let marker = if active_id.as_deref() == Some(record.id()) {
                        '*'
                    } else {
                        ' '
                    };
                    println!(
                        "{} {:>2}. [{}] {:<24} {}",
                        marker,
                        i + 1,
                        record.timestamp_display(),
                        record.filename(),
                        record.verdict_line()
                    );
                }
            }
            "select" => {
                let Ok(n) = rest.trim().parse::<usize>() else {
                    println!("Usage: select <n> (see 'list')");
                    continue;
                };
                let id = workflow
                    .history()
                    .iter()
                    .nth(n.wrapping_sub(1))
                    .map(|r| r.id().to_string());
                match id {
                    Some(id) => {
                        if let Err(e) = workflow.select_history(&id) {
                            println!("Error: {}", e);
                        } else if let Some(record) = workflow.active() {
                            print_record(record);
                        }
                    }
                    None => println!("No analysis #{}", n),
                }
            }
            "play" | "pause" | "p" => {
                let Some(record) = workflow.active().cloned() else {
                    println!("Nothing to play; run 'analyze' or 'select' first");
                    continue;
                };
                match toggle_review(&mut review, &record) {
                    Ok(transport) => println!("{}", transport),
                    Err(e) => println!("Playback error: {}", e),
                }
            }
            "new" => {
                workflow.reset();
                if let Some(r) = &review {
                    if let Err(e) = r.controller.unload() {
                        println!("Playback error: {}", e);
                    }
                }
                review = None;
                println!("Session cleared");
            }
            "status" => {
                if let Err(e) = run_status(detector.as_ref()) {
                    println!("Error: {}", e);
                }
            }
            "help" | "?" => print_help(),
            "quit" | "q" | "exit" => break,
            other => println!("Unknown command '{}'; try 'help'", other),
        }
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  analyze <path>   submit an audio file for analysis");
    println!("  list             show past analyses, most recent first");
    println!("  select <n>       put a past analysis back on display");
    println!("  play | pause     toggle review playback of the active clip");
    println!("  new              clear the session (history is kept)");
    println!("  status           check the detection backend");
    println!("  quit             exit");
}

/// Stage a file, submit it, and wait for the record
fn analyze_one(workflow: &mut AnalysisWorkflow, path: &Path) -> Result<AnalysisRecord> {
    workflow.upload_path(path)?;
    if let Some(clip) = workflow.staged() {
        println!("Analyzing {} ({})...", clip.filename(), clip.size_display());
    }
    workflow.start();
    if !workflow.wait_for_complete(ANALYZE_TIMEOUT) {
        workflow.reset();
        return Err(
            AnalysisError::Communication("timed out waiting for the backend".to_string()).into(),
        );
    }
    workflow
        .active()
        .cloned()
        .ok_or_else(|| AppError::NotFound("analysis produced no record".to_string()))
}

fn print_record(record: &AnalysisRecord) {
    println!();
    println!("  {}", record.verdict_line());
    println!(
        "  File:      {} ({})",
        record.filename(),
        record.clip().size_display()
    );
    println!("  Analyzed:  {}", record.timestamp_display());
    if let Some(risk) = record.risk_level() {
        println!("  Risk:      {}", risk);
    }
    if let Some(method) = record.method() {
        println!("  Method:    {}", method);
    }
    if !record.detections().is_empty() {
        println!("  Events:    {}", record.detections().len());
    }
    if let Some(map) = record.features().and_then(|f| f.as_object()) {
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        println!("  Features:  {}", keys.join(", "));
    }
    if let Some(hint) = record.setup_hint() {
        println!();
        println!("{}", hint);
    }
    println!();
}

/// Review playback bound to one record
struct Review {
    controller: PlaybackController,
    record_id: String,
}

/// Lazily start the playback engine, load the record's clip if it is not
/// the one loaded, and toggle. Returns the transport line to print.
fn toggle_review(review: &mut Option<Review>, record: &AnalysisRecord) -> Result<String> {
    let needs_load = review
        .as_ref()
        .map(|r| r.record_id != record.id())
        .unwrap_or(true);

    if needs_load {
        let controller = match review.take() {
            Some(r) => r.controller,
            None => PlaybackController::new()?,
        };
        controller.load(record.clip().clone())?;
        wait_for_loaded(&controller)?;
        *review = Some(Review {
            controller,
            record_id: record.id().to_string(),
        });
    }

    let Some(r) = review.as_ref() else {
        return Err(ClipError::Audio("playback engine unavailable".to_string()).into());
    };
    r.controller.toggle_play()?;
    let snapshot = r.controller.snapshot();
    let state = if snapshot.playing { "Playing" } else { "Paused" };
    Ok(format!("{}  {}", state, snapshot.clock_line()))
}

/// Block until the engine reports the loaded clip (or an error)
fn wait_for_loaded(controller: &PlaybackController) -> Result<()> {
    let deadline = Instant::now() + LOAD_TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ClipError::Timeout("clip never finished loading".to_string()).into());
        }
        match controller.event_receiver().recv_timeout(remaining) {
            Ok(ClipEvent::Loaded(info)) => {
                println!("{}", info);
                return Ok(());
            }
            Ok(ClipEvent::Error(e)) => return Err(ClipError::Decode(e).into()),
            Ok(_) => continue,
            Err(_) => {
                return Err(ClipError::Timeout("clip never finished loading".to_string()).into())
            }
        }
    }
}

/// Standalone review loop for `analyze --play`
fn review_playback(record: &AnalysisRecord) -> Result<()> {
    let controller = PlaybackController::new()?;
    controller.load(record.clip().clone())?;
    wait_for_loaded(&controller)?;

    controller.toggle_play()?;
    println!(
        "Reviewing {}: Enter toggles play/pause, 'q' ends",
        record.filename()
    );
    println!("Playing  {}", controller.clock_line());

    let mut line = String::new();
    loop {
        line.clear();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        while let Some(event) = controller.try_recv_event() {
            if matches!(event, ClipEvent::Finished) {
                println!("Playback finished");
            }
        }
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }
        controller.toggle_play()?;
        let snapshot = controller.snapshot();
        let state = if snapshot.playing { "Playing" } else { "Paused" };
        println!("{}  {}", state, snapshot.clock_line());
    }

    controller.unload()?;
    Ok(())
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| config::uploads::SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
