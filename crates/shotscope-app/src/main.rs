use std::sync::Arc;

use clap::Parser;

use shotscope_app::bridge::BridgeServer;
use shotscope_app::config;
use shotscope_app::detector::{Detector, HttpDetector};

/// Shotscope bridge — local HTTP front for the detection backend
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = config::bridge::DEFAULT_BIND)]
    bind: String,

    /// Detection backend base URL (overrides SHOTSCOPE_BACKEND_URL)
    #[arg(long)]
    backend: Option<String>,
}

fn main() {
    let args = Args::parse();

    let built = match args.backend {
        Some(url) => HttpDetector::with_base_url(url),
        None => HttpDetector::new(),
    };
    let detector: Arc<dyn Detector> = match built {
        Ok(detector) => Arc::new(detector),
        Err(e) => {
            eprintln!("bridge: failed to initialize detector: {}", e);
            std::process::exit(1);
        }
    };
    eprintln!("bridge: forwarding to {}", detector.endpoint());

    let server = match BridgeServer::bind(&args.bind, detector) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("bridge: failed to bind {}: {}", args.bind, e);
            std::process::exit(1);
        }
    };
    match server.local_addr() {
        Ok(addr) => eprintln!(
            "bridge: listening on http://{}{}",
            addr,
            config::bridge::ANALYZE_ROUTE
        ),
        Err(e) => eprintln!("bridge: listening (address unavailable: {})", e),
    }

    server.serve();
}
