//! Bridge HTTP endpoint
//!
//! Serves the local analyze route over a blocking TCP listener. One small
//! endpoint with a fixed contract; requests are parsed by hand rather than
//! pulling in a server framework.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;

use shotscope::audio::AudioClip;

use crate::config::bridge::{ANALYZE_ROUTE, MAX_UPLOAD_BYTES, UPLOAD_FIELD};
use crate::detector::Detector;
use crate::error::{AnalysisError, AppError, Result};

use super::multipart::{self, find_bytes};
use super::types::{AnalyzeResponse, ErrorResponse};

/// Largest accepted request head (request line plus headers)
const MAX_HEAD_BYTES: usize = 16 * 1024;

/// Per-connection socket timeout
const SOCKET_TIMEOUT_SECS: u64 = 30;

/// The local analyze endpoint
pub struct BridgeServer {
    listener: TcpListener,
    detector: Arc<dyn Detector>,
}

impl BridgeServer {
    /// Bind the listener. `addr` is host:port; port 0 picks one.
    pub fn bind(addr: &str, detector: Arc<dyn Detector>) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self { listener, detector })
    }

    /// The bound address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and handle connections until the listener fails. Blocking.
    pub fn serve(&self) {
        for conn in self.listener.incoming() {
            match conn {
                Ok(stream) => {
                    if let Err(e) = handle_connection(stream, self.detector.as_ref()) {
                        eprintln!("bridge: connection error: {}", e);
                    }
                }
                Err(e) => {
                    eprintln!("bridge: accept failed: {}", e);
                }
            }
        }
    }

    /// Run `serve` on a named background thread
    pub fn spawn(self) -> JoinHandle<()> {
        thread::Builder::new()
            .name("bridge-http".to_string())
            .spawn(move || self.serve())
            .expect("Failed to spawn bridge-http thread")
    }
}

fn handle_connection(mut stream: TcpStream, detector: &dyn Detector) -> io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT_SECS)))?;
    stream.set_write_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT_SECS)))?;

    // Read up to the end of the headers
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        if let Some(pos) = find_bytes(&buf, b"\r\n\r\n", 0) {
            break pos + 4;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return write_json(
                &mut stream,
                400,
                "Bad Request",
                &ErrorResponse::new("request head too large"),
            );
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            // Client went away before sending a full request
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or_default().to_string();
    let target = request_parts.next().unwrap_or_default().to_string();
    let path = target.split('?').next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut content_type = String::new();
    for line in lines {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if key.eq_ignore_ascii_case("content-length") {
            content_length = value.parse().unwrap_or(0);
        } else if key.eq_ignore_ascii_case("content-type") {
            content_type = value.to_string();
        }
    }

    if path != ANALYZE_ROUTE {
        return write_json(&mut stream, 404, "Not Found", &ErrorResponse::new("not found"));
    }
    if method != "POST" {
        return write_json(
            &mut stream,
            405,
            "Method Not Allowed",
            &ErrorResponse::new("method not allowed"),
        );
    }
    if content_length > MAX_UPLOAD_BYTES {
        return write_json(
            &mut stream,
            413,
            "Payload Too Large",
            &ErrorResponse::new("upload too large"),
        );
    }

    // Read the rest of the body
    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    let Some(boundary) = multipart::boundary_from_content_type(&content_type) else {
        return write_json(
            &mut stream,
            400,
            "Bad Request",
            &ErrorResponse::new("expected multipart/form-data"),
        );
    };

    let file = multipart::parse(&body, &boundary)
        .into_iter()
        .find(|p| p.name == UPLOAD_FIELD && p.filename.is_some());
    let Some(file) = file else {
        return write_json(
            &mut stream,
            400,
            "Bad Request",
            &ErrorResponse::new("no audio file provided"),
        );
    };

    let filename = file.filename.unwrap_or_else(|| "audio".to_string());
    let clip = AudioClip::from_bytes(filename.clone(), file.data);

    match detector.submit(&clip) {
        Ok(detection) => {
            let response = AnalyzeResponse::from_detection(detection, &filename);
            write_json(&mut stream, 200, "OK", &response)
        }
        Err(AppError::Analysis(AnalysisError::Input(msg))) => {
            write_json(&mut stream, 400, "Bad Request", &ErrorResponse::new(msg))
        }
        Err(e) => write_json(
            &mut stream,
            500,
            "Internal Server Error",
            &ErrorResponse::with_details(
                "failed to communicate with detection backend",
                e.to_string(),
            ),
        ),
    }
}

fn write_json<T: Serialize>(
    stream: &mut TcpStream,
    status: u16,
    reason: &str,
    body: &T,
) -> io::Result<()> {
    let payload = serde_json::to_vec(body)
        .unwrap_or_else(|_| b"{\"error\":\"response serialization failed\"}".to_vec());
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        payload.len()
    );
    stream.write_all(head.as_bytes())?;
    stream.write_all(&payload)?;
    stream.flush()
}
