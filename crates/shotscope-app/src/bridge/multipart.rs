//! Multipart form parsing
//!
//! Minimal multipart/form-data support for the bridge endpoint: enough to
//! pull file parts out of a browser or reqwest upload. Parts are split on
//! the full CRLF-prefixed boundary, so binary payloads pass through intact.

/// One part of a multipart body
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Form field name
    pub name: String,
    /// Client-supplied filename; present only for file parts
    pub filename: Option<String>,
    /// Raw part content
    pub data: Vec<u8>,
}

/// Find a byte pattern starting at an offset
pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Extract the boundary token from a Content-Type header value.
///
/// Returns None unless the value is multipart/form-data with a boundary.
pub fn boundary_from_content_type(value: &str) -> Option<String> {
    if !value.to_ascii_lowercase().contains("multipart/form-data") {
        return None;
    }
    value.split(';').map(str::trim).find_map(|param| {
        let lower = param.to_ascii_lowercase();
        if lower.starts_with("boundary=") {
            Some(param["boundary=".len()..].trim_matches('"').to_string())
        } else {
            None
        }
    })
}

/// Parse a multipart/form-data body into its parts.
///
/// Malformed bodies yield however many well-formed parts precede the
/// damage; the caller treats a missing expected part as a bad request.
pub fn parse(body: &[u8], boundary: &str) -> Vec<FilePart> {
    let first = format!("--{}", boundary);
    let delim = format!("\r\n--{}", boundary);
    let mut parts = Vec::new();

    let Some(start) = find_bytes(body, first.as_bytes(), 0) else {
        return parts;
    };
    let mut pos = start + first.len();

    loop {
        // `--` after a boundary closes the body
        if body[pos..].starts_with(b"--") {
            break;
        }
        if body[pos..].starts_with(b"\r\n") {
            pos += 2;
        } else {
            break;
        }

        let Some(header_end) = find_bytes(body, b"\r\n\r\n", pos) else {
            break;
        };
        let headers = &body[pos..header_end];
        let content_start = header_end + 4;

        // Part content runs to the CRLF that precedes the next boundary
        let Some(next) = find_bytes(body, delim.as_bytes(), content_start) else {
            break;
        };
        if let Some(part) = part_from(headers, &body[content_start..next]) {
            parts.push(part);
        }
        pos = next + delim.len();
    }

    parts
}

fn part_from(headers: &[u8], data: &[u8]) -> Option<FilePart> {
    let headers = String::from_utf8_lossy(headers);
    for line in headers.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("content-disposition") {
            let name = disposition_attr(value, "name")?;
            let filename = disposition_attr(value, "filename");
            return Some(FilePart {
                name,
                filename,
                data: data.to_vec(),
            });
        }
    }
    None
}

fn disposition_attr(value: &str, key: &str) -> Option<String> {
    let prefix = format!("{}=", key);
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix(prefix.as_str()))
        .map(|v| v.trim_matches('"').to_string())
}
