//! Minimal `std::net` static file server and JSON-RPC-over-HTTP wrapper
//! around the tool host, used by `loko serve` and `loko mcp --transport http`.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

use loko_core::cancel::CancelToken;
use loko_core::rpc::ToolHost;

const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Serves the static files under `root` on `127.0.0.1:port` until
/// `cancel` is observed.
pub fn serve_static(root: &Path, port: u16, cancel: &CancelToken) -> std::io::Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", port))?;
    listener.set_nonblocking(true)?;
    println!("serving {} on http://127.0.0.1:{port}", root.display());

    while !cancel.is_cancelled() {
        match listener.accept() {
            Ok((stream, _)) => {
                let root = root.to_path_buf();
                std::thread::spawn(move || {
                    let _ = handle_static_connection(stream, &root);
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(POLL_TIMEOUT);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Serves the JSON-RPC tool host on `127.0.0.1:port`: a single `POST /`
/// with a JSON-RPC request body returns the JSON-RPC response body.
pub fn serve_api(host: &ToolHost, port: u16, cancel: &CancelToken) -> std::io::Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", port))?;
    listener.set_nonblocking(true)?;
    println!("tool host listening on http://127.0.0.1:{port}");

    while !cancel.is_cancelled() {
        match listener.accept() {
            Ok((stream, _)) => {
                let _ = handle_api_connection(stream, host);
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(POLL_TIMEOUT);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn handle_static_connection(stream: TcpStream, root: &Path) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut stream = reader.into_inner();

    let path = request_line
        .split_whitespace()
        .nth(1)
        .map(|p| p.trim_start_matches('/'))
        .unwrap_or("");
    let requested = if path.is_empty() { "index.html" } else { path };

    match resolve_path(root, requested) {
        Some(file_path) if file_path.is_file() => {
            let body = std::fs::read(&file_path)?;
            let content_type = content_type_for(&file_path);
            write_response(&mut stream, 200, "OK", content_type, &body)
        }
        _ => write_response(&mut stream, 404, "Not Found", "text/plain", b"not found"),
    }
}

fn handle_api_connection(stream: TcpStream, host: &ToolHost) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header)?;
        if header.trim().is_empty() {
            break;
        }
        if let Some(value) = header.strip_prefix("Content-Length:").or_else(|| header.strip_prefix("content-length:")) {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    let mut stream = reader.into_inner();
    let body_text = String::from_utf8_lossy(&body);
    let response_body = match serde_json::from_str(&body_text) {
        Ok(req) => serde_json::to_string(&host.dispatch(&req)).unwrap_or_default(),
        Err(_) => serde_json::json!({
            "jsonrpc": "2.0",
            "id": serde_json::Value::Null,
            "error": { "code": -32700, "message": "invalid JSON" }
        })
        .to_string(),
    };
    write_response(&mut stream, 200, "OK", "application/json", response_body.as_bytes())
}

/// Rejects any path segment that would escape `root` (`..`, absolute
/// paths) before joining.
fn resolve_path(root: &Path, requested: &str) -> Option<PathBuf> {
    let mut joined = root.to_path_buf();
    for segment in requested.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            return None;
        }
        joined.push(segment);
    }
    Some(joined)
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("svg") => "image/svg+xml",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn write_response(stream: &mut TcpStream, code: u16, reason: &str, content_type: &str, body: &[u8]) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {code} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )?;
    stream.write_all(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_rejects_traversal() {
        let root = Path::new("/srv/dist");
        assert!(resolve_path(root, "../etc/passwd").is_none());
        assert_eq!(resolve_path(root, "diagrams/a.svg").unwrap(), root.join("diagrams").join("a.svg"));
    }

    #[test]
    fn content_type_matches_extension() {
        assert_eq!(content_type_for(Path::new("x.html")), "text/html; charset=utf-8");
        assert_eq!(content_type_for(Path::new("x.unknown")), "application/octet-stream");
    }
}
