//! JSON-RPC over HTTP
//!
//! One session, one connection at a time. Every connection gets a read
//! timeout and a body cap so a stalled or oversized client cannot wedge the
//! accept loop.

use crate::app::IcebergApp;
use crate::mcp;
use anyhow::{bail, Result};
use serde_json::Value;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

pub const READ_TIMEOUT: Duration = Duration::from_secs(5);
pub const MAX_BODY_BYTES: usize = 64 * 1024;
const MAX_HEADER_LINE: u64 = 8 * 1024;
const MAX_HEADERS: usize = 64;

/// Accept loop; per-connection failures are logged and the loop continues
pub fn run(app: &mut IcebergApp, port: u16) -> Result<()> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", port))?;
    tracing::info!("Listening on http://localhost:{}/rpc", port);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(e) = serve_connection(&stream, app, READ_TIMEOUT) {
                    tracing::warn!("Request error: {}", e);
                }
            }
            Err(e) => tracing::warn!("Accept failed: {}", e),
        }
    }

    Ok(())
}

/// Handle one request on an accepted connection
pub fn serve_connection(
    stream: &TcpStream,
    app: &mut IcebergApp,
    timeout: Duration,
) -> Result<()> {
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    handle_exchange(BufReader::new(stream), stream, app)
}

/// Read one HTTP request from `reader`, answer it on `writer`
pub fn handle_exchange<R, W>(mut reader: R, mut writer: W, app: &mut IcebergApp) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    if read_line(&mut reader)?.is_none() {
        bail!("connection closed before request line");
    }

    let mut content_length: usize = 0;
    let mut headers = 0;
    loop {
        let Some(header) = read_line(&mut reader)? else {
            bail!("connection closed while reading headers");
        };
        if header.trim().is_empty() {
            break;
        }
        headers += 1;
        if headers > MAX_HEADERS {
            bail!("more than {} headers", MAX_HEADERS);
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    if content_length > MAX_BODY_BYTES {
        tracing::warn!("Rejecting {} byte request body", content_length);
        let error = mcp::error_response(
            Value::Null,
            mcp::INVALID_REQUEST,
            &format!("Request body exceeds {} bytes", MAX_BODY_BYTES),
        );
        return write_response(&mut writer, "413 Payload Too Large", &error);
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    let response = match serde_json::from_slice::<Value>(&body) {
        Ok(request) => mcp::handle_request(app, &request),
        Err(e) => {
            tracing::debug!("Unparseable request body: {}", e);
            mcp::error_response(Value::Null, mcp::PARSE_ERROR, &format!("Parse error: {}", e))
        }
    };
    write_response(&mut writer, "200 OK", &response)
}

/// One line, capped at `MAX_HEADER_LINE` bytes; `None` on EOF
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = reader.by_ref().take(MAX_HEADER_LINE).read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    if !line.ends_with('\n') && read as u64 == MAX_HEADER_LINE {
        bail!("header line longer than {} bytes", MAX_HEADER_LINE);
    }
    Ok(Some(line))
}

fn write_response<W: Write>(writer: &mut W, status: &str, body: &Value) -> Result<()> {
    let body = serde_json::to_string(body)?;
    write!(
        writer,
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
         Access-Control-Allow-Origin: *\r\n\r\n{}",
        status,
        body.len(),
        body
    )?;
    writer.flush()?;
    Ok(())
}
