//! HTTP response handlers.

use crate::utils::mime::{self, types};
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Respond with a file from disk.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body)
}

/// Respond with a JSON document.
pub fn respond_json(request: Request, value: &serde_json::Value) -> Result<()> {
    let body = serde_json::to_vec(value)?;
    send_body(request, 200, types::JSON, body)
}

/// Respond with a build failure (500) carrying the full error chain.
pub fn respond_build_error(request: Request, error: &anyhow::Error) -> Result<()> {
    let body = format!("500 Bundle Build Failed\n\n{error:#}\n");
    send_body(request, 500, types::PLAIN, body.into_bytes())
}

pub fn respond_no_content(request: Request) -> Result<()> {
    request.respond(Response::empty(StatusCode(204)))?;
    Ok(())
}

pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    send_body(
        request,
        405,
        types::PLAIN,
        b"405 Method Not Allowed".to_vec(),
    )
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(
        request,
        503,
        types::PLAIN,
        b"503 Service Unavailable".to_vec(),
    )
}

pub fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let mut response = Response::empty(StatusCode(status));
    if let Some(header) = make_header("Content-Type", content_type) {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let mut response = Response::from_data(body).with_status_code(StatusCode(status));
    if let Some(header) = make_header("Content-Type", content_type) {
        response.add_header(header);
    }
    if let Some(header) = make_header("Cache-Control", "no-cache") {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Option<Header> {
    Header::from_bytes(key, value).ok()
}
