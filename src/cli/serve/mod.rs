//! Development server that builds bundles on request.
//!
//! Routing:
//! - `GET /__bundles/emit/<name>` -> emit list as JSON
//! - `POST /__bundles/invalidate/<name>` -> force the next build
//! - a path naming a bundle -> build (if changed), then serve the artifact
//! - anything else -> static file under the source root, or 404

mod lifecycle;
mod path;
mod response;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tiny_http::{Method, Request, Server};

use crate::builder::Builder;
use crate::config::{BundleConfig, Env};
use crate::{debug, log};
use path::Route;

/// Shared request-handling state.
struct ServeState {
    builder: Builder,
}

/// What a request resolves to, before touching the connection.
#[derive(Debug)]
enum Reply {
    File(PathBuf),
    Json(serde_json::Value),
    BuildFailed(anyhow::Error),
    NoContent,
    NotFound,
    MethodNotAllowed,
}

/// Bind, then serve until Ctrl+C.
pub fn serve(config: &BundleConfig) -> Result<()> {
    let state = Arc::new(ServeState {
        builder: Builder::from_config(config)?,
    });

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    crate::core::register_server(Arc::clone(&server));

    log!("serve"; "http://{} ({}, {} bundles)", addr, config.build.env, state.builder.registry().len());
    run_request_loop(&server, &state)
}

fn run_request_loop(server: &Server, state: &Arc<ServeState>) -> Result<()> {
    // Requests that trigger builds must not block static files
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .thread_name(|i| format!("serve-{i}"))
        .build()
        .context("failed to create request pool")?;

    for request in server.incoming_requests() {
        let state = Arc::clone(state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {e:#}");
            }
        });
    }
    Ok(())
}

fn handle_request(request: Request, state: &ServeState) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    debug!("serve"; "{} {}", request.method(), request.url());
    let env = crate::config::cfg().build.env;
    match dispatch(state, env, request.method(), request.url()) {
        Reply::File(path) => response::respond_file(request, &path),
        Reply::Json(value) => response::respond_json(request, &value),
        Reply::BuildFailed(error) => response::respond_build_error(request, &error),
        Reply::NoContent => response::respond_no_content(request),
        Reply::NotFound => response::respond_not_found(request),
        Reply::MethodNotAllowed => response::respond_method_not_allowed(request),
    }
}

fn dispatch(state: &ServeState, env: Env, method: &Method, url: &str) -> Reply {
    let registry = state.builder.registry();

    match Route::parse(url) {
        Route::Emit(name) => {
            let refs = state.builder.emitter(env).emit(&name);
            Reply::Json(serde_json::json!(refs))
        }
        Route::Invalidate(_) if *method != Method::Post => Reply::MethodNotAllowed,
        Route::Invalidate(name) => match state.builder.invalidate(&name) {
            Ok(()) => Reply::NoContent,
            Err(_) => Reply::NotFound,
        },
        Route::Path(_) if !matches!(method, Method::Get | Method::Head) => Reply::MethodNotAllowed,
        Route::Path(name) => match registry.get(&name) {
            Some(bundle) => match state.builder.build(&name) {
                Ok(_) => Reply::File(bundle.output_path().to_path_buf()),
                Err(e) => {
                    log!("error"; "{}: {}", name, e);
                    Reply::BuildFailed(anyhow::Error::new(e))
                }
            },
            None => path::resolve_path(&name, registry.src_root())
                .map_or(Reply::NotFound, Reply::File),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Registry;
    use crate::config::BundleDefinitions;
    use crate::fetch::testing::StaticFetcher;
    use crate::persist::Persister;
    use crate::pipeline::Pipeline;
    use std::fs;
    use tempfile::TempDir;

    fn state() -> (TempDir, ServeState) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.html"), "<a>").unwrap();
        fs::write(dir.path().join("b.html"), "<b>").unwrap();
        fs::write(dir.path().join("robots.txt"), "ok").unwrap();

        let mut defs = BundleDefinitions::new();
        defs.insert("page.html".into(), vec!["a.html".into(), "b.html".into()]);
        defs.insert("broken.html".into(), vec!["missing.html".into()]);
        let registry = Registry::register(&defs, dir.path()).unwrap();
        let builder = Builder::new(
            Arc::new(registry),
            Pipeline::new(),
            Persister::default(),
            Arc::new(StaticFetcher::new()),
        );
        (dir, ServeState { builder })
    }

    #[test]
    fn test_bundle_request_builds_first() {
        let (dir, state) = state();
        match dispatch(&state, Env::Production, &Method::Get, "/page.html?v=1") {
            Reply::File(path) => assert_eq!(path, dir.path().join("page.html")),
            other => panic!("unexpected reply: {other:?}"),
        }
        assert_eq!(
            fs::read_to_string(dir.path().join("page.html")).unwrap(),
            "<a>\n<b>"
        );
    }

    #[test]
    fn test_build_failure_is_500() {
        let (_dir, state) = state();
        match dispatch(&state, Env::Production, &Method::Get, "/broken.html") {
            Reply::BuildFailed(error) => assert!(format!("{error:#}").contains("missing.html")),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_static_and_missing_files() {
        let (_dir, state) = state();
        assert!(matches!(
            dispatch(&state, Env::Production, &Method::Get, "/robots.txt"),
            Reply::File(_)
        ));
        assert!(matches!(
            dispatch(&state, Env::Production, &Method::Get, "/nope.txt"),
            Reply::NotFound
        ));
        assert!(matches!(
            dispatch(&state, Env::Production, &Method::Get, "/../secret"),
            Reply::NotFound
        ));
    }

    #[test]
    fn test_emit_endpoint() {
        let (_dir, state) = state();
        match dispatch(&state, Env::Development, &Method::Get, "/__bundles/emit/page.html") {
            Reply::Json(value) => assert_eq!(value, serde_json::json!(["a.html", "b.html"])),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_invalidate_endpoint() {
        let (_dir, state) = state();
        assert!(matches!(
            dispatch(&state, Env::Production, &Method::Get, "/__bundles/invalidate/page.html"),
            Reply::MethodNotAllowed
        ));
        assert!(matches!(
            dispatch(&state, Env::Production, &Method::Post, "/__bundles/invalidate/page.html"),
            Reply::NoContent
        ));
        assert!(matches!(
            dispatch(&state, Env::Production, &Method::Post, "/__bundles/invalidate/missing.js"),
            Reply::NotFound
        ));
    }
}
