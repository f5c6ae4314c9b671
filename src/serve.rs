//! Preview server with rebuild-on-change.
//!
//! `serve` runs one full build up front (a broken site should fail loudly,
//! not serve stale pages), then splits into two halves:
//!
//! - a background thread serving the dist directory over HTTP;
//! - the foreground loop watching the site inputs and re-running the
//!   whole build on every change.
//!
//! Rebuilds are full builds, same as `build`. A failed rebuild is reported
//! and the loop keeps going; the last good site stays served. Editors fire
//! bursts of filesystem events per save, so events are debounced before
//! triggering a rebuild.

use crate::engine::{Engine, EngineError};
use crate::output;
use axum::Router;
use notify::event::EventKind;
use notify::{recommended_watcher, RecursiveMode, Watcher};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use thiserror::Error;
use tower_http::services::ServeDir;

const DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Error, Debug)]
pub enum ServeError {
    #[error(transparent)]
    Build(#[from] EngineError),
    #[error("watch: {0}")]
    Watch(#[from] notify::Error),
    #[error("serve: {0}")]
    Io(#[from] io::Error),
}

/// Build, serve, and rebuild until interrupted.
pub fn serve(engine: Engine, port: u16) -> Result<(), ServeError> {
    let pages = engine.run()?;
    output::print_build_report(&pages, engine.dist());

    let (tx, rx) = mpsc::channel();
    let mut watcher = recommended_watcher(move |res| {
        let _ = tx.send(res);
    })?;
    for path in engine.watch_paths() {
        watcher.watch(&path, RecursiveMode::Recursive)?;
    }

    let addr = format!("127.0.0.1:{port}");
    println!("{}", output::format_serve_banner(&addr, engine.dist()));
    let dist = engine.dist().to_path_buf();
    let server_addr = addr.clone();
    std::thread::spawn(move || {
        if let Err(e) = serve_dist(dist, server_addr) {
            eprintln!("server stopped: {e}");
        }
    });

    rebuild_loop(&engine, &rx);
    Ok(())
}

/// Watch events until the watcher goes away, rebuilding after each
/// debounced burst of relevant changes.
fn rebuild_loop(engine: &Engine, rx: &mpsc::Receiver<notify::Result<notify::Event>>) {
    while let Ok(event) = rx.recv() {
        if !is_relevant(&event) {
            continue;
        }
        // Absorb the rest of the burst.
        while rx.recv_timeout(DEBOUNCE).is_ok() {}

        match engine.run() {
            Ok(pages) => output::print_build_report(&pages, engine.dist()),
            Err(e) => eprintln!("{}", output::format_rebuild_failure(&e)),
        }
    }
}

/// Content changes trigger rebuilds; access-time noise does not.
fn is_relevant(event: &notify::Result<notify::Event>) -> bool {
    match event {
        Ok(event) => matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ),
        // A broken watcher is worth a rebuild attempt rather than silence.
        Err(_) => true,
    }
}

fn serve_dist(dist: PathBuf, addr: String) -> Result<(), ServeError> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let app = Router::new().fallback_service(ServeDir::new(&dist));
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app)
            .await
            .map_err(ServeError::from)
    })
}
