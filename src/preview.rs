//! Local preview of a downloaded build archive.

use std::fs::File;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Unpacks `archive` into `dest`, returning the number of entries.
pub fn extract_archive(archive: &Path, dest: &Path) -> anyhow::Result<usize> {
    let file = File::open(archive).with_context(|| format!("open archive: {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("read archive: {}", archive.display()))?;
    let entries = zip.len();
    zip.extract(dest)
        .with_context(|| format!("extract archive into {}", dest.display()))?;
    Ok(entries)
}

/// Built HTML lives under `_build/html`, either at the archive root or inside
/// a single top-level folder. Falls back to `dir` itself.
pub fn site_root(dir: &Path) -> anyhow::Result<PathBuf> {
    let direct = dir.join("_build").join("html");
    if direct.is_dir() {
        return Ok(direct);
    }

    let mut children = std::fs::read_dir(dir)
        .with_context(|| format!("read dir: {}", dir.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("list dir: {}", dir.display()))?;
    children.sort_by_key(|e| e.file_name());
    for entry in children {
        let nested = entry.path().join("_build").join("html");
        if nested.is_dir() {
            return Ok(nested);
        }
    }
    Ok(dir.to_path_buf())
}

pub fn router(root: &Path) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .fallback_service(ServeDir::new(root).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
}

/// Extracts `archive` into a temporary directory and serves it until Ctrl-C.
pub async fn serve(archive: &Path, addr: SocketAddr) -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new().context("create preview dir")?;
    let entries = extract_archive(archive, temp.path())?;
    let root = site_root(temp.path())?;
    tracing::info!(entries, root = %root.display(), "archive extracted");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {addr}: {err}"))?;
    let local = listener.local_addr().context("read listener address")?;
    tracing::info!(addr = %local, "listening");
    println!("Preview at http://{local}/ (Ctrl-C to stop)");

    axum::serve(listener, router(&root))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(?err, "failed to listen for ctrl-c");
            }
        })
        .await
        .context("serve preview")?;
    Ok(())
}
