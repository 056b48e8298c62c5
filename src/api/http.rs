use crate::config::Config;
use crate::error::{Result, VizError};
use crate::labels::load_labels;
use crate::report::render_markdown_page;
use crate::scan::{load_attempt, scan_attempts};
use crate::api::types::*;
use axum::{
    body::Body,
    extract::{Path as UrlPath, Request, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// HTTP server exposing scanned attempts and the static result files
pub struct VizServer {
    config: Arc<Config>,
}

impl VizServer {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Run the HTTP server until `shutdown` resolves
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = router(Arc::clone(&self.config));
        let addr = self.config.bind_addr();

        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            let msg = if e.kind() == std::io::ErrorKind::AddrInUse {
                format!(
                    "Port {} is already in use. Pass a different port as the first argument or set {}.",
                    self.config.server.port,
                    crate::config::PORT_ENV
                )
            } else {
                format!("Failed to bind to {}: {}", addr, e)
            };
            VizError::Io(std::io::Error::new(e.kind(), msg))
        })?;

        log::info!("Serving attempt visualizer on http://{}", addr);
        log::info!("Results root: {}", self.config.results_root().display());

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                VizError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("HTTP server error: {}", e),
                ))
            })?;

        log::info!("Server stopped");
        Ok(())
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// Build the axum router. Public so tests and embedders can drive it directly.
pub fn router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/api/attempts", get(handle_list_attempts))
        .route("/api/attempt/:id", get(handle_attempt_detail))
        .route("/api/labels", get(handle_labels))
        .route("/health", get(handle_health))
        .fallback(handle_static)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { config })
}

impl IntoResponse for VizError {
    fn into_response(self) -> Response {
        let status = match &self {
            VizError::NotFound(_) => StatusCode::NOT_FOUND,
            VizError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Run filesystem work off the async reactor.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        VizError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("scan task failed: {}", e),
        ))
    })?
}

/// `GET /api/attempts`
async fn handle_list_attempts(State(state): State<AppState>) -> Result<Json<Vec<AttemptSummary>>> {
    let root = state.config.results_root().to_path_buf();
    let summaries: Vec<AttemptSummary> = blocking(move || {
        let attempts = scan_attempts(&root)?;
        Ok(attempts.iter().map(AttemptSummary::from_attempt).collect())
    })
    .await?;
    Ok(Json(summaries))
}

/// `GET /api/attempt/{id}`
async fn handle_attempt_detail(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<AttemptDetail>> {
    let root = state.config.results_root().to_path_buf();
    let detail = blocking(move || {
        let attempt = load_attempt(&root, &id)?;
        Ok(AttemptDetail::from_attempt(&attempt))
    })
    .await?;
    Ok(Json(detail))
}

/// `GET /api/labels`
async fn handle_labels(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let dir = state.config.labels_dir().to_path_buf();
    let labels = blocking(move || load_labels(&dir)).await?;
    Ok(Json(serde_json::to_value(labels)?))
}

/// `GET /health`
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Resolve a URL path to a file under `root`, refusing anything that could
/// step outside it.
pub fn resolve_under_root(root: &Path, url_path: &str) -> Result<PathBuf> {
    let decoded = urlencoding::decode(url_path)
        .map_err(|_| VizError::InvalidInput(format!("Path is not valid UTF-8: {}", url_path)))?;
    if decoded.contains('\0') {
        return Err(VizError::InvalidInput("Path contains a NUL byte".to_string()));
    }
    let relative = decoded.trim_start_matches('/');

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => {
                return Err(VizError::InvalidInput(
                    "Path traversal not allowed".to_string(),
                ))
            }
        }
    }
    Ok(resolved)
}

/// Markdown reports are rendered to HTML; everything else is a static file
/// from the results root, then the visualizer directory.
async fn handle_static(State(state): State<AppState>, uri: Uri, req: Request) -> Response {
    if uri.path().ends_with(".md") {
        return match render_markdown(&state.config, uri.path()).await {
            Ok(page) => page.into_response(),
            Err(e) => e.into_response(),
        };
    }

    let results = ServeDir::new(state.config.results_root());
    let served = match &state.config.results.web_root {
        Some(web) => results
            .fallback(ServeDir::new(web))
            .oneshot(req)
            .await
            .map(|res| res.map(Body::new)),
        None => results.oneshot(req).await.map(|res| res.map(Body::new)),
    };

    match served {
        Ok(res) => res,
        Err(never) => match never {},
    }
}

async fn render_markdown(config: &Config, url_path: &str) -> Result<Response> {
    let path = resolve_under_root(config.results_root(), url_path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let markdown = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| VizError::from_read(e, &format!("Markdown file {}", url_path)))?;

    Ok(Html(render_markdown_page(&markdown, &file_name)).into_response())
}
