//! The single-page web UI: a sidebar of controls and a main panel that shows
//! notices and the output of the last action.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use minijinja::Environment;
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::classify::{self, ClassifierSettings};
use crate::config::AnalyzerConfig;
use crate::dataset::Dataset;
use crate::download::{self, DownloadSettings};
use crate::error::{AnalyzerError, Result};
use crate::feedback::{Feedback, Notice};
use crate::search::{self, SearchResult};

pub const TEMPLATE_DIR: &str = "templates";
pub const STATIC_DIR: &str = "static";
const PAGE_TITLE: &str = "Cloud Document Analyzer";
const UPLOAD_PROMPT: &str = "Please upload your arxiv_dataset.csv file to begin.";
const NO_MATCHES: &str = "No matching documents found.";

#[derive(Debug, Clone)]
struct Session {
    dataset: Option<Arc<Dataset>>,
    file_name: Option<String>,
    keyword: String,
    limit: usize,
}

/// Shared per-server state; the session holds the uploaded dataset and the
/// last-used search controls.
#[derive(Clone)]
pub struct AppState {
    config: Arc<AnalyzerConfig>,
    session: Arc<RwLock<Session>>,
}

impl AppState {
    pub fn new(config: AnalyzerConfig) -> Self {
        let session = Session {
            dataset: None,
            file_name: None,
            keyword: config.default_keyword.clone(),
            limit: config.clamp_limit(config.default_limit),
        };
        Self {
            config: Arc::new(config),
            session: Arc::new(RwLock::new(session)),
        }
    }

    fn session(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_session(&self, update: impl FnOnce(&mut Session)) {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut session);
    }
}

type SharedState = (AppState, Arc<Environment<'static>>);

/// What the main panel shows below the notices.
enum View {
    Empty,
    Search(Vec<SearchResult>),
    Sorted(Value),
    Report(String),
}

pub fn build_template_env(template_dir: &Path) -> Environment<'static> {
    let mut env = Environment::new();
    env.add_function("url_for", |endpoint: String, filename: Option<String>| {
        if endpoint == "static" {
            match filename {
                Some(name) => format!("/static/{name}"),
                None => "/static".to_string(),
            }
        } else {
            format!("/{endpoint}")
        }
    });
    env.set_loader(minijinja::path_loader(template_dir));
    env
}

pub fn build_router(state: AppState) -> Router {
    let env = build_template_env(Path::new(TEMPLATE_DIR));
    let upload_limit = state.config.upload_limit_bytes;
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/search", post(search))
        .route("/sort", post(sort))
        .route("/classify", post(classify))
        .route("/health", get(health_check))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state((state, Arc::new(env)))
}

pub async fn run(config: AnalyzerConfig, host: &str, port: u16) -> Result<()> {
    let app = build_router(AppState::new(config));
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(AnalyzerError::Server)?;
    info!("serving on http://{addr}");
    axum::serve(listener, app)
        .await
        .map_err(AnalyzerError::Server)
}

fn render_page(
    state: &AppState,
    env: &Environment<'static>,
    notices: Vec<Notice>,
    view: View,
) -> Result<Html<String>> {
    let session = state.session();
    let summary = session.dataset.as_ref().map(|dataset| dataset.summary());
    let mut ctx = json!({
        "page_title": PAGE_TITLE,
        "uploaded": session.dataset.is_some(),
        "upload_prompt": UPLOAD_PROMPT,
        "file_name": session.file_name,
        "keyword": session.keyword,
        "limit": session.limit,
        "max_limit": state.config.max_limit,
        "summary": summary,
        "notices": notices,
        "view": "empty",
    });
    if let Some(obj) = ctx.as_object_mut() {
        match view {
            View::Empty => {}
            View::Search(results) => {
                obj.insert("view".into(), json!("search"));
                obj.insert("no_results_message".into(), json!(NO_MATCHES));
                obj.insert("results".into(), serde_json::to_value(results)?);
            }
            View::Sorted(rows) => {
                obj.insert("view".into(), json!("sorted"));
                obj.insert("sorted_rows".into(), rows);
            }
            View::Report(report_json) => {
                obj.insert("view".into(), json!("report"));
                obj.insert("report_json".into(), json!(report_json));
            }
        }
    }
    let template = env.get_template("main.html")?;
    Ok(Html(template.render(&ctx)?))
}

fn respond(
    state: &AppState,
    env: &Environment<'static>,
    notices: Vec<Notice>,
    view: View,
) -> Response {
    match render_page(state, env, notices, view) {
        Ok(html) => html.into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

/// Dataset for an action, or a warning asking for an upload.
fn require_dataset(state: &AppState, feedback: &mut Feedback) -> Option<Arc<Dataset>> {
    let dataset = state.session().dataset;
    if dataset.is_none() {
        feedback.warning(UPLOAD_PROMPT);
    }
    dataset
}

async fn index(State((state, env)): State<SharedState>) -> Response {
    respond(&state, &env, Vec::new(), View::Empty)
}

async fn read_upload(
    multipart: &mut Multipart,
) -> std::result::Result<Option<(String, Vec<u8>)>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|err| err.to_string())? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field.bytes().await.map_err(|err| err.to_string())?;
        return Ok(Some((file_name, bytes.to_vec())));
    }
    Ok(None)
}

async fn upload(State((state, env)): State<SharedState>, mut multipart: Multipart) -> Response {
    let mut feedback = Feedback::new();
    match read_upload(&mut multipart).await {
        Ok(Some((file_name, bytes))) => match Dataset::from_bytes(&bytes) {
            Ok(dataset) => {
                feedback.info(format!(
                    "Loaded {} documents from {file_name} ({} incomplete rows dropped)",
                    dataset.len(),
                    dataset.dropped()
                ));
                state.update_session(|session| {
                    session.dataset = Some(Arc::new(dataset));
                    session.file_name = Some(file_name);
                });
            }
            Err(err) => feedback.error(format!("Could not load {file_name}: {err}")),
        },
        Ok(None) => feedback.warning("No file was attached to the upload."),
        Err(err) => feedback.error(format!("Upload failed: {err}")),
    }
    respond(&state, &env, feedback.into_notices(), View::Empty)
}

async fn search(
    State((state, env)): State<SharedState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let keyword = form
        .get("keyword")
        .cloned()
        .unwrap_or_else(|| state.config.default_keyword.clone());
    let limit = form
        .get("limit")
        .and_then(|value| value.trim().parse::<usize>().ok())
        .map(|value| state.config.clamp_limit(value))
        .unwrap_or_else(|| state.config.clamp_limit(state.config.default_limit));
    state.update_session(|session| {
        session.keyword = keyword.clone();
        session.limit = limit;
    });

    let mut feedback = Feedback::new();
    let Some(dataset) = require_dataset(&state, &mut feedback) else {
        return respond(&state, &env, feedback.into_notices(), View::Empty);
    };

    let settings = DownloadSettings::from(state.config.as_ref());
    let radius = state.config.snippet_radius;
    let outcome = tokio::task::spawn_blocking(move || {
        let documents = download::download_pdfs(&dataset, limit, &settings, &mut feedback);
        let results = documents
            .map(|docs| search::search_keyword_in_pdfs(&docs, &keyword, radius, &mut feedback));
        (results, feedback)
    })
    .await;

    match outcome {
        Ok((Ok(results), feedback)) => {
            respond(&state, &env, feedback.into_notices(), View::Search(results))
        }
        Ok((Err(err), mut feedback)) => {
            feedback.error(format!("Search failed: {err}"));
            respond(&state, &env, feedback.into_notices(), View::Empty)
        }
        Err(err) => {
            warn!(error = %err, "search task failed");
            let mut feedback = Feedback::new();
            feedback.error(format!("Search failed: {err}"));
            respond(&state, &env, feedback.into_notices(), View::Empty)
        }
    }
}

async fn sort(State((state, env)): State<SharedState>) -> Response {
    let mut feedback = Feedback::new();
    let Some(dataset) = require_dataset(&state, &mut feedback) else {
        return respond(&state, &env, feedback.into_notices(), View::Empty);
    };
    let rows: Vec<Value> = dataset
        .sorted_by_title(state.config.preview_rows)
        .into_iter()
        .map(|row| json!({ "title": row.title, "category": row.category }))
        .collect();
    respond(&state, &env, feedback.into_notices(), View::Sorted(Value::Array(rows)))
}

async fn classify(State((state, env)): State<SharedState>) -> Response {
    let mut feedback = Feedback::new();
    let Some(dataset) = require_dataset(&state, &mut feedback) else {
        return respond(&state, &env, feedback.into_notices(), View::Empty);
    };

    let settings = ClassifierSettings::from(state.config.as_ref());
    let outcome = tokio::task::spawn_blocking(move || {
        classify::classify_documents(&dataset, &settings)
    })
    .await
    .unwrap_or_else(|err| Err(AnalyzerError::Classifier(format!("training task failed: {err}"))))
    .and_then(|report| report.to_pretty_json().map_err(AnalyzerError::from));

    match outcome {
        Ok(report_json) => {
            respond(&state, &env, feedback.into_notices(), View::Report(report_json))
        }
        Err(err) => {
            feedback.error(format!("Classifier failed: {err}"));
            respond(&state, &env, feedback.into_notices(), View::Empty)
        }
    }
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
