#![cfg(not(tarpaulin_include))]

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Path as AxumPath, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use log::info;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::chart::{self, ChartError, Figure};
use crate::chartspec;
use crate::dataset::{self, Table};
use crate::report;
use crate::session::{self, SessionContext};
use crate::store::CredentialStore;

/// Figures kept from a visualize submission, capped per request.
const MAX_VISUALIZE_REQUESTS: usize = 3;

/// Shared application state.
///
/// The current table can be replaced wholesale by an upload; the figure
/// cache holds visualize results transiently for the view endpoint.
pub struct AppState {
    store: CredentialStore,
    table: Mutex<Table>,
    figures: Mutex<HashMap<String, Figure>>,
}

impl AppState {
    pub fn new(store: CredentialStore, table: Table) -> Self {
        Self {
            store,
            table: Mutex::new(table),
            figures: Mutex::new(HashMap::new()),
        }
    }

    /// Cache one submission's figures, returning their ids.
    ///
    /// The cache holds exactly one submission at a time; entries from the
    /// previous one are dropped so the map cannot grow without bound.
    fn cache_figures(&self, figures: Vec<Figure>) -> Vec<String> {
        let mut cache = HashMap::new();
        let ids = figures
            .into_iter()
            .map(|figure| {
                let id = Uuid::new_v4().to_string();
                cache.insert(id.clone(), figure);
                id
            })
            .collect();
        *self.figures.lock().unwrap() = cache;
        ids
    }
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SignupForm {
    username: String,
    #[serde(default)]
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct PasswordChangeForm {
    old_password: String,
    new_password: String,
}

#[derive(Debug, Deserialize)]
struct VisualizeForm {
    requests: String,
}

/// Start the dashboard server.
///
/// Loads (or synthesizes) the dataset, builds the router, and serves
/// until the process exits.
pub async fn run(
    addr: &str,
    store: CredentialStore,
    dataset_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let table = dataset::load_dataset(dataset_path)?;
    let state = Arc::new(AppState::new(store, table));
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/login") }))
        .route("/login", get(serve_login_page).post(handle_login))
        .route("/signup", get(serve_signup_page).post(handle_signup))
        .route("/logout", get(handle_logout))
        .route("/dashboard", get(serve_dashboard))
        .route("/chart/:kind", get(serve_chart))
        .route("/profile", get(serve_profile))
        .route(
            "/change-password",
            get(serve_change_password_page).post(handle_change_password),
        )
        .route("/upload", post(handle_upload))
        .route("/report", get(download_report))
        .route("/visualize", post(handle_visualize))
        .route("/viz/:id", get(serve_cached_figure))
        .with_state(state)
}

/// Resolve the request's session cookie into a session context.
fn current_session(jar: &CookieJar) -> Option<SessionContext> {
    jar.get("session")
        .and_then(|cookie| session::validate_session(cookie.value()))
}

async fn serve_login_page() -> Html<&'static str> {
    Html(include_str!("./static/login.html"))
}

async fn serve_signup_page() -> Html<&'static str> {
    Html(include_str!("./static/signup.html"))
}

async fn serve_change_password_page() -> Html<&'static str> {
    Html(include_str!("./static/password.html"))
}

/// Handle login form submissions.
///
/// Valid credentials get a session cookie and a redirect to the
/// dashboard; invalid ones get the same message whether the username or
/// the password was wrong.
async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Form(form): axum::Form<LoginForm>,
) -> Response {
    match state.store.verify_credentials(&form.username, &form.password) {
        Ok(true) => {
            let session_id = session::create_session(&form.username);
            let cookie = Cookie::new("session", session_id);
            (jar.add(cookie), Redirect::to("/dashboard")).into_response()
        }
        Ok(false) => (StatusCode::UNAUTHORIZED, "Invalid username or password").into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error").into_response(),
    }
}

/// Handle sign-up form submissions.
async fn handle_signup(
    State(state): State<Arc<AppState>>,
    axum::Form(form): axum::Form<SignupForm>,
) -> Response {
    if form.username.is_empty() || form.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Username and password cannot be empty").into_response();
    }

    let email = if form.email.is_empty() {
        None
    } else {
        Some(form.email.as_str())
    };

    match state.store.create_user(&form.username, &form.password, email) {
        Ok(true) => Redirect::to("/login?registered=true").into_response(),
        Ok(false) => (StatusCode::BAD_REQUEST, "Username already exists").into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Registration error").into_response(),
    }
}

async fn handle_logout(jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get("session") {
        session::destroy_session(cookie.value());
    }
    (jar.remove(Cookie::from("session")), Redirect::to("/login"))
}

async fn serve_dashboard(jar: CookieJar) -> Response {
    match current_session(&jar) {
        Some(context) => {
            let page =
                include_str!("./static/dashboard.html").replace("{{username}}", &context.username);
            Html(page).into_response()
        }
        None => Redirect::to("/login").into_response(),
    }
}

/// Serve a single rendered chart of the current table as PNG.
async fn serve_chart(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    AxumPath(kind): AxumPath<String>,
) -> Response {
    if current_session(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }

    let table = state.table.lock().unwrap().clone();
    let rendered = match kind.as_str() {
        "scatter" => chart::scatter(&table),
        "bar" => chart::bar(&table),
        "line" => chart::line(&table),
        "histogram" => chart::histogram(&table),
        "boxplot" => chart::boxplot(&table),
        "heatmap" => chart::heatmap(&table),
        "best" => chart::best_visualization(&table),
        _ => return (StatusCode::NOT_FOUND, "Unknown chart type").into_response(),
    };

    match rendered {
        Ok(figure) => png_response(&figure),
        Err(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
    }
}

fn png_response(figure: &Figure) -> Response {
    match figure.to_png() {
        Ok(png) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "image/png")
            .body(Body::from(png))
            .unwrap(),
        Err(ChartError::Render(e)) => (StatusCode::INTERNAL_SERVER_ERROR, e).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn serve_profile(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let context = match current_session(&jar) {
        Some(context) => context,
        None => return Redirect::to("/login").into_response(),
    };

    let email = state
        .store
        .get_email(&context.username)
        .unwrap_or(None)
        .unwrap_or_else(|| "-".to_string());
    let member_since = state
        .store
        .get_member_since(&context.username)
        .unwrap_or(None)
        .map(|date| date.format("%b %d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string());

    let page = include_str!("./static/profile.html")
        .replace("{{username}}", &context.username)
        .replace("{{email}}", &email)
        .replace("{{member_since}}", &member_since);
    Html(page).into_response()
}

/// Handle password change for the logged-in user.
async fn handle_change_password(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Form(form): axum::Form<PasswordChangeForm>,
) -> Response {
    let context = match current_session(&jar) {
        Some(context) => context,
        None => return (StatusCode::UNAUTHORIZED, "No session found").into_response(),
    };

    match state
        .store
        .change_password(&context.username, &form.old_password, &form.new_password)
    {
        Ok(true) => (StatusCode::OK, "Password changed successfully").into_response(),
        Ok(false) => (StatusCode::BAD_REQUEST, "Current password is incorrect").into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Replace the current table with an uploaded CSV file.
///
/// Only the in-memory table changes; the dataset on disk is untouched.
async fn handle_upload(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Response {
    if current_session(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }

    let mut file_data = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (StatusCode::BAD_REQUEST, format!("Upload failed: {}", e)).into_response();
            }
        };
        if field.name() == Some("dataset") {
            file_data = match field.bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    return (StatusCode::BAD_REQUEST, format!("Upload failed: {}", e))
                        .into_response();
                }
            };
        }
    }

    if file_data.is_empty() {
        return (StatusCode::BAD_REQUEST, "No file data received").into_response();
    }

    let content = match String::from_utf8(file_data) {
        Ok(content) => content,
        Err(_) => return (StatusCode::BAD_REQUEST, "File is not valid UTF-8 CSV").into_response(),
    };

    match dataset::from_csv_str(&content) {
        Ok(table) => {
            *state.table.lock().unwrap() = table;
            Redirect::to("/dashboard").into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, format!("Failed to parse CSV: {}", e)).into_response(),
    }
}

/// Generate and download the PDF report for the current table.
async fn download_report(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if current_session(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }

    let table = state.table.lock().unwrap().clone();
    match report::generate_report(&table) {
        Ok(buffer) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, report::REPORT_MIME)
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report::REPORT_FILENAME),
            )
            .body(Body::from(buffer))
            .unwrap(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Evaluate up to three chart requests and cache the resulting figures.
///
/// Returns the cache IDs for the requests that succeeded plus the error
/// text for the ones that were rejected; figures are then fetched from
/// `/viz/:id`.
async fn handle_visualize(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Form(form): axum::Form<VisualizeForm>,
) -> Response {
    if current_session(&jar).is_none() {
        return (StatusCode::UNAUTHORIZED, "No session found").into_response();
    }

    let table = state.table.lock().unwrap().clone();
    let mut figures = Vec::new();
    let mut errors = Vec::new();

    let requests = form
        .requests
        .split(['\n', ';'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_VISUALIZE_REQUESTS);

    for line in requests {
        let outcome = chartspec::parse_request(line)
            .and_then(|request| chartspec::evaluate(&request, &table));
        match outcome {
            Ok(figure) => figures.push(figure),
            Err(e) => errors.push(format!("{}: {}", line, e)),
        }
    }

    let figure_ids = state.cache_figures(figures);

    Json(serde_json::json!({
        "figures": figure_ids,
        "errors": errors,
    }))
    .into_response()
}

/// Serve a previously cached figure as PNG.
async fn serve_cached_figure(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    AxumPath(id): AxumPath<String>,
) -> Response {
    if current_session(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }

    let figure = state.figures.lock().unwrap().get(&id).cloned();
    match figure {
        Some(figure) => png_response(&figure),
        None => (StatusCode::NOT_FOUND, "Visualization not found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_dataset;
    use axum::body::to_bytes;
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn test_state() -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("users.json"));
        store.initialize().unwrap();
        (dir, Arc::new(AppState::new(store, sample_dataset())))
    }

    #[test]
    fn figure_cache_holds_one_submission_at_a_time() {
        let (_dir, state) = test_state();

        let first = state.cache_figures(vec![chart::scatter(&sample_dataset()).unwrap()]);
        let second = state.cache_figures(vec![
            chart::bar(&sample_dataset()).unwrap(),
            chart::line(&sample_dataset()).unwrap(),
        ]);

        // Entries from the first submission are gone, not accumulated
        let cache = state.figures.lock().unwrap();
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains_key(&first[0]));
        for id in &second {
            assert!(cache.contains_key(id));
        }
    }

    #[tokio::test]
    async fn truncated_upload_reports_the_transport_error() {
        let (_dir, state) = test_state();
        let session_id = session::create_session("alice");
        let app = router(state);

        // Field headers are complete but the body ends before the closing
        // boundary, so reading the field's bytes fails mid-stream
        let body = "--XBOUND\r\nContent-Disposition: form-data; name=\"dataset\"\r\n\r\ntruncated";
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::COOKIE, format!("session={}", session_id))
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=XBOUND",
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).starts_with("Upload failed"));
    }
}
