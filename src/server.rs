//!
//! netveil console HTTP server
//! ---------------------------
//! This module defines the Axum-based HTTP surface of the console.
//!
//! Responsibilities:
//! - Session management with a simple cookie model backed by the identity layer.
//! - Login/logout endpoints backed by the `security` credential store.
//! - Fingerprint log read endpoints (all records, records by IP).
//! - The /run endpoint dispatching the allow-listed scan scripts.
//! - First-run provisioning of the default admin and startup inventory logs.
//!
//! Every endpoint except /login first passes the session guard; a request
//! without a valid session is redirected to /login before any core logic runs.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::dispatch::{CommandDispatcher, DispatchError, ScanCommand};
use crate::error::AppError;
use crate::fingerprints::FingerprintLog;
use crate::identity::{AuthError, AuthProvider, LocalAuthProvider, LoginRequest, Principal, SessionManager};

const SESSION_COOKIE: &str = "netveil_session";

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<LocalAuthProvider>,
    pub sessions: SessionManager,
    pub log: Arc<FingerprintLog>,
    pub dispatcher: Arc<CommandDispatcher>,
}

fn log_startup_folders(config: &Config) {
    let cwd = std::env::current_dir().ok();
    let exe = std::env::current_exe().ok();
    let user = std::env::var("USER").or_else(|_| std::env::var("USERNAME")).ok();

    info!(
        target: "startup",
        "netveil console starting. Folder configuration: cwd={:?}, exe={:?}, user={:?}, state_root={:?}, fingerprint_log={:?}, scripts_root={:?}",
        cwd, exe, user, config.state_root, config.fingerprint_log, config.scripts_root
    );

    info!(
        target: "startup",
        "Path existence: state_root={}, fingerprint_log={}, scripts_root={}",
        config.state_root.exists(),
        config.fingerprint_log.exists(),
        config.scripts_root.exists()
    );
}

/// Start the console bound to the configured port.
///
/// Ensures the state root exists, provisions the default admin on first run,
/// logs the folder inventory, and mounts all HTTP routes.
pub async fn run_with_config(config: Config) -> anyhow::Result<()> {
    log_startup_folders(&config);

    std::fs::create_dir_all(&config.state_root)
        .with_context(|| format!("Failed to create or access state root: {}", config.state_root.display()))?;
    crate::security::ensure_default_admin(&config.state_root)
        .with_context(|| format!("While ensuring default admin under: {}", config.state_root.display()))?;

    if !config.scripts_root.exists() {
        warn!("scripts folder {} does not exist; /run will fail until it is installed", config.scripts_root.display());
    }

    let sessions = SessionManager::new(config.session_ttl);
    let app_state = AppState {
        auth: Arc::new(LocalAuthProvider::new(config.state_root.clone(), sessions.clone())),
        sessions,
        log: Arc::new(FingerprintLog::new(config.fingerprint_log.clone())),
        dispatcher: Arc::new(CommandDispatcher::new(config.scripts_root.clone(), config.run_timeout)),
    };

    let app = Router::new()
        .route("/", get(home))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout).post(logout))
        .route("/fingerprints", get(fingerprints).post(fingerprints))
        .route("/fingerprint/{ip}", get(fingerprint_by_ip).post(fingerprint_by_ip))
        .route("/run", get(run_form).post(run_command))
        .with_state(app_state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!("Starting netveil console on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Convenience entry point using environment configuration.
pub async fn run() -> anyhow::Result<()> {
    run_with_config(Config::from_env()).await
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    username: String,
    secret: String,
}

#[derive(Debug, Deserialize)]
struct RunPayload {
    predef_command: Option<String>,
}

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name { return Some(v[1..].to_string()); }
        }
    }
    None
}

fn set_session_cookie(token: &str) -> HeaderValue {
    // HttpOnly cookie scoped to path / with SameSite=Strict
    HeaderValue::from_str(&format!("{}={}; HttpOnly; SameSite=Strict; Path=/", SESSION_COOKIE, token)).unwrap()
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!("{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Strict; Path=/", SESSION_COOKIE)).unwrap()
}

/// Session guard applied by every handler except /login. A missing, expired
/// or revoked token redirects to the login operation.
fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Principal, Response> {
    let Some(token) = parse_cookie(headers, SESSION_COOKIE) else {
        return Err(Redirect::to("/login").into_response());
    };
    match state.sessions.validate(&token) {
        Some(principal) => Ok(principal),
        None => Err(Redirect::to("/login").into_response()),
    }
}

fn app_error_response(err: AppError) -> Response {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"status": "error", "code": err.code_str(), "message": err.message()}))).into_response()
}

async fn login_form() -> impl IntoResponse {
    Json(json!({"status": "login"}))
}

async fn login(State(state): State<AppState>, Form(payload): Form<LoginPayload>) -> Response {
    let req = LoginRequest { username: payload.username, password: payload.secret };
    match state.auth.login(&req) {
        Ok(resp) => {
            let mut headers = HeaderMap::new();
            headers.insert("Set-Cookie", set_session_cookie(&resp.session.token));
            (headers, Redirect::to("/")).into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            // One generic message for unknown user and wrong secret alike
            (StatusCode::UNAUTHORIZED, Json(json!({"status": "error", "error": "Invalid login"}))).into_response()
        }
        Err(e) => {
            error!("login error: {e}");
            app_error_response(AppError::internal("login_failed", "login failed"))
        }
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    // Idempotent: an unknown or already-invalidated token is not an error
    if let Some(token) = parse_cookie(&headers, SESSION_COOKIE) {
        state.sessions.logout(&token);
    }
    let mut h = HeaderMap::new();
    h.insert("Set-Cookie", clear_session_cookie());
    (h, Redirect::to("/login")).into_response()
}

async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let principal = match require_session(&state, &headers) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    Json(json!({"status": "ok", "user": principal.user_id})).into_response()
}

async fn fingerprints(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_session(&state, &headers) {
        return resp;
    }
    match state.log.list_all() {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            error!("fingerprint log read failed: {e}");
            app_error_response(e.into())
        }
    }
}

async fn fingerprint_by_ip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ip): Path<String>,
) -> Response {
    if let Err(resp) = require_session(&state, &headers) {
        return resp;
    }
    match state.log.list_by_ip(&ip) {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            error!("fingerprint log read failed: {e}");
            app_error_response(e.into())
        }
    }
}

async fn run_form(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_session(&state, &headers) {
        return resp;
    }
    let commands: Vec<&str> = ScanCommand::ALL.iter().map(|c| c.as_str()).collect();
    Json(json!({"status": "ok", "commands": commands})).into_response()
}

async fn run_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(payload): Form<RunPayload>,
) -> Response {
    let principal = match require_session(&state, &headers) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let selected = payload.predef_command.unwrap_or_default();
    info!(target: "dispatch", "user={} requested command={:?}", principal.user_id, selected);
    match state.dispatcher.run(&selected).await {
        Ok(result) => (StatusCode::OK, result.combined_output).into_response(),
        Err(DispatchError::UnknownCommand(_)) => {
            (StatusCode::BAD_REQUEST, "Invalid command selected.").into_response()
        }
        Err(e) => {
            error!("dispatch failed: {e}");
            app_error_response(e.into())
        }
    }
}
