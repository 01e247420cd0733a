//! HTTP handlers for the dashboard
//!
//! Every action applies the posted form to the caller's session, runs at most
//! one outbound call, saves the session and redirects back to the page.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::dashboard::DashboardService;
use crate::input::DashboardForm;
use crate::render;
use crate::session::{session_cookie, session_id_from_cookie, LoadedSession, SessionState};
use crate::weights::Preset;

pub type AppState = Arc<DashboardService>;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn cookie_session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session_id_from_cookie)
}

async fn load_session(service: &DashboardService, headers: &HeaderMap) -> LoadedSession {
    service
        .sessions
        .load_or_create(cookie_session_id(headers), &service.config.defaults)
        .await
}

/// 303 back to the page, jumping to the selected route when there is one
fn back_to_page(id: &str, state: &SessionState) -> Response {
    let location = match &state.scroll_to {
        Some(trace) => format!("/#{}", render::trace_anchor(trace)),
        None => "/".to_string(),
    };
    (
        [(header::SET_COOKIE, session_cookie(id))],
        Redirect::to(&location),
    )
        .into_response()
}

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /
pub async fn index(State(service): State<AppState>, headers: HeaderMap) -> Response {
    let LoadedSession { id, mut state, is_new } = load_session(&service, &headers).await;
    let (notices, _) = state.take_one_shot();
    let html = render::page(&state, service.config.purchase_date, &notices);

    // A session only starts with the first action
    if is_new {
        return Html(html).into_response();
    }
    service.sessions.save(&id, state).await;
    ([(header::SET_COOKIE, session_cookie(&id))], Html(html)).into_response()
}

/// POST /actions/query-routes
pub async fn query_routes(
    State(service): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<DashboardForm>,
) -> Response {
    let LoadedSession { id, mut state, .. } = load_session(&service, &headers).await;
    service.query_routes(&mut state, &form).await;
    let response = back_to_page(&id, &state);
    service.sessions.save(&id, state).await;
    response
}

/// POST /actions/calculate-route
pub async fn calculate_route(
    State(service): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<DashboardForm>,
) -> Response {
    let LoadedSession { id, mut state, .. } = load_session(&service, &headers).await;
    service.calculate_route(&mut state, &form).await;
    let response = back_to_page(&id, &state);
    service.sessions.save(&id, state).await;
    response
}

/// POST /actions/recalculation
pub async fn toggle_recalculation(
    State(service): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<DashboardForm>,
) -> Response {
    let LoadedSession { id, mut state, .. } = load_session(&service, &headers).await;
    service.toggle_recalculation(&mut state, &form);
    let response = back_to_page(&id, &state);
    service.sessions.save(&id, state).await;
    response
}

/// POST /actions/presets/:name
pub async fn apply_preset(
    State(service): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Form(form): Form<DashboardForm>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let preset = Preset::from_slug(&name).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Preset '{}' not found. Valid presets: low-season, high-season", name),
            }),
        )
    })?;

    let LoadedSession { id, mut state, .. } = load_session(&service, &headers).await;
    service.apply_preset(&mut state, &form, preset);
    let response = back_to_page(&id, &state);
    service.sessions.save(&id, state).await;
    Ok(response)
}
