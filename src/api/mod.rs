//! HTTP surface of the habit engine.
//!
//! Every `/api` route is scoped to the [`Principal`] in the auth header. All
//! engine work goes through [`HabitService`]; handlers only translate between
//! JSON and the engine's types.

pub mod auth;
pub mod dto;
pub mod error;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderName, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::habit::stats::HabitStats;
use crate::habit::types::{CheckIn, Habit, HabitPatch, HabitStatus};
use crate::habit::HabitService;
use auth::Principal;
use dto::{CheckInRequest, CreateHabitRequest, RangeQuery, UpdateHabitRequest};
use error::ApiResult;

/// State shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub habits: HabitService,
    pub auth_header: HeaderName,
}

impl AppState {
    pub fn new(habits: HabitService, auth_header: &str) -> Result<Self> {
        let auth_header = HeaderName::try_from(auth_header)
            .with_context(|| format!("invalid auth header name: {auth_header}"))?;
        Ok(Self {
            habits,
            auth_header,
        })
    }
}

/// Create the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/habits", get(list_habits).post(create_habit))
        .route(
            "/api/habits/{id}",
            get(get_habit).patch(update_habit).delete(delete_habit),
        )
        .route("/api/habits/{id}/check-in", post(check_in))
        .route("/api/habits/{id}/check-ins", get(list_check_ins))
        .route("/api/analytics/habits", get(habit_analytics))
        // Health check
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    "OK"
}

/// GET /api/habits
async fn list_habits(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<Vec<HabitStatus>>> {
    let habits = state.habits.status_for_list(principal.id()).await?;
    Ok(Json(habits))
}

/// POST /api/habits
async fn create_habit(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<CreateHabitRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Habit>)> {
    let Json(req) = payload?;
    let (name, frequency) = req.validate()?;
    let habit = state
        .habits
        .create_habit(principal.id(), &name, frequency)
        .await?;
    Ok((StatusCode::CREATED, Json(habit)))
}

/// GET /api/habits/{id}
async fn get_habit(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<Json<HabitStatus>> {
    let status = state.habits.get_habit(&id, principal.id()).await?;
    Ok(Json(status))
}

/// PATCH /api/habits/{id}
async fn update_habit(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    payload: Result<Json<UpdateHabitRequest>, JsonRejection>,
) -> ApiResult<Json<Habit>> {
    let Json(req) = payload?;
    let patch = HabitPatch::try_from(req)?;
    let habit = state.habits.update_habit(&id, principal.id(), patch).await?;
    Ok(Json(habit))
}

/// DELETE /api/habits/{id}
async fn delete_habit(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.habits.delete_habit(&id, principal.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/habits/{id}/check-in
async fn check_in(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<CheckIn>)> {
    let req = CheckInRequest::from_body(&body)?;
    let check_in = state.habits.check_in(&id, principal.id(), req.note).await?;
    Ok((StatusCode::CREATED, Json(check_in)))
}

/// GET /api/habits/{id}/check-ins?start=YYYY-MM-DD&end=YYYY-MM-DD
async fn list_check_ins(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<CheckIn>>> {
    let Query(query) = query?;
    let range = query.into_range()?;
    let check_ins = state.habits.check_ins(&id, principal.id(), range).await?;
    Ok(Json(check_ins))
}

/// GET /api/analytics/habits
async fn habit_analytics(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<HabitStats>> {
    let stats = state.habits.stats(Some(principal.id())).await?;
    Ok(Json(stats))
}
