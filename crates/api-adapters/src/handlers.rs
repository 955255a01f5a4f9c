//! HTTP handlers coordinating between the request layer and `ForumService`.
//! Handlers stamp "now" once at the boundary and pass it down.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use domains::{Account, ForumError, Response, Thread};
use services::{SectionListing, ThreadPage, VoteOutcome};

use crate::dto::{
    AccountDetail, BanRequest, CreateResponseRequest, CreateThreadRequest, EditResponseRequest,
    PageQuery, PinRequest, RegisterRequest, ThreadDetail, VoteRequest,
};
use crate::error::ApiError;
use crate::extract::CurrentAccount;
use crate::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let account = state.service.register_account(&req.name, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountDetail>, ApiError> {
    let (account, profile) = state.service.get_account(id).await?;
    Ok(Json(AccountDetail {
        account,
        banned_until: profile.and_then(|p| p.banned_until),
    }))
}

pub async fn set_ban(
    State(state): State<AppState>,
    CurrentAccount(actor): CurrentAccount,
    Path(id): Path<Uuid>,
    Json(req): Json<BanRequest>,
) -> Result<StatusCode, ApiError> {
    state.service.set_ban(id, actor, req.until).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_sections(
    State(state): State<AppState>,
) -> Result<Json<Vec<SectionListing>>, ApiError> {
    Ok(Json(state.service.list_sections().await?))
}

pub async fn list_threads(
    State(state): State<AppState>,
    Path(forum_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ThreadPage>, ApiError> {
    Ok(Json(state.service.list_threads(forum_id, query.page).await?))
}

pub async fn create_thread(
    State(state): State<AppState>,
    CurrentAccount(creator): CurrentAccount,
    Path(forum_id): Path<Uuid>,
    Json(req): Json<CreateThreadRequest>,
) -> Result<(StatusCode, Json<ThreadDetail>), ApiError> {
    let (thread, root) = state
        .service
        .create_thread(forum_id, creator, &req.title, &req.message, Utc::now())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ThreadDetail {
            thread,
            responses: vec![root],
        }),
    ))
}

pub async fn get_thread(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ThreadDetail>, ApiError> {
    let (thread, responses) = state.service.get_thread(id).await?;
    Ok(Json(ThreadDetail { thread, responses }))
}

pub async fn set_pin(
    State(state): State<AppState>,
    CurrentAccount(actor): CurrentAccount,
    Path(id): Path<Uuid>,
    Json(req): Json<PinRequest>,
) -> Result<Json<Thread>, ApiError> {
    Ok(Json(state.service.set_pin(id, actor, req.pinned).await?))
}

pub async fn delete_thread(
    State(state): State<AppState>,
    CurrentAccount(actor): CurrentAccount,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_thread(id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_response(
    State(state): State<AppState>,
    CurrentAccount(responder): CurrentAccount,
    Path(thread_id): Path<Uuid>,
    Json(req): Json<CreateResponseRequest>,
) -> Result<(StatusCode, Json<Response>), ApiError> {
    let response = state
        .service
        .create_response(thread_id, responder, &req.message, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn edit_response(
    State(state): State<AppState>,
    CurrentAccount(actor): CurrentAccount,
    Path(id): Path<Uuid>,
    Json(req): Json<EditResponseRequest>,
) -> Result<Json<Response>, ApiError> {
    Ok(Json(state.service.edit_response(id, actor, &req.message).await?))
}

pub async fn delete_response(
    State(state): State<AppState>,
    CurrentAccount(actor): CurrentAccount,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_response(id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn vote(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
    Path(response_id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> Result<(StatusCode, Json<VoteOutcome>), ApiError> {
    let outcome = state
        .service
        .vote(response_id, account, req.like, Utc::now())
        .await?;
    let status = match &outcome {
        VoteOutcome::Created(_) => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(outcome)))
}

pub async fn metrics(State(state): State<AppState>) -> Result<String, ApiError> {
    state
        .metrics
        .render()
        .map_err(|e| ApiError::Domain(ForumError::Internal(e.to_string())))
}
