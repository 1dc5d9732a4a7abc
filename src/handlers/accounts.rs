use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{bounded, lenient_integer, present};
use crate::db::models::{Account, NewAccount};
use crate::error::{ApiFailure, BrainError};
use crate::router::BrainState;

const INCOMPLETE_DATA: &str = "Incomplete data provided";
const TECHNICAL_ERROR: &str = "Technical Error";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntriesRequest {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub id: Option<i64>,
    /// Amount to add, not the new total.
    #[serde(default, deserialize_with = "lenient_integer")]
    pub entries: Option<i64>,
}

/// GET / -> plain-text count of registered accounts.
pub async fn health_count(State(state): State<BrainState>) -> Result<String, ApiFailure> {
    match bounded(&state, "account count", state.store.count_accounts()).await {
        Ok(count) => Ok(format!("Number of users registered with us = {count}")),
        Err(e) => Err(reject(&state, e, |_| {
            ApiFailure::text(StatusCode::INTERNAL_SERVER_ERROR, TECHNICAL_ERROR)
        })
        .await),
    }
}

/// POST /register -> creates credential + account, returns the account.
pub async fn register(
    State(state): State<BrainState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<Account>, ApiFailure> {
    match register_account(&state, payload).await {
        Ok(account) => {
            info!(id = account.id, "user successfully registered");
            Ok(Json(account))
        }
        Err(e) => Err(reject(&state, e, register_failure).await),
    }
}

/// POST /login -> returns the account when the password matches.
pub async fn login(
    State(state): State<BrainState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Account>, ApiFailure> {
    match authenticate(&state, payload).await {
        Ok(account) => {
            info!(id = account.id, "login successful");
            Ok(Json(account))
        }
        Err(e) => Err(reject(&state, e, login_failure).await),
    }
}

/// PUT /update -> adds `entries` to the account's counter.
pub async fn update_entries(
    State(state): State<BrainState>,
    payload: Result<Json<UpdateEntriesRequest>, JsonRejection>,
) -> Result<Json<Account>, ApiFailure> {
    match increment_entries(&state, payload).await {
        Ok(account) => {
            info!(id = account.id, entries = account.entries, "entries updated");
            Ok(Json(account))
        }
        Err(e) => Err(reject(&state, e, update_failure).await),
    }
}

async fn register_account(
    state: &BrainState,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Account, BrainError> {
    let Json(req) = payload.map_err(|_| BrainError::Validation("request body"))?;
    let (Some(name), Some(email), Some(password)) = (
        present(&req.name),
        present(&req.email),
        present(&req.password),
    ) else {
        return Err(BrainError::Validation("name, email and password"));
    };

    let hash = state.hasher.hash(password).await?;
    let new = NewAccount {
        name: name.to_owned(),
        email: email.to_owned(),
        hash,
    };
    bounded(state, "registration", state.store.register_account(new)).await
}

async fn authenticate(
    state: &BrainState,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Account, BrainError> {
    let Json(req) = payload.map_err(|_| BrainError::Validation("request body"))?;
    let (Some(email), Some(password)) = (present(&req.email), present(&req.password)) else {
        return Err(BrainError::Validation("email and password"));
    };
    bounded(state, "login", state.store.authenticate(email, password)).await
}

async fn increment_entries(
    state: &BrainState,
    payload: Result<Json<UpdateEntriesRequest>, JsonRejection>,
) -> Result<Account, BrainError> {
    let Json(req) = payload.map_err(|_| BrainError::Validation("request body"))?;
    let (Some(id), Some(delta)) = (req.id, req.entries) else {
        return Err(BrainError::Validation("id and entries"));
    };
    // an id outside the column's range cannot match any row
    let id = i32::try_from(id).map_err(|_| BrainError::NotFound)?;
    bounded(state, "entries update", state.store.increment_entries(id, delta)).await
}

fn register_failure(e: &BrainError) -> ApiFailure {
    match e {
        BrainError::Validation(_) => ApiFailure::json(StatusCode::BAD_REQUEST, INCOMPLETE_DATA),
        BrainError::DuplicateEmail => {
            ApiFailure::json(StatusCode::BAD_REQUEST, "User already exists")
        }
        _ => ApiFailure::json(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Technical error. Unable to register at the moment",
        ),
    }
}

fn login_failure(e: &BrainError) -> ApiFailure {
    match e {
        BrainError::Validation(_) => ApiFailure::json(StatusCode::BAD_REQUEST, INCOMPLETE_DATA),
        BrainError::NotFound => ApiFailure::json(StatusCode::BAD_REQUEST, "User doesn't exist"),
        BrainError::InvalidCredentials => {
            ApiFailure::json(StatusCode::BAD_REQUEST, "Invalid email/password")
        }
        _ => ApiFailure::json(StatusCode::INTERNAL_SERVER_ERROR, TECHNICAL_ERROR),
    }
}

fn update_failure(e: &BrainError) -> ApiFailure {
    match e {
        BrainError::Validation(_) => ApiFailure::text(StatusCode::BAD_REQUEST, INCOMPLETE_DATA),
        BrainError::NotFound => ApiFailure::text(StatusCode::BAD_REQUEST, "Bad id received"),
        _ => ApiFailure::text(StatusCode::INTERNAL_SERVER_ERROR, TECHNICAL_ERROR),
    }
}

/// Map a failure to its response, logging service-side errors to both
/// `tracing` and the diagnostic log.
pub(crate) async fn reject(
    state: &BrainState,
    err: BrainError,
    to_failure: impl FnOnce(&BrainError) -> ApiFailure,
) -> ApiFailure {
    let failure = to_failure(&err);
    if err.is_unexpected() {
        error!(error = %err, status = %failure.status, "request failed");
        state.error_log.record(&err).await;
    } else {
        warn!(error = %err, status = %failure.status, "request rejected");
    }
    failure
}
