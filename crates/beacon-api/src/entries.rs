use anyhow::anyhow;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use beacon_types::api::CreateEntryRequest;
use beacon_types::models::DataEntry;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::validation::{contains_sql_injection, sanitize_xss, validate_length, validate_required};

const MAX_NAME_LENGTH: usize = 255;
const MAX_MESSAGE_LENGTH: usize = 5000;
const MAX_LOCATION_LENGTH: usize = 255;
const MAX_CONTACT_LENGTH: usize = 255;

pub async fn create_entry(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_required(&[
        ("name", req.name.as_deref()),
        ("message", req.message.as_deref()),
    ])
    .map_err(ApiError::BadRequest)?;

    let name = req.name.unwrap_or_default();
    let message = req.message.unwrap_or_default();

    if contains_sql_injection(&name) {
        return Err(ApiError::BadRequest(
            "Invalid characters detected in name field".into(),
        ));
    }
    validate_length("name", &name, MAX_NAME_LENGTH).map_err(ApiError::BadRequest)?;

    // Suspicious message content is sanitized below, never rejected.
    validate_length("message", &message, MAX_MESSAGE_LENGTH).map_err(ApiError::BadRequest)?;

    for (field, value, max) in [
        ("location", req.location.as_deref(), MAX_LOCATION_LENGTH),
        ("contact", req.contact.as_deref(), MAX_CONTACT_LENGTH),
    ] {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            if contains_sql_injection(value) {
                return Err(ApiError::BadRequest(format!(
                    "Invalid characters detected in {field} field"
                )));
            }
            validate_length(field, value, max).map_err(ApiError::BadRequest)?;
        }
    }

    let sanitized = sanitize_xss(&message);
    let id = state.db.insert_entry(
        &name,
        &sanitized,
        req.location.as_deref(),
        req.contact.as_deref(),
    )?;

    // Re-read so the response carries the store's id and timestamps.
    let entry = state
        .db
        .get_entry(id)?
        .ok_or_else(|| ApiError::Internal(anyhow!("entry {id} missing after insert")))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<DataEntry>>, ApiError> {
    let entries = state.db.list_entries()?;
    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataEntry>, ApiError> {
    // Non-numeric ids match no row.
    let id: i64 = id.parse().map_err(|_| ApiError::NotFound)?;
    let entry = state.db.get_entry(id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: i64 = id.parse().map_err(|_| ApiError::NotFound)?;
    if !state.db.delete_entry(id)? {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
