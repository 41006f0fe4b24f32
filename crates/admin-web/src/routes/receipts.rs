//! Receipt listing and review routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use database::{receipt, Receipt, ReceiptStatus, Stage};
use serde::{Deserialize, Serialize};
use workflow::ReviewOutcome;

use crate::error::{AdminError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// pending | approved | rejected
    pub status: Option<String>,
    /// 1/4 | 2/4 | 3/4 | 4/4
    pub stage: Option<String>,
}

/// List receipts, optionally filtered by status and stage.
pub async fn list_api(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Receipt>>> {
    let status = params
        .status
        .as_deref()
        .map(|s| {
            ReceiptStatus::parse(s)
                .ok_or_else(|| AdminError::BadRequest(format!("unknown status: {}", s)))
        })
        .transpose()?;
    let stage = params
        .stage
        .as_deref()
        .map(|s| {
            Stage::parse(s).ok_or_else(|| AdminError::BadRequest(format!("unknown stage: {}", s)))
        })
        .transpose()?;

    let receipts = receipt::list_filtered(state.db.pool(), status, stage).await?;
    Ok(Json(receipts))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
    /// Name shown to the student in the decision notification.
    pub reviewer: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub outcome: &'static str,
    pub receipt: Receipt,
}

/// Apply a review decision. The first decision wins.
pub async fn review_api(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    if body.reviewer.trim().is_empty() {
        return Err(AdminError::BadRequest("reviewer is required".to_string()));
    }

    let outcome = match body.action {
        ReviewAction::Approve => {
            state
                .review
                .approve(id, body.reviewer.trim(), state.sender.as_ref())
                .await?
        }
        ReviewAction::Reject => {
            state
                .review
                .reject(id, body.reviewer.trim(), body.notes.trim(), state.sender.as_ref())
                .await?
        }
    };

    let receipt = receipt::get_receipt(state.db.pool(), id).await?;
    Ok(Json(ReviewResponse {
        outcome: match outcome {
            ReviewOutcome::Recorded => "recorded",
            ReviewOutcome::AlreadyReviewed => "already_reviewed",
        },
        receipt,
    }))
}
