use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::state::AppState,
    domain::OfferSummary,
    error::{AppError, Result},
    repository::OfferRepository,
    service::{ProcessOfferOutcome, ProcessOfferRequest},
};

pub async fn get(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<OfferSummary>> {
    let offer = state
        .offers
        .find_summary(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Offer not found".to_string()))?;

    Ok(Json(offer))
}

pub async fn process(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<ProcessOfferRequest>,
) -> Result<Json<ProcessOfferOutcome>> {
    let outcome = state.checkout.process_offer(&slug, body).await?;

    Ok(Json(outcome))
}
