//! Accounting handlers
//!
//! Each request opens its own accounting session for the policy in the
//! path, which generates the policy's invoices on first access.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use tracing::info_span;
use validator::Validate;

use core_kernel::PolicyId;
use domain_billing::{AccountStatement, AccountingSession, BillingError};
use domain_policy::BillingSchedule;

use crate::dto::accounting::*;
use crate::{error::ApiError, AppState};

fn parse_policy_id(raw: &str) -> Result<PolicyId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid policy id: {}", raw)))
}

async fn open_session(state: &AppState, policy_id: PolicyId) -> Result<AccountingSession, ApiError> {
    let session = AccountingSession::load(state.store.clone(), policy_id)
        .await?
        .with_span(info_span!("policy_accounting", policy_id = %policy_id, via = "http"))
        .ensure_invoices()
        .await?;
    Ok(session)
}

/// Invoices and balance of a policy as of a date
pub async fn get_statement(
    State(state): State<AppState>,
    Path((id, as_of)): Path<(String, NaiveDate)>,
) -> Result<Json<AccountStatement>, ApiError> {
    let session = open_session(&state, parse_policy_id(&id)?).await?;
    Ok(Json(session.statement(Some(as_of)).await?))
}

/// Records a payment
pub async fn make_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    request.validate()?;

    let session = open_session(&state, parse_policy_id(&id)?).await?;
    let payment = session
        .make_payment(request.contact_id, request.transaction_date, request.amount)
        .await?;

    Ok((StatusCode::CREATED, Json(payment.into())))
}

/// Is the policy pending cancellation for non-payment?
pub async fn evaluate_cancellation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CancellationQuery>,
) -> Result<Json<CancellationResponse>, ApiError> {
    let policy_id = parse_policy_id(&id)?;
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let session = open_session(&state, policy_id).await?;
    let pending_cancellation = session
        .evaluate_cancellation_pending_due_to_non_pay(Some(as_of))
        .await?;

    Ok(Json(CancellationResponse {
        policy_id,
        as_of,
        pending_cancellation,
    }))
}

/// Cancels a policy
pub async fn cancel_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<PolicyResponse>, ApiError> {
    request.validate()?;

    let mut session = open_session(&state, parse_policy_id(&id)?).await?;
    let policy = session.cancel_policy(&request.reason).await?;

    Ok(Json(policy.into()))
}

/// Moves a policy to a new billing schedule mid-term
pub async fn change_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ScheduleChangeRequest>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let policy_id = parse_policy_id(&id)?;
    let schedule: BillingSchedule = request
        .billing_schedule
        .parse()
        .map_err(BillingError::from)?;

    let mut session = open_session(&state, policy_id).await?;
    let policy = session.change_policy(schedule, request.effective_on).await?;

    Ok(Json(policy.into()))
}
