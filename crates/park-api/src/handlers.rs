//! # Request Handlers
//!
//! Axum request handlers for the parking API.
//! Each handler is a thin adapter over one `ParkingLot` operation.

use crate::state::AppState;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use park_core::{Money, ParkingError, SpotId, Ticket, TicketId, Vehicle, VehicleCategory};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Vehicle entry request
#[derive(Debug, Deserialize)]
pub struct EnterRequest {
    /// Registration plate
    pub plate: String,
    /// Vehicle category (`two_wheeler` / `four_wheeler`)
    pub category: VehicleCategory,
}

/// Vehicle exit response
#[derive(Debug, Serialize)]
pub struct ExitResponse {
    pub ticket: Ticket,
    pub fee: Money,
    /// Fee formatted for display (e.g., "₹120.00")
    pub fee_display: String,
}

/// Add spot request
#[derive(Debug, Deserialize)]
pub struct AddSpotRequest {
    pub category: VehicleCategory,
}

/// Add spot response
#[derive(Debug, Serialize)]
pub struct AddSpotResponse {
    pub spot_id: SpotId,
    pub category: VehicleCategory,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            retryable: None,
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn parking_error_to_response(err: ParkingError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code).with_retryable(err.is_retryable());
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Extractors
// =============================================================================

/// `Path` whose rejection is reported as an `ErrorResponse`
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => {
                let status = rejection.status();
                warn!("Rejected path: {}", rejection.body_text());
                Err((
                    status,
                    Json(ErrorResponse::new(rejection.body_text(), status.as_u16())),
                ))
            }
        }
    }
}

/// `Json` body whose rejection is reported as an `ErrorResponse`
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let status = rejection.status();
                warn!("Rejected body: {}", rejection.body_text());
                Err((
                    status,
                    Json(ErrorResponse::new(rejection.body_text(), status.as_u16())),
                ))
            }
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "parking-lot",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Park a vehicle and issue a ticket
#[instrument(skip(state, request), fields(plate = %request.plate, category = %request.category))]
pub async fn enter(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EnterRequest>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    if request.plate.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Plate must not be empty", 400)),
        ));
    }

    let vehicle = Vehicle::new(request.plate.trim(), request.category);
    let ticket = state.lot.enter(vehicle).map_err(|e| {
        warn!("Entry refused: {}", e);
        parking_error_to_response(e)
    })?;

    info!("Issued ticket {}", ticket.id);
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Release the spot and bill the stay
#[instrument(skip(state))]
pub async fn exit(
    State(state): State<AppState>,
    ApiPath(ticket_id): ApiPath<TicketId>,
) -> Result<Json<ExitResponse>, ApiError> {
    let receipt = state.lot.exit(ticket_id).map_err(parking_error_to_response)?;

    Ok(Json(ExitResponse {
        fee_display: receipt.fee.display(),
        fee: receipt.fee,
        ticket: receipt.ticket,
    }))
}

/// List open tickets
pub async fn list_tickets(State(state): State<AppState>) -> impl IntoResponse {
    let tickets = state.lot.open_tickets();
    Json(serde_json::json!({
        "count": tickets.len(),
        "tickets": tickets,
    }))
}

/// Get a single open ticket
pub async fn get_ticket(
    State(state): State<AppState>,
    ApiPath(ticket_id): ApiPath<TicketId>,
) -> Result<Json<Ticket>, ApiError> {
    state
        .lot
        .ticket(ticket_id)
        .map(Json)
        .map_err(parking_error_to_response)
}

/// Tickets left open by a failed exit
pub async fn list_reconciliation(State(state): State<AppState>) -> impl IntoResponse {
    let tickets = state.lot.pending_reconciliation();
    Json(serde_json::json!({
        "count": tickets.len(),
        "tickets": tickets,
    }))
}

/// Occupancy summary for every category
pub async fn list_occupancy(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "occupancy": state.lot.occupancy(),
    }))
}

/// Spots of one category in allocation order
pub async fn list_spots(
    State(state): State<AppState>,
    ApiPath(category): ApiPath<VehicleCategory>,
) -> Result<impl IntoResponse, ApiError> {
    let spots = state.lot.spots(category).map_err(parking_error_to_response)?;
    let billing = state
        .lot
        .billing_mode(category)
        .map_err(parking_error_to_response)?;

    Ok(Json(serde_json::json!({
        "category": category,
        "billing": billing,
        "count": spots.len(),
        "spots": spots,
    })))
}

/// Add a free spot
#[instrument(skip(state, request), fields(category = %request.category))]
pub async fn add_spot(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddSpotRequest>,
) -> Result<(StatusCode, Json<AddSpotResponse>), ApiError> {
    let spot_id = state
        .lot
        .add_spot(request.category)
        .map_err(parking_error_to_response)?;

    Ok((
        StatusCode::CREATED,
        Json(AddSpotResponse {
            spot_id,
            category: request.category,
        }),
    ))
}

/// Remove a free spot
#[instrument(skip(state))]
pub async fn remove_spot(
    State(state): State<AppState>,
    ApiPath((category, spot_id)): ApiPath<(VehicleCategory, SpotId)>,
) -> Result<StatusCode, ApiError> {
    state
        .lot
        .remove_spot(category, spot_id)
        .map_err(parking_error_to_response)?;

    Ok(StatusCode::NO_CONTENT)
}
