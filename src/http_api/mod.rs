use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    Assignment, Availability, AvailabilityQuery, BookingInterval, BusinessUnit, Equipment,
    EquipmentCategory, EquipmentFilter, EquipmentStatus, EquipmentTimeline, Granularity,
    RentalRequest, RequestStage, SchedulingEngine, SchedulingError, TransitionAction, Urgency,
};

#[derive(Clone)]
pub struct AppState {
    engine: Arc<SchedulingEngine>,
}

impl AppState {
    pub fn new(engine: SchedulingEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    pub fn with_shared(engine: Arc<SchedulingEngine>) -> Self {
        Self { engine }
    }

    fn engine(&self) -> Arc<SchedulingEngine> {
        self.engine.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<SchedulingError> for ApiError {
    fn from(value: SchedulingError) -> Self {
        match value {
            SchedulingError::Validation(_) => ApiError::Invalid(value.to_string()),
            SchedulingError::EquipmentNotFound(_) | SchedulingError::RequestNotFound(_) => {
                ApiError::NotFound(value.to_string())
            }
            SchedulingError::ConflictingBooking { .. }
            | SchedulingError::InvalidTransition { .. } => ApiError::Conflict(value.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let body = Json(ErrorBody {
                    error: "not_found",
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Conflict(message) => {
                let body = Json(ErrorBody {
                    error: "conflict",
                    message,
                });
                (StatusCode::CONFLICT, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal(message) => {
                let body = Json(ErrorBody {
                    error: "internal_error",
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/equipment", get(list_equipment).post(register_equipment))
        .route("/equipment/:id", get(get_equipment))
        .route("/equipment/:id/status", post(set_equipment_status))
        .route("/availability", post(check_availability))
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/:id", get(get_request))
        .route("/requests/:id/transition", post(transition_request))
        .route(
            "/requests/:id/assignments",
            post(assign_equipment),
        )
        .route(
            "/requests/:id/assignments/:equipment_id",
            axum::routing::delete(release_equipment),
        )
        .route("/timeline", post(get_timeline))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, engine: SchedulingEngine) -> std::io::Result<()> {
    let state = AppState::new(engine);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_equipment(
    State(state): State<AppState>,
    Query(filter): Query<EquipmentFilter>,
) -> Json<Vec<Equipment>> {
    Json(state.engine().list_equipment(&filter))
}

async fn register_equipment(
    State(state): State<AppState>,
    Json(equipment): Json<Equipment>,
) -> Result<(StatusCode, Json<Equipment>), ApiError> {
    let engine = state.engine();
    engine.add_equipment(equipment.clone())?;
    let created = engine
        .get_equipment(&equipment.id)
        .map_err(|_| ApiError::Internal("equipment not found after registration".into()))?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_equipment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Equipment>, ApiError> {
    Ok(Json(state.engine().get_equipment(&id)?))
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: EquipmentStatus,
}

async fn set_equipment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<Equipment>, ApiError> {
    let engine = state.engine();
    engine.set_equipment_status(&id, payload.status)?;
    Ok(Json(engine.get_equipment(&id)?))
}

#[derive(Debug, Deserialize)]
struct AvailabilityPayload {
    category: EquipmentCategory,
    start: NaiveDate,
    end: NaiveDate,
    #[serde(default)]
    business_unit: Option<BusinessUnit>,
    quantity: u32,
}

async fn check_availability(
    State(state): State<AppState>,
    Json(payload): Json<AvailabilityPayload>,
) -> Result<Json<Availability>, ApiError> {
    let interval = BookingInterval::new(payload.start, payload.end)
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    let query = AvailabilityQuery {
        category: payload.category,
        interval,
        business_unit: payload.business_unit,
        quantity: payload.quantity,
    };
    Ok(Json(state.engine().check_availability(&query)?))
}

#[derive(Debug, Deserialize)]
struct StageQuery {
    #[serde(default)]
    stage: Option<RequestStage>,
}

async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<StageQuery>,
) -> Json<Vec<RentalRequest>> {
    Json(state.engine().list_requests(query.stage))
}

#[derive(Debug, Deserialize)]
struct CreateRequestPayload {
    #[serde(default)]
    id: Option<i32>,
    category: EquipmentCategory,
    quantity: u32,
    business_unit: BusinessUnit,
    project: String,
    start: NaiveDate,
    end: NaiveDate,
    requested_by: String,
    urgency: Urgency,
}

async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<(StatusCode, Json<RentalRequest>), ApiError> {
    let interval = BookingInterval::new(payload.start, payload.end)
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    let engine = state.engine();
    let id = payload.id.unwrap_or_else(|| engine.next_request_id());
    let request = RentalRequest::new(
        id,
        payload.category,
        payload.quantity,
        payload.business_unit,
        payload.project,
        interval,
        payload.requested_by,
        payload.urgency,
    );
    let created = engine.create_request(request)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RentalRequest>, ApiError> {
    Ok(Json(state.engine().get_request(id)?))
}

#[derive(Debug, Deserialize)]
struct TransitionPayload {
    action: String,
}

async fn transition_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<TransitionPayload>,
) -> Result<Json<RentalRequest>, ApiError> {
    let action = TransitionAction::from_str(payload.action.trim())
        .ok_or_else(|| ApiError::invalid(format!("unknown action '{}'", payload.action)))?;
    Ok(Json(state.engine().transition(id, action)?))
}

#[derive(Debug, Deserialize)]
struct AssignPayload {
    equipment_id: String,
    #[serde(default)]
    start: Option<NaiveDate>,
    #[serde(default)]
    end: Option<NaiveDate>,
}

async fn assign_equipment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<AssignPayload>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    let narrowed = match (payload.start, payload.end) {
        (Some(start), Some(end)) => Some(
            BookingInterval::new(start, end).map_err(|err| ApiError::invalid(err.to_string()))?,
        ),
        (None, None) => None,
        _ => {
            return Err(ApiError::invalid(
                "a narrowed interval requires both start and end",
            ))
        }
    };
    let assignment = state.engine().assign(id, &payload.equipment_id, narrowed)?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn release_equipment(
    State(state): State<AppState>,
    Path((id, equipment_id)): Path<(i32, String)>,
) -> Result<StatusCode, ApiError> {
    state.engine().release(id, &equipment_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct TimelinePayload {
    equipment_ids: Vec<String>,
    granularity: Granularity,
    start: NaiveDate,
    end: NaiveDate,
}

async fn get_timeline(
    State(state): State<AppState>,
    Json(payload): Json<TimelinePayload>,
) -> Result<Json<Vec<EquipmentTimeline>>, ApiError> {
    let range = BookingInterval::new(payload.start, payload.end)
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    let timelines =
        state
            .engine()
            .timeline(&payload.equipment_ids, payload.granularity, &range)?;
    Ok(Json(timelines))
}
