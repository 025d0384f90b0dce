//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::service::AqiError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/states", get(list_states))
        .route("/api/states/:state/cities", get(list_cities))
        .route("/api/states/:state/cities/:city/stations", get(list_stations))
        .route("/api/aqi", get(get_aqi))
        .route("/api/stations/nearest", get(nearest_stations))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn list_states(State(state): State<AppState>) -> Result<Json<StatesResponse>, AppError> {
    let states = state.service.get_states().await?;
    Ok(Json(StatesResponse { states }))
}

async fn list_cities(
    State(state): State<AppState>,
    Path(state_id): Path<String>,
) -> Result<Json<CitiesResponse>, AppError> {
    let cities = state.service.get_cities(&state_id).await?;
    Ok(Json(CitiesResponse {
        state: state_id,
        cities,
    }))
}

async fn list_stations(
    State(state): State<AppState>,
    Path((state_id, city_id)): Path<(String, String)>,
) -> Result<Json<StationsResponse>, AppError> {
    let stations = state.service.get_stations(&state_id, &city_id).await?;
    Ok(Json(StationsResponse {
        state: state_id,
        city: city_id,
        stations,
    }))
}

/// AQI for coordinates, a station path, or a city name.
async fn get_aqi(
    State(state): State<AppState>,
    Query(query): Query<AqiQuery>,
) -> Result<Json<AqiResponse>, AppError> {
    let request = query.into_request().map_err(AqiError::InvalidRequest)?;
    let result = state.service.get_aqi_data(&request).await?;
    Ok(Json(result.into()))
}

async fn nearest_stations(
    State(state): State<AppState>,
    Query(query): Query<NearestQuery>,
) -> Result<Json<NearbyResponse>, AppError> {
    let (lat, lon) = query.coordinates().map_err(AqiError::InvalidRequest)?;
    let stations = state.service.get_nearest_stations(lat, lon).await?;
    Ok(Json(NearbyResponse {
        stations: stations.into_iter().map(Into::into).collect(),
    }))
}

/// Application error type, rendered as `{"error", "kind"}` JSON.
#[derive(Debug)]
pub struct AppError(AqiError);

impl From<AqiError> for AppError {
    fn from(e: AqiError) -> Self {
        AppError(e)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AqiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AqiError::StationNotFound(_) | AqiError::AqiUnavailable { .. } => {
                StatusCode::NOT_FOUND
            }
            AqiError::UpstreamUnavailable(_)
            | AqiError::MalformedFeed(_)
            | AqiError::NarrationFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();

        if status.is_server_error() {
            error!(%status, kind = self.0.kind(), "{message}");
        } else {
            warn!(%status, kind = self.0.kind(), "{message}");
        }

        let body = Json(ErrorResponse {
            error: message,
            kind: self.0.kind(),
        });
        (status, body).into_response()
    }
}
