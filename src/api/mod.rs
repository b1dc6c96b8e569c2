use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    ErrorKind, IsochroneError,
    config::DefaultsConfig,
    models::{Location, Marker, TravelMode},
    session::IsochroneSession,
};

const NO_AREA_FOR_ANY_MODE: &str =
    "No reachable area found for the selected locations and travel modes.";

/// Shared handler state
pub struct AppState {
    pub session: IsochroneSession,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Deserialize)]
pub struct IntersectionRequest {
    pub locations: Vec<String>,
    #[serde(default)]
    pub modes: Vec<TravelMode>,
    pub minutes: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ModeArea {
    pub mode: TravelMode,
    pub color: &'static str,
    pub geometry: geojson::Geometry,
}

#[derive(Debug, Serialize)]
pub struct IntersectionResponse {
    pub areas: Vec<ModeArea>,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: String,
    kind: ErrorKind,
}

/// Error rendered as `{ error, kind }` with a status derived from the kind
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::GeocodingFailed => StatusCode::NOT_FOUND,
            ErrorKind::NoCommonArea => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::IsochroneFetchFailed | ErrorKind::Network => StatusCode::BAD_GATEWAY,
            ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<IsochroneError> for ApiError {
    fn from(err: IsochroneError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiErrorBody {
            error: self.message,
            kind: self.kind,
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/intersection", post(compute_intersection))
        .route("/geocode", post(geocode))
        .route("/health", get(health))
        .with_state(state)
}

/// One session per mode, run concurrently. Modes without a common area are
/// dropped; any other failure fails the request.
async fn compute_intersection(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IntersectionRequest>,
) -> Result<Json<IntersectionResponse>, ApiError> {
    let mut modes = if request.modes.is_empty() {
        state.defaults.travel_modes.clone()
    } else {
        request.modes
    };
    let mut seen = HashSet::new();
    modes.retain(|mode| seen.insert(*mode));
    let minutes = request.minutes.unwrap_or(state.defaults.travel_minutes);
    let range_seconds = minutes
        .checked_mul(60)
        .ok_or_else(|| IsochroneError::invalid_input("travel time is too large"))?;

    let runs = modes
        .iter()
        .map(|&mode| state.session.run(&request.locations, mode, range_seconds));
    let results = join_all(runs).await;

    let mut areas = Vec::new();
    let mut markers = None;

    for (mode, result) in modes.into_iter().zip(results) {
        match result {
            Ok(result) => {
                markers.get_or_insert(result.markers);
                areas.push(ModeArea {
                    mode,
                    color: mode.color(),
                    geometry: result.polygon,
                });
            }
            Err(err) if err.is_no_common_area() => {
                info!("No common {} area, dropping mode", mode);
            }
            Err(err) => {
                warn!("Intersection for {} failed: {}", mode, err);
                return Err(err.into());
            }
        }
    }

    let Some(markers) = markers else {
        return Err(ApiError {
            kind: ErrorKind::NoCommonArea,
            message: NO_AREA_FOR_ANY_MODE.to_string(),
        });
    };

    Ok(Json(IntersectionResponse { areas, markers }))
}

async fn geocode(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GeocodeRequest>,
) -> Result<Json<Location>, ApiError> {
    let location = state.session.resolver().resolve(&request.address).await?;
    Ok(Json(location))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}
