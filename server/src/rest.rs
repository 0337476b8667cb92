//! REST-Interface fuer den Auth-Service (/v1/auth/...)
//!
//! Jeder Handler ruft genau eine Service-Operation auf und bildet die
//! [`FehlerArt`] auf einen HTTP-Statuscode ab.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use zugang_auth::{AuthError, FehlerArt, TokenPaar};

use crate::AuthDienst;

/// Axum-State fuer den REST-Server
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthDienst>,
}

impl AppState {
    pub fn neu(auth: Arc<AuthDienst>) -> Self {
        Self { auth }
    }
}

/// HTTP-Statuscode fuer eine Fehlerklasse
pub fn http_status(art: FehlerArt) -> StatusCode {
    match art {
        FehlerArt::Validierung => StatusCode::BAD_REQUEST,
        FehlerArt::NichtAutorisiert => StatusCode::UNAUTHORIZED,
        FehlerArt::Konflikt => StatusCode::CONFLICT,
        FehlerArt::NichtVerfuegbar => StatusCode::SERVICE_UNAVAILABLE,
        FehlerArt::Intern => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Fehlerantwort fuer REST-API
pub fn fehler_antwort(status: StatusCode, nachricht: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": status.as_u16(),
                "message": nachricht
            }
        })),
    )
        .into_response()
}

/// Fehler eines Handlers, immer im `{"error": {...}}`-Format
#[derive(Debug)]
pub struct ApiFehler {
    status: StatusCode,
    nachricht: String,
}

impl From<AuthError> for ApiFehler {
    /// Nur die oeffentliche Meldung verlaesst den Server
    fn from(e: AuthError) -> Self {
        Self {
            status: http_status(e.art()),
            nachricht: e.oeffentliche_meldung(),
        }
    }
}

impl From<JsonRejection> for ApiFehler {
    fn from(r: JsonRejection) -> Self {
        Self {
            status: r.status(),
            nachricht: r.body_text(),
        }
    }
}

impl IntoResponse for ApiFehler {
    fn into_response(self) -> Response {
        fehler_antwort(self.status, &self.nachricht)
    }
}

/// JSON-Body-Extraktor, dessen Ablehnungen als [`ApiFehler`] antworten
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiFehler))]
pub struct JsonBody<T>(pub T);

/// Request-Body fuer Registrierung und Login
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct Zugangsdaten {
    pub email: String,
    pub password: String,
}

/// Request-Body fuer Refresh und Logout
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct RefreshAnfrage {
    pub refresh_token: String,
}

/// Antwort von GET /v1/auth/token
#[derive(Debug, Serialize)]
pub struct TokenInfo {
    pub user_id: String,
    pub jti: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// POST /v1/auth/register
pub async fn registrieren(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Zugangsdaten>,
) -> Result<Json<serde_json::Value>, ApiFehler> {
    let user_id = state.auth.registrieren(&body.email, &body.password).await?;
    Ok(Json(json!({ "status": "ok", "user_id": user_id })))
}

/// POST /v1/auth/login
pub async fn anmelden(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Zugangsdaten>,
) -> Result<Json<TokenPaar>, ApiFehler> {
    let paar = state.auth.anmelden(&body.email, &body.password).await?;
    Ok(Json(paar))
}

/// POST /v1/auth/refresh
pub async fn erneuern(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RefreshAnfrage>,
) -> Result<Json<TokenPaar>, ApiFehler> {
    let paar = state.auth.erneuern(&body.refresh_token).await?;
    Ok(Json(paar))
}

/// POST /v1/auth/logout
pub async fn abmelden(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RefreshAnfrage>,
) -> Result<Json<serde_json::Value>, ApiFehler> {
    state.auth.abmelden(&body.refresh_token).await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// GET /v1/auth/token – prueft das Bearer-Token und gibt dessen Claims zurueck
pub async fn token_pruefen(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return fehler_antwort(StatusCode::UNAUTHORIZED, "Authorization-Header fehlt");
    };

    match state.auth.access_token_pruefen(token) {
        Ok(claims) => Json(TokenInfo {
            user_id: claims.sub,
            jti: claims.jti,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
        .into_response(),
        Err(e) => ApiFehler::from(e).into_response(),
    }
}

/// GET /health – Health-Check-Endpunkt
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Extrahiert Bearer-Token aus Authorization-Header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Erstellt den vollstaendigen Router inkl. Tracing und CORS
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    // CORS konfigurieren: entweder spezifische Origins oder Any
    let cors = if cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(tower_http::cors::Any)
    };

    Router::new()
        .route("/health", get(health))
        .route("/v1/auth/register", post(registrieren))
        .route("/v1/auth/login", post(anmelden))
        .route("/v1/auth/refresh", post(erneuern))
        .route("/v1/auth/logout", post(abmelden))
        .route("/v1/auth/token", get(token_pruefen))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
