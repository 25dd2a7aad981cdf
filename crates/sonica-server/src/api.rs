use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

use sonica_store::{Database, StoreError};

use crate::audio_store::AudioStore;
use crate::auth;
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::transcoder::Transcoder;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub audio_store: Arc<AudioStore>,
    pub transcoder: Arc<dyn Transcoder>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/users", post(create_user))
        .route("/users/:user_id", delete(delete_user))
        .route("/audio", post(upload_audio).get(download_audio))
        .route("/audio/:public_id", delete(delete_audio))
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Deserialize)]
struct CreateUserRequest {
    name: String,
}

#[derive(Serialize)]
struct CreateUserResponse {
    user_id: i64,
    token: String,
}

#[derive(Serialize)]
struct UploadResponse {
    download_url: String,
}

#[derive(Deserialize)]
struct DownloadQuery {
    public_id: Uuid,
    user_id: i64,
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to sonica. Upload a WAV file and download it back as MP3.",
    }))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ─── Users ───

async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("User name must not be empty".to_string()));
    }

    let user = {
        let db = state.db.lock().await;
        db.create_user(name)?
    };

    info!(user_id = user.id, name = %user.name, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            user_id: user.id,
            token: user.token,
        }),
    ))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    {
        let mut db = state.db.lock().await;
        db.delete_user(user_id).map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("User not found".to_string()),
            other => other.into(),
        })?;
    }

    info!(user_id, "User deleted with all audio records");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ─── Audio ───

async fn upload_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut user_id: Option<i64> = None;
    let mut token: Option<String> = None;
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "user_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?;
                let parsed = text.trim().parse::<i64>().map_err(|_| {
                    ApiError::BadRequest(format!("Invalid user_id: '{}'", text.trim()))
                })?;
                user_id = Some(parsed);
            }
            "token" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?;
                token = Some(text);
            }
            "file" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?;
                file_data = Some(data.to_vec());
            }
            other => {
                debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let user_id =
        user_id.ok_or_else(|| ApiError::BadRequest("Missing 'user_id' field".to_string()))?;
    let token = token.ok_or_else(|| ApiError::BadRequest("Missing 'token' field".to_string()))?;
    let data =
        file_data.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;

    {
        let db = state.db.lock().await;
        auth::authorize_upload(&db, user_id, &token)?;
    }

    let stored = state.audio_store.store_wav(&data).await?;

    // A failed conversion leaves the raw wav on disk and creates no record.
    state
        .transcoder
        .transcode(&stored.wav_path, &stored.mp3_path)
        .await
        .map_err(|e| ApiError::Conversion(e.to_string()))?;

    let public_id = Uuid::new_v4();
    let record = {
        let db = state.db.lock().await;
        db.create_record(user_id, public_id, &stored.mp3_path.to_string_lossy())?
    };

    info!(
        user_id,
        public_id = %record.public_id,
        path = %record.file_path,
        "Audio uploaded and converted"
    );

    let download_url = format!(
        "{}/audio?public_id={}&user_id={}",
        state.config.public_base_url, record.public_id, user_id
    );

    Ok((StatusCode::CREATED, Json(UploadResponse { download_url })))
}

async fn download_audio(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let record = {
        let db = state.db.lock().await;

        db.get_user(query.user_id).map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("User not found".to_string()),
            other => other.into(),
        })?;

        let record = db
            .get_record_by_public_id(query.public_id)
            .map_err(|e| match e {
                StoreError::NotFound => ApiError::NotFound("Audio record not found".to_string()),
                other => other.into(),
            })?;

        // An ownership mismatch is reported as absence so that public ids
        // cannot be probed across users.
        if record.user_id != query.user_id {
            return Err(ApiError::NotFound("Audio record not found".to_string()));
        }

        record
    };

    let data = state.audio_store.read(FsPath::new(&record.file_path)).await?;

    debug!(public_id = %record.public_id, size = data.len(), "Serving audio download");

    let headers = [
        (header::CONTENT_TYPE, "audio/mpeg".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.mp3\"", record.public_id),
        ),
    ];
    Ok((headers, data))
}

async fn delete_audio(
    State(state): State<AppState>,
    Path(public_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Deletion is by public id alone; the row goes away, the file stays.
    let deleted = {
        let db = state.db.lock().await;
        db.delete_record(public_id)?
    };

    if !deleted {
        return Err(ApiError::NotFound("Audio record not found".to_string()));
    }

    info!(%public_id, "Audio record deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
