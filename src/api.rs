use axum::{
    body::Body,
    extract::{Multipart, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use bytes::Bytes;
use log::debug;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, QueryOrder,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use entity::prelude::{File, Song};
use entity::{file, song};

use crate::error::ApiError;
use crate::storage::{sanitize_filename, UploadStore};
use crate::validate;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub uploads: UploadStore,
    pub public_url: String,
}

#[derive(Serialize)]
pub struct FileResponse {
    pub id: i32,
    pub name: String,
}

impl From<file::Model> for FileResponse {
    fn from(model: file::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Serialize)]
pub struct SongResponse {
    pub id: i32,
    pub file: FileResponse,
}

impl SongResponse {
    fn new(song: song::Model, file: file::Model) -> Self {
        Self {
            id: song.id,
            file: file.into(),
        }
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub id: i32,
    pub name: String,
    pub path: String,
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/songs", get(songs_get).post(song_post))
        .route("/songs/:id/delete", get(song_delete))
        .route("/songs/:id/edit", put(song_edit))
        .route(
            "/files",
            post(file_post).layer(middleware::from_fn(require_multipart)),
        )
        .layer(middleware::from_fn(accept_json));

    Router::new()
        .nest("/api", api)
        .route("/uploads/:filename", get(uploaded_file))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Every /api route requires the client to accept JSON. An absent Accept
// header counts as accepting anything.
async fn accept_json(request: Request, next: Next) -> Response {
    if accepts_json(request.headers()) {
        next.run(request).await
    } else {
        ApiError::NotAcceptable("application/json").into_response()
    }
}

fn accepts_json(headers: &HeaderMap) -> bool {
    let accept = match headers.get(header::ACCEPT) {
        Some(value) => value,
        None => return true,
    };
    let accept = match accept.to_str() {
        Ok(accept) => accept,
        Err(_) => return false,
    };

    accept.split(',').any(|part| {
        let mime = part.split(';').next().unwrap_or("").trim();
        mime == "application/json" || mime == "*/*" || mime == "application/*"
    })
}

async fn require_multipart(request: Request, next: Next) -> Response {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        next.run(request).await
    } else {
        ApiError::UnsupportedMediaType("multipart/form-data").into_response()
    }
}

// GET /api/songs - List all songs with their file projections
async fn songs_get(
    State(state): State<AppState>,
) -> Result<Json<Vec<SongResponse>>, ApiError> {
    let songs = Song::find()
        .find_also_related(File)
        .order_by_asc(song::Column::Id)
        .all(&state.db)
        .await?;

    let mut out = Vec::with_capacity(songs.len());
    for (song, file) in songs {
        let file = file.ok_or_else(|| missing_relation(song.id))?;
        out.push(SongResponse::new(song, file));
    }

    Ok(Json(out))
}

// POST /api/songs - Create a song referencing an existing file
async fn song_post(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    let file_id = validate::song_create(&payload)?;

    let file = File::find_by_id(file_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Could not find file with id{}", file_id))
        })?;

    let song = song::ActiveModel {
        id: NotSet,
        file_id: Set(file.id),
    }
    .insert(&state.db)
    .await?;
    debug!("Created song id{} for file id{}", song.id, file.id);

    let location = format!("/api/songs/{}", song.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(SongResponse::new(song, file)),
    )
        .into_response())
}

// GET /api/songs/:id/delete - Delete a song and its file record
async fn song_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    // Existence is checked before touching the file relation.
    let song = Song::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Could not find song with id{}", id)))?;

    let file_id = song.file_id;
    song.delete(&state.db).await?;
    if let Some(file) = File::find_by_id(file_id).one(&state.db).await? {
        file.delete(&state.db).await?;
    }
    debug!("Deleted song id{} and file id{}", id, file_id);

    Ok(Json(json!({ "message": format!("Deleted song id{}", id) })))
}

// PUT /api/songs/:id/edit - Rename the file behind a song
async fn song_edit(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    let name = validate::song_edit(&payload)?;

    let song = Song::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Could not find song with id{}", id)))?;
    let file = song
        .find_related(File)
        .one(&state.db)
        .await?
        .ok_or_else(|| missing_relation(song.id))?;

    let mut file: file::ActiveModel = file.into();
    file.name = Set(name);
    let file = file.update(&state.db).await?;

    let location = format!("/api/songs/{}", song.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(SongResponse::new(song, file)),
    )
        .into_response())
}

// GET /uploads/:filename - Serve uploaded bytes from the upload directory
async fn uploaded_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let name = sanitize_filename(&filename)
        .ok_or_else(|| ApiError::NotFound(format!("Could not find file {}", filename)))?;
    let path = state.uploads.path(Some(&name));
    if !path.is_file() {
        return Err(ApiError::NotFound(format!("Could not find file {}", name)));
    }

    let contents = tokio::fs::read(&path).await?;
    let mime_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CONTENT_LENGTH, contents.len().to_string())
        .body(Body::from(contents))?;
    Ok(response)
}

// POST /api/files - Accept a multipart upload and record it
async fn file_post(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::Validation(format!("Malformed multipart body: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().and_then(sanitize_filename);
        let data = field.bytes().await.map_err(|e| {
            ApiError::Validation(format!("Malformed multipart body: {}", e))
        })?;
        if let Some(name) = name {
            upload = Some((name, data));
        }
    }

    let (name, data) = upload
        .ok_or_else(|| ApiError::Validation("Could not find file data".to_string()))?;

    let record = file::ActiveModel {
        id: NotSet,
        name: Set(name.clone()),
    }
    .insert(&state.db)
    .await?;

    tokio::fs::write(state.uploads.path(Some(&name)), &data).await?;
    debug!("Stored upload {} as file id{}", name, record.id);

    let response = UploadResponse {
        path: format!("{}/uploads/{}", state.public_url, record.name),
        id: record.id,
        name: record.name,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

// Songs are created with their file row in one request, so a missing
// relation means the database itself is inconsistent.
fn missing_relation(song_id: i32) -> ApiError {
    ApiError::Db(DbErr::RecordNotFound(format!(
        "file row for song id{}",
        song_id
    )))
}
