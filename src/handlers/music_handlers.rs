use std::net::SocketAddr;
use std::path::Path;

use axum::body::Body;
use axum::extract::{ConnectInfo, Extension, Multipart, Query, Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use log::{error, info, warn};
use sea_orm::{EntityTrait, IntoActiveModel, ModelTrait};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use entities::prelude::Song;
use entities::song_local_model::SongModel;

use crate::auth_middleware::CurrentUser;
use crate::handlers::{extract_json, unknown_action};
use crate::responses::music_response::{SongLikePayload, UploadPayload};
use crate::responses::responses::{
    failure_response, message_response, ok_response, ok_with_count, server_error_response,
};
use crate::{audio_probe, sanitize, storage, AppState};
use axum::RequestExt;

#[derive(Deserialize)]
pub struct MusicQuery {
    pub action: Option<String>,
    pub song_id: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct SongIdRequest {
    pub song_id: i32,
}

#[derive(Deserialize)]
pub struct PlayRequest {
    pub song_id: i32,
    pub segundos: Option<i32>,
    pub completado: Option<bool>,
}

pub async fn music_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<MusicQuery>,
) -> Response {
    match query.action.as_deref() {
        Some("list") => {
            let (limit, offset) = queries::clamp_page(query.limit, query.offset);
            match queries::list_songs(&state.pool, limit, offset).await {
                Ok(songs) => {
                    let count = songs.len() as u64;
                    ok_with_count(songs, count)
                }
                Err(err) => {
                    error!("song list failed: {}", err);
                    server_error_response()
                }
            }
        }
        Some("mine") => match queries::list_songs_by_user(&state.pool, current.id).await {
            Ok(songs) => {
                let count = songs.len() as u64;
                ok_with_count(songs, count)
            }
            Err(err) => {
                error!("own song list failed: {}", err);
                server_error_response()
            }
        },
        Some("get") => match query.song_id {
            Some(song_id) => match queries::get_song_by_id(&state.pool, song_id).await {
                Ok(Some(song)) => ok_response(song),
                Ok(None) => failure_response("Song not found"),
                Err(err) => {
                    error!("song lookup failed: {}", err);
                    server_error_response()
                }
            },
            None => failure_response("song_id is required"),
        },
        Some("stream") => match query.song_id {
            Some(song_id) => stream_song(&state, song_id).await,
            None => failure_response("song_id is required"),
        },
        other => unknown_action("music", other),
    }
}

pub async fn music_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<MusicQuery>,
    request: Request,
) -> Response {
    match query.action.as_deref() {
        Some("upload") => upload_song(&state, &current, request).await,
        Some("like") => {
            let body = match extract_json::<SongIdRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            toggle_song_like(&state, &current, body.song_id).await
        }
        Some("play") => {
            let body = match extract_json::<PlayRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            register_play(&state, &current, body, addr).await
        }
        Some("delete") => {
            let body = match extract_json::<SongIdRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            delete_song(&state, &current, body.song_id).await
        }
        other => unknown_action("music", other),
    }
}

struct UploadForm {
    file_bytes: Option<axum::body::Bytes>,
    file_ext: Option<String>,
    titulo: Option<String>,
    artista: Option<String>,
    genero: Option<String>,
    portada_url: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, Response> {
    let mut form = UploadForm {
        file_bytes: None,
        file_ext: None,
        titulo: None,
        artista: None,
        genero: None,
        portada_url: None,
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                warn!("could not read multipart field: {}", err);
                return Err(failure_response("Could not read the upload"));
            }
        };

        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                form.file_ext = field
                    .file_name()
                    .and_then(|f| Path::new(f).extension().and_then(|e| e.to_str()))
                    .map(|e| e.to_ascii_lowercase());
                match field.bytes().await {
                    Ok(bytes) => form.file_bytes = Some(bytes),
                    Err(err) => {
                        warn!("could not read uploaded file: {}", err);
                        return Err(failure_response("Could not read the uploaded file"));
                    }
                }
            }
            Some("titulo") => form.titulo = field.text().await.ok(),
            Some("artista") => form.artista = field.text().await.ok(),
            Some("genero") => form.genero = field.text().await.ok(),
            Some("portada_url") => form.portada_url = field.text().await.ok(),
            _ => {}
        }
    }

    Ok(form)
}

/// Upload discipline: stage the bytes under a `.part` name, probe the
/// duration, commit the metadata row, then rename into place. A failed
/// insert removes the staged file; a crash in between leaves only a staged
/// file for the boot sweep to collect.
async fn upload_song(state: &AppState, current: &CurrentUser, request: Request) -> Response {
    let multipart = match request.extract::<Multipart, _>().await {
        Ok(multipart) => multipart,
        Err(err) => {
            warn!("expected multipart upload: {}", err);
            return failure_response("Expected multipart form data");
        }
    };

    let form = match read_upload_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let bytes = match form.file_bytes {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return failure_response("Audio file is required"),
    };
    let title = match form.titulo.map(|t| sanitize::sanitize_text(&t)) {
        Some(title) if !title.is_empty() => title,
        _ => return failure_response("titulo is required"),
    };
    let artist = match form.artista.map(|a| sanitize::sanitize_text(&a)) {
        Some(artist) if !artist.is_empty() => artist,
        _ => return failure_response("artista is required"),
    };
    let ext = match form.file_ext {
        Some(ext) if storage::extension_allowed(&ext) => ext,
        _ => return failure_response("Unsupported audio format"),
    };
    let max_bytes = state.config.max_upload_mb * 1024 * 1024;
    if bytes.len() as u64 > max_bytes {
        return failure_response("File exceeds the upload size limit");
    }

    let root = state.config.storage_root_path();
    let staged = match storage::stage_audio(root, &ext, &bytes).await {
        Ok(staged) => staged,
        Err(err) => {
            error!("could not stage upload: {}", err);
            return server_error_response();
        }
    };

    let file_size = bytes.len() as u64;
    let probe_path = staged.staged_path.to_owned();
    let (duration, tag_genre) = match tokio::task::spawn_blocking(move || {
        let duration = audio_probe::duration_or_estimate(&probe_path, file_size);
        let genre = audio_probe::genre_from_tags(&probe_path);
        (duration, genre)
    })
    .await
    {
        Ok(probed) => probed,
        Err(err) => {
            warn!("duration probe task failed: {}", err);
            (audio_probe::estimate_from_size(file_size), None)
        }
    };

    let genre = sanitize::sanitize_opt(form.genero).or(tag_genre);

    let new_song = SongModel {
        user_id: current.id,
        title,
        artist,
        genre,
        file_url: staged.relative_url.to_owned(),
        cover_url: sanitize::sanitize_opt(form.portada_url),
        duration,
        file_size: file_size as i64,
        play_count: 0,
        like_count: 0,
        active: true,
        created_at: Utc::now().naive_utc(),
    };

    let inserted = match Song::insert(new_song.into_active_model())
        .exec(&state.connection)
        .await
    {
        Ok(inserted) => inserted,
        Err(err) => {
            error!("song insert failed: {}", err);
            staged.discard().await;
            return server_error_response();
        }
    };

    if let Err(err) = staged.commit().await {
        // The row exists but the audio never made it; undo the row.
        error!("could not move staged file into place: {}", err);
        if let Err(err) = Song::delete_by_id(inserted.last_insert_id)
            .exec(&state.connection)
            .await
        {
            error!("could not undo song row {}: {}", inserted.last_insert_id, err);
        }
        staged.discard().await;
        return server_error_response();
    }

    info!(
        "song {} uploaded by {} ({} bytes, {}s)",
        inserted.last_insert_id, current.id, file_size, duration
    );
    ok_response(UploadPayload {
        song_id: inserted.last_insert_id,
        archivo_url: staged.relative_url,
        duracion: duration,
    })
}

async fn toggle_song_like(state: &AppState, current: &CurrentUser, song_id: i32) -> Response {
    match Song::find_by_id(song_id).one(&state.connection).await {
        Ok(Some(song_row)) if song_row.active => {}
        Ok(_) => return failure_response("Song not found"),
        Err(err) => {
            error!("song lookup failed: {}", err);
            return server_error_response();
        }
    }

    match queries::toggle_song_like(&state.pool, song_id, current.id).await {
        Ok((liked, total_likes)) => ok_response(SongLikePayload { liked, total_likes }),
        Err(err) => {
            error!("song like toggle failed: {}", err);
            server_error_response()
        }
    }
}

async fn register_play(
    state: &AppState,
    current: &CurrentUser,
    body: PlayRequest,
    addr: SocketAddr,
) -> Response {
    let seconds = body.segundos.unwrap_or(0).max(0);
    let completed = body.completado.unwrap_or(false);
    let ip = addr.ip().to_string();

    match queries::record_play(
        &state.pool,
        body.song_id,
        Some(current.id),
        seconds,
        completed,
        &ip,
    )
    .await
    {
        Ok(()) => message_response("Play registered"),
        Err(sqlx::Error::RowNotFound) => failure_response("Song not found"),
        Err(err) => {
            error!("play bookkeeping failed: {}", err);
            server_error_response()
        }
    }
}

async fn delete_song(state: &AppState, current: &CurrentUser, song_id: i32) -> Response {
    let song_row = match Song::find_by_id(song_id).one(&state.connection).await {
        Ok(Some(song_row)) => song_row,
        Ok(None) => return failure_response("Song not found"),
        Err(err) => {
            error!("song lookup failed: {}", err);
            return server_error_response();
        }
    };

    if song_row.user_id != current.id {
        return failure_response("You can only delete your own songs");
    }

    // File removal failures are logged and swallowed; the row still goes.
    let root = state.config.storage_root_path();
    storage::remove_media(root, &song_row.file_url).await;
    if let Some(cover_url) = &song_row.cover_url {
        if !cover_url.starts_with("http") {
            storage::remove_media(root, cover_url).await;
        }
    }

    match song_row.delete(&state.connection).await {
        Ok(_) => message_response("Song deleted"),
        Err(err) => {
            error!("song delete failed: {}", err);
            server_error_response()
        }
    }
}

async fn stream_song(state: &AppState, song_id: i32) -> Response {
    let song_row = match Song::find_by_id(song_id).one(&state.connection).await {
        Ok(Some(song_row)) if song_row.active => song_row,
        Ok(_) => return failure_response("Song not found"),
        Err(err) => {
            error!("song lookup failed: {}", err);
            return server_error_response();
        }
    };

    let path = storage::resolve(state.config.storage_root_path(), &song_row.file_url);
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) => {
            error!("audio file missing for song {}: {}", song_row.id, err);
            return failure_response("Audio file not found");
        }
    };

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);
    let headers = [(
        header::CONTENT_TYPE,
        storage::content_type_for(&song_row.file_url),
    )];
    (headers, body).into_response()
}
