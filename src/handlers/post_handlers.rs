use axum::extract::{Extension, Query, Request, State};
use axum::response::Response;
use chrono::Utc;
use log::{error, info};
use sea_orm::{EntityTrait, IntoActiveModel, ModelTrait};
use serde::Deserialize;

use entities::comment;
use entities::post_local_model::PostModel;
use entities::prelude::{Comment, Post};

use crate::auth_middleware::CurrentUser;
use crate::handlers::{extract_json, unknown_action};
use crate::responses::post_response::PostLikePayload;
use crate::responses::responses::{
    failure_response, message_response, ok_response, ok_with_count, server_error_response,
};
use crate::sanitize;
use crate::AppState;

#[derive(Deserialize)]
pub struct PostQuery {
    pub action: Option<String>,
    pub post_id: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub contenido: String,
    pub imagen_url: Option<String>,
    pub cancion_nombre: Option<String>,
    pub cancion_artista: Option<String>,
    pub cancion_url: Option<String>,
    pub cancion_id: Option<i32>,
    pub ubicacion: Option<String>,
}

#[derive(Deserialize)]
pub struct PostIdRequest {
    pub post_id: i32,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub post_id: i32,
    pub contenido: String,
}

#[derive(Deserialize)]
pub struct CommentIdRequest {
    pub comment_id: i32,
}

pub async fn posts_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<PostQuery>,
) -> Response {
    match query.action.as_deref() {
        Some("feed") => {
            let (limit, offset) = queries::clamp_page(query.limit, query.offset);
            match queries::get_feed(&state.pool, limit, offset).await {
                Ok(posts) => {
                    let count = posts.len() as u64;
                    ok_with_count(posts, count)
                }
                Err(err) => {
                    error!("feed query failed: {}", err);
                    server_error_response()
                }
            }
        }
        Some("friends-feed") => {
            let (limit, offset) = queries::clamp_page(query.limit, query.offset);
            match queries::get_friends_feed(&state.pool, current.id, limit, offset).await {
                Ok(posts) => {
                    let count = posts.len() as u64;
                    ok_with_count(posts, count)
                }
                Err(err) => {
                    error!("friends feed query failed: {}", err);
                    server_error_response()
                }
            }
        }
        Some("get") => match query.post_id {
            Some(post_id) => match queries::get_post_by_id(&state.pool, post_id).await {
                Ok(Some(post)) => ok_response(post),
                Ok(None) => failure_response("Post not found"),
                Err(err) => {
                    error!("post lookup failed: {}", err);
                    server_error_response()
                }
            },
            None => failure_response("post_id is required"),
        },
        Some("comments") => match query.post_id {
            Some(post_id) => match queries::get_comments_for_post(&state.pool, post_id).await {
                Ok(comments) => {
                    let count = comments.len() as u64;
                    ok_with_count(comments, count)
                }
                Err(err) => {
                    error!("comments query failed: {}", err);
                    server_error_response()
                }
            },
            None => failure_response("post_id is required"),
        },
        other => unknown_action("posts", other),
    }
}

pub async fn posts_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<PostQuery>,
    request: Request,
) -> Response {
    match query.action.as_deref() {
        Some("create") => {
            let body = match extract_json::<CreatePostRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            create_post(&state, &current, body).await
        }
        Some("like") => {
            let body = match extract_json::<PostIdRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            toggle_like(&state, &current, body.post_id).await
        }
        Some("comment") => {
            let body = match extract_json::<CommentRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            add_comment(&state, &current, body).await
        }
        Some("delete-comment") => {
            let body = match extract_json::<CommentIdRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            delete_comment(&state, &current, body.comment_id).await
        }
        Some("delete") => {
            let body = match extract_json::<PostIdRequest>(request).await {
                Ok(body) => body,
                Err(response) => return response,
            };
            delete_post(&state, &current, body.post_id).await
        }
        other => unknown_action("posts", other),
    }
}

async fn create_post(state: &AppState, current: &CurrentUser, body: CreatePostRequest) -> Response {
    let content = sanitize::sanitize_text(&body.contenido);
    if content.is_empty() {
        return failure_response("Post content is required");
    }
    if content.chars().count() > sanitize::MAX_POST_LEN {
        return failure_response("Post content cannot exceed 5000 characters");
    }

    let now = Utc::now().naive_utc();
    let new_post = PostModel {
        user_id: current.id,
        content,
        image_url: sanitize::sanitize_opt(body.imagen_url),
        song_name: sanitize::sanitize_opt(body.cancion_nombre),
        song_artist: sanitize::sanitize_opt(body.cancion_artista),
        song_url: sanitize::sanitize_opt(body.cancion_url),
        song_id: body.cancion_id,
        location: sanitize::sanitize_opt(body.ubicacion),
        created_at: now,
        updated_at: now,
    };

    let inserted = match Post::insert(new_post.into_active_model())
        .exec(&state.connection)
        .await
    {
        Ok(inserted) => inserted,
        Err(err) => {
            error!("post insert failed: {}", err);
            return server_error_response();
        }
    };

    // Hand back the row exactly as the feed would serve it.
    match queries::get_post_by_id(&state.pool, inserted.last_insert_id).await {
        Ok(Some(post)) => {
            info!("post {} created by {}", post.id, current.id);
            ok_response(post)
        }
        Ok(None) => {
            error!("freshly created post {} not found", inserted.last_insert_id);
            server_error_response()
        }
        Err(err) => {
            error!("post reload failed: {}", err);
            server_error_response()
        }
    }
}

async fn toggle_like(state: &AppState, current: &CurrentUser, post_id: i32) -> Response {
    match Post::find_by_id(post_id).one(&state.connection).await {
        Ok(Some(_)) => {}
        Ok(None) => return failure_response("Post not found"),
        Err(err) => {
            error!("post lookup failed: {}", err);
            return server_error_response();
        }
    }

    match queries::toggle_post_like(&state.pool, post_id, current.id).await {
        Ok((liked, total_likes)) => ok_response(PostLikePayload::from_toggle(liked, total_likes)),
        Err(err) => {
            error!("like toggle failed: {}", err);
            server_error_response()
        }
    }
}

async fn add_comment(state: &AppState, current: &CurrentUser, body: CommentRequest) -> Response {
    match Post::find_by_id(body.post_id).one(&state.connection).await {
        Ok(Some(_)) => {}
        Ok(None) => return failure_response("Post not found"),
        Err(err) => {
            error!("post lookup failed: {}", err);
            return server_error_response();
        }
    }

    let content = sanitize::sanitize_text(&body.contenido);
    if content.is_empty() {
        return failure_response("Comment content is required");
    }
    if content.chars().count() > sanitize::MAX_COMMENT_LEN {
        return failure_response("Comment content cannot exceed 1000 characters");
    }

    let new_comment = comment::ActiveModel {
        post_id: sea_orm::ActiveValue::Set(body.post_id),
        user_id: sea_orm::ActiveValue::Set(current.id),
        content: sea_orm::ActiveValue::Set(content),
        created_at: sea_orm::ActiveValue::Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    let inserted = match Comment::insert(new_comment).exec(&state.connection).await {
        Ok(inserted) => inserted,
        Err(err) => {
            error!("comment insert failed: {}", err);
            return server_error_response();
        }
    };

    match queries::get_comment_with_author(&state.pool, inserted.last_insert_id).await {
        Ok(Some(comment_row)) => ok_response(comment_row),
        Ok(None) => {
            error!("freshly created comment {} not found", inserted.last_insert_id);
            server_error_response()
        }
        Err(err) => {
            error!("comment reload failed: {}", err);
            server_error_response()
        }
    }
}

async fn delete_comment(state: &AppState, current: &CurrentUser, comment_id: i32) -> Response {
    let comment_row = match Comment::find_by_id(comment_id).one(&state.connection).await {
        Ok(Some(comment_row)) => comment_row,
        Ok(None) => return failure_response("Comment not found"),
        Err(err) => {
            error!("comment lookup failed: {}", err);
            return server_error_response();
        }
    };

    if comment_row.user_id != current.id {
        return failure_response("You can only delete your own comments");
    }

    match comment_row.delete(&state.connection).await {
        Ok(_) => message_response("Comment deleted"),
        Err(err) => {
            error!("comment delete failed: {}", err);
            server_error_response()
        }
    }
}

async fn delete_post(state: &AppState, current: &CurrentUser, post_id: i32) -> Response {
    let post_row = match Post::find_by_id(post_id).one(&state.connection).await {
        Ok(Some(post_row)) => post_row,
        Ok(None) => return failure_response("Post not found"),
        Err(err) => {
            error!("post lookup failed: {}", err);
            return server_error_response();
        }
    };

    if post_row.user_id != current.id {
        return failure_response("You can only delete your own posts");
    }

    // Likes and comments go with the row; the schema cascades.
    match post_row.delete(&state.connection).await {
        Ok(_) => message_response("Post deleted"),
        Err(err) => {
            error!("post delete failed: {}", err);
            server_error_response()
        }
    }
}
