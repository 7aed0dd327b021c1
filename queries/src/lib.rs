use entities::friendship_local_model::FriendSqlxModel;
use entities::post_local_model::{CommentSqlxModel, PostSqlxModel};
use entities::song_local_model::SongSqlxModel;
use entities::user_local_model::{UserSqlxModel, UserStatsModel};
use log::warn;
use sqlx::{Pool, Postgres};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Normalize client-supplied paging. Anything absent or out of range falls
/// back to a sane window instead of failing the request.
pub fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = match limit {
        Some(l) if l > 0 => l.min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    };
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

const POST_SELECT: &str = r#"
select p.id, p.user_id, p.content, p.image_url, p.song_name, p.song_artist,
       p.song_url, p.song_id, p.location, p.created_at, p.updated_at,
       u.username, u.name, u.avatar_url,
       (select count(*) from post_likes pl where pl.post_id = p.id) as total_likes,
       (select count(*) from comments c where c.post_id = p.id) as total_comments
from posts p
join users u on u.id = p.user_id
"#;

pub async fn get_feed(
    pool: &Pool<Postgres>,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostSqlxModel>, sqlx::Error> {
    let sql = format!(
        "{} order by p.created_at desc, p.id desc limit $1 offset $2",
        POST_SELECT
    );
    sqlx::query_as::<_, PostSqlxModel>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn get_friends_feed(
    pool: &Pool<Postgres>,
    user_id: i32,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostSqlxModel>, sqlx::Error> {
    let sql = format!(
        r#"{}
where p.user_id = $1
   or p.user_id in (
        select case when f.requester_id = $1 then f.recipient_id else f.requester_id end
        from friendships f
        where (f.requester_id = $1 or f.recipient_id = $1) and f.status = 'aceptada')
order by p.created_at desc, p.id desc limit $2 offset $3"#,
        POST_SELECT
    );
    sqlx::query_as::<_, PostSqlxModel>(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn get_post_by_id(
    pool: &Pool<Postgres>,
    post_id: i32,
) -> Result<Option<PostSqlxModel>, sqlx::Error> {
    let sql = format!("{} where p.id = $1", POST_SELECT);
    sqlx::query_as::<_, PostSqlxModel>(&sql)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

const COMMENT_SELECT: &str = r#"
select c.id, c.post_id, c.user_id, c.content, c.created_at,
       u.username, u.name, u.avatar_url
from comments c
join users u on u.id = c.user_id
"#;

pub async fn get_comments_for_post(
    pool: &Pool<Postgres>,
    post_id: i32,
) -> Result<Vec<CommentSqlxModel>, sqlx::Error> {
    let sql = format!(
        "{} where c.post_id = $1 order by c.created_at asc, c.id asc",
        COMMENT_SELECT
    );
    sqlx::query_as::<_, CommentSqlxModel>(&sql)
        .bind(post_id)
        .fetch_all(pool)
        .await
}

pub async fn get_comment_with_author(
    pool: &Pool<Postgres>,
    comment_id: i32,
) -> Result<Option<CommentSqlxModel>, sqlx::Error> {
    let sql = format!("{} where c.id = $1", COMMENT_SELECT);
    sqlx::query_as::<_, CommentSqlxModel>(&sql)
        .bind(comment_id)
        .fetch_optional(pool)
        .await
}

/// Toggle a post like. The unique index on (post_id, user_id) is the
/// existence check: a conflicting insert means the like was already there,
/// so the toggle removes it. Returns (liked, total_likes).
pub async fn toggle_post_like(
    pool: &Pool<Postgres>,
    post_id: i32,
    user_id: i32,
) -> Result<(bool, i64), sqlx::Error> {
    let inserted = sqlx::query(
        "insert into post_likes (post_id, user_id, created_at) values ($1, $2, now()) \
         on conflict (post_id, user_id) do nothing",
    )
    .bind(post_id)
    .bind(user_id)
    .execute(pool)
    .await?
    .rows_affected();

    let liked = inserted == 1;
    if !liked {
        sqlx::query("delete from post_likes where post_id = $1 and user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(pool)
            .await?;
    }

    let total: i64 = sqlx::query_scalar("select count(*) from post_likes where post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await?;
    Ok((liked, total))
}

/// Toggle a song like together with the denormalized counter, atomically.
/// Returns (liked, like_count).
pub async fn toggle_song_like(
    pool: &Pool<Postgres>,
    song_id: i32,
    user_id: i32,
) -> Result<(bool, i32), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        "insert into song_likes (song_id, user_id, created_at) values ($1, $2, now()) \
         on conflict (song_id, user_id) do nothing",
    )
    .bind(song_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let liked = inserted == 1;
    if liked {
        sqlx::query("update songs set like_count = like_count + 1 where id = $1")
            .bind(song_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query("delete from song_likes where song_id = $1 and user_id = $2")
            .bind(song_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("update songs set like_count = greatest(like_count - 1, 0) where id = $1")
            .bind(song_id)
            .execute(&mut *tx)
            .await?;
    }

    let total: i32 = sqlx::query_scalar("select like_count from songs where id = $1")
        .bind(song_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok((liked, total))
}

/// Bump the play counter and append the play-log row. Deliberately not
/// transactional; repeated rapid calls each count (observed behavior).
pub async fn record_play(
    pool: &Pool<Postgres>,
    song_id: i32,
    user_id: Option<i32>,
    seconds_played: i32,
    completed: bool,
    ip: &str,
) -> Result<(), sqlx::Error> {
    let updated = sqlx::query("update songs set play_count = play_count + 1 where id = $1")
        .bind(song_id)
        .execute(pool)
        .await?
        .rows_affected();
    if updated == 0 {
        return Err(sqlx::Error::RowNotFound);
    }

    sqlx::query(
        "insert into play_logs (song_id, user_id, seconds_played, completed, ip, created_at) \
         values ($1, $2, $3, $4, $5, now())",
    )
    .bind(song_id)
    .bind(user_id)
    .bind(seconds_played)
    .bind(completed)
    .bind(ip)
    .execute(pool)
    .await?;
    Ok(())
}

const FRIEND_SELECT: &str = r#"
select f.id as friendship_id, u.id, u.username, u.name, u.avatar_url, u.bio, u.presence
from friendships f
"#;

/// Accepted friends of `user_id`: the counterpart user of every accepted
/// row touching them, online first, then by name.
pub async fn get_friends_list(
    pool: &Pool<Postgres>,
    user_id: i32,
) -> Result<Vec<FriendSqlxModel>, sqlx::Error> {
    let sql = format!(
        r#"{}
join users u on u.id = case when f.requester_id = $1 then f.recipient_id else f.requester_id end
where (f.requester_id = $1 or f.recipient_id = $1) and f.status = 'aceptada'
order by case when u.presence = 'online' then 0 else 1 end, u.name asc"#,
        FRIEND_SELECT
    );
    sqlx::query_as::<_, FriendSqlxModel>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Incoming pending requests, newest first; the clients poll this.
pub async fn get_pending_requests(
    pool: &Pool<Postgres>,
    user_id: i32,
) -> Result<Vec<FriendSqlxModel>, sqlx::Error> {
    let sql = format!(
        r#"{}
join users u on u.id = f.requester_id
where f.recipient_id = $1 and f.status = 'pendiente'
order by f.requested_at desc"#,
        FRIEND_SELECT
    );
    sqlx::query_as::<_, FriendSqlxModel>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Substring search on username/name. Email is selected as NULL on purpose:
/// search results must not expose it.
pub async fn search_users(
    pool: &Pool<Postgres>,
    term: &str,
    limit: i64,
) -> Result<Vec<UserSqlxModel>, sqlx::Error> {
    let pattern = format!("%{}%", term);
    sqlx::query_as::<_, UserSqlxModel>(
        r#"select id, username, name, null::varchar as email, avatar_url, bio,
       favorite_genre, status_song, presence
from users
where username ilike $1 or name ilike $1
order by username asc
limit $2"#,
    )
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Three independent aggregates; a failing one degrades to zero instead of
/// failing the whole profile.
pub async fn get_user_stats(pool: &Pool<Postgres>, user_id: i32) -> UserStatsModel {
    let total_posts = sqlx::query_scalar("select count(*) from posts where user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| {
            warn!("post count failed for user {}: {}", user_id, e);
            0
        });

    let total_friends = sqlx::query_scalar(
        "select count(*) from friendships \
         where (requester_id = $1 or recipient_id = $1) and status = 'aceptada'",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| {
        warn!("friend count failed for user {}: {}", user_id, e);
        0
    });

    let total_likes_received = sqlx::query_scalar(
        "select count(*) from post_likes pl \
         join posts p on p.id = pl.post_id where p.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| {
        warn!("likes-received count failed for user {}: {}", user_id, e);
        0
    });

    UserStatsModel {
        total_posts,
        total_friends,
        total_likes_received,
    }
}

const SONG_SELECT: &str = r#"
select s.id, s.user_id, s.title, s.artist, s.genre, s.file_url, s.cover_url,
       s.duration, s.file_size, s.play_count, s.like_count as total_likes,
       s.created_at, u.username, u.name
from songs s
join users u on u.id = s.user_id
"#;

pub async fn list_songs(
    pool: &Pool<Postgres>,
    limit: i64,
    offset: i64,
) -> Result<Vec<SongSqlxModel>, sqlx::Error> {
    let sql = format!(
        "{} where s.active order by s.created_at desc, s.id desc limit $1 offset $2",
        SONG_SELECT
    );
    sqlx::query_as::<_, SongSqlxModel>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn list_songs_by_user(
    pool: &Pool<Postgres>,
    user_id: i32,
) -> Result<Vec<SongSqlxModel>, sqlx::Error> {
    let sql = format!(
        "{} where s.user_id = $1 and s.active order by s.created_at desc, s.id desc",
        SONG_SELECT
    );
    sqlx::query_as::<_, SongSqlxModel>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn get_song_by_id(
    pool: &Pool<Postgres>,
    song_id: i32,
) -> Result<Option<SongSqlxModel>, sqlx::Error> {
    let sql = format!("{} where s.id = $1 and s.active", SONG_SELECT);
    sqlx::query_as::<_, SongSqlxModel>(&sql)
        .bind(song_id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_page_defaults() {
        assert_eq!(clamp_page(None, None), (DEFAULT_PAGE_SIZE, 0));
    }

    #[test]
    fn clamp_page_caps_oversized_limits() {
        assert_eq!(clamp_page(Some(10_000), None), (MAX_PAGE_SIZE, 0));
    }

    #[test]
    fn clamp_page_rejects_nonsense() {
        assert_eq!(clamp_page(Some(0), Some(-5)), (DEFAULT_PAGE_SIZE, 0));
        assert_eq!(clamp_page(Some(-3), Some(40)), (DEFAULT_PAGE_SIZE, 40));
    }

    #[test]
    fn clamp_page_passes_reasonable_values() {
        assert_eq!(clamp_page(Some(25), Some(50)), (25, 50));
    }
}
