pub mod prelude;

pub mod comment;
pub mod friendship;
pub mod play_log;
pub mod post;
pub mod post_like;
pub mod session;
pub mod song;
pub mod song_like;
pub mod user;

pub mod friendship_local_model;
pub mod post_local_model;
pub mod song_local_model;
pub mod user_local_model;
