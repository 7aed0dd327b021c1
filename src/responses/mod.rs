pub mod friend_response;
pub mod music_response;
pub mod post_response;
pub mod responses;
pub mod user_response;
