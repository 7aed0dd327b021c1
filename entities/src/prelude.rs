pub use super::comment::Entity as Comment;
pub use super::friendship::Entity as Friendship;
pub use super::play_log::Entity as PlayLog;
pub use super::post::Entity as Post;
pub use super::post_like::Entity as PostLike;
pub use super::session::Entity as Session;
pub use super::song::Entity as Song;
pub use super::song_like::Entity as SongLike;
pub use super::user::Entity as User;
