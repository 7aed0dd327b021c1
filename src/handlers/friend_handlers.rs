use axum::response::Response;
use chrono::Utc;
use log::{error, info};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    ModelTrait, QueryFilter, QueryOrder, SqlErr,
};

use entities::friendship::{self, FriendshipStatus};
use entities::prelude::{Friendship, User};

use crate::auth_middleware::CurrentUser;
use crate::responses::friend_response::{
    FriendshipIdPayload, FriendshipStatusPayload, RequestCreatedPayload,
};
use crate::responses::responses::{
    failure_response, message_response, ok_response, server_error_response,
};
use crate::AppState;

/// Why a new request for this pair must be refused, given the row that
/// already exists. Rejected rows never reach here; they do not block.
fn request_conflict_message(existing: &friendship::Model, requester: i32) -> &'static str {
    match existing.status {
        FriendshipStatus::Pending => {
            if existing.requester_id == requester {
                "You already sent a friend request to this user"
            } else {
                "This user already sent you a friend request"
            }
        }
        FriendshipStatus::Accepted => "You are already friends with this user",
        FriendshipStatus::Blocked => "This relationship is blocked",
        FriendshipStatus::Rejected => "A friend request already exists",
    }
}

/// Authorization rule for accept/reject (recipient) and cancel (requester).
fn respond_error(
    row: &friendship::Model,
    acting: i32,
    must_be_recipient: bool,
) -> Option<&'static str> {
    if row.status != FriendshipStatus::Pending {
        return Some("This friend request is no longer pending");
    }
    let expected = if must_be_recipient {
        row.recipient_id
    } else {
        row.requester_id
    };
    if acting != expected {
        return Some(if must_be_recipient {
            "Only the recipient can respond to this request"
        } else {
            "Only the sender can cancel this request"
        });
    }
    None
}

/// Either party of an accepted row may remove the friendship.
fn removal_error(row: &friendship::Model, acting: i32) -> Option<&'static str> {
    if row.status != FriendshipStatus::Accepted {
        return Some("You are not friends with this user");
    }
    if !row.involves(acting) {
        return Some("You are not part of this friendship");
    }
    None
}

fn pair_condition(a: i32, b: i32) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(friendship::Column::RequesterId.eq(a))
                .add(friendship::Column::RecipientId.eq(b)),
        )
        .add(
            Condition::all()
                .add(friendship::Column::RequesterId.eq(b))
                .add(friendship::Column::RecipientId.eq(a)),
        )
}

/// The live (non-rejected) relationship row for an unordered pair, if any.
async fn find_live_pair(
    state: &AppState,
    a: i32,
    b: i32,
) -> Result<Option<friendship::Model>, sea_orm::DbErr> {
    Friendship::find()
        .filter(pair_condition(a, b))
        .filter(friendship::Column::Status.ne(FriendshipStatus::Rejected))
        .one(&state.connection)
        .await
}

pub async fn send_friend_request(
    state: &AppState,
    current: &CurrentUser,
    friend_id: i32,
) -> Response {
    if friend_id == current.id {
        return failure_response("You cannot send a friend request to yourself");
    }

    match User::find_by_id(friend_id).one(&state.connection).await {
        Ok(Some(_)) => {}
        Ok(None) => return failure_response("User not found"),
        Err(err) => {
            error!("recipient lookup failed: {}", err);
            return server_error_response();
        }
    }

    match find_live_pair(state, current.id, friend_id).await {
        Ok(Some(existing)) => {
            return failure_response(request_conflict_message(&existing, current.id))
        }
        Ok(None) => {}
        Err(err) => {
            error!("friendship lookup failed: {}", err);
            return server_error_response();
        }
    }

    let new_request = friendship::ActiveModel {
        requester_id: ActiveValue::Set(current.id),
        recipient_id: ActiveValue::Set(friend_id),
        status: ActiveValue::Set(FriendshipStatus::Pending),
        requested_at: ActiveValue::Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    match Friendship::insert(new_request).exec(&state.connection).await {
        Ok(inserted) => {
            info!(
                "friend request {} from {} to {}",
                inserted.last_insert_id, current.id, friend_id
            );
            ok_response(RequestCreatedPayload {
                request_id: inserted.last_insert_id,
            })
        }
        Err(err) => {
            // A concurrent duplicate trips the pair index instead of the
            // pre-check; same answer either way.
            if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
                return failure_response("A friend request already exists for this user");
            }
            error!("friend request insert failed: {}", err);
            server_error_response()
        }
    }
}

pub async fn accept_friend_request(
    state: &AppState,
    current: &CurrentUser,
    request_id: i32,
) -> Response {
    let row = match Friendship::find_by_id(request_id)
        .one(&state.connection)
        .await
    {
        Ok(Some(row)) => row,
        Ok(None) => return failure_response("Friend request not found"),
        Err(err) => {
            error!("friend request lookup failed: {}", err);
            return server_error_response();
        }
    };

    if let Some(message) = respond_error(&row, current.id, true) {
        return failure_response(message);
    }

    let id = row.id;
    let mut accepted = row.into_active_model();
    accepted.status = ActiveValue::Set(FriendshipStatus::Accepted);
    accepted.responded_at = ActiveValue::Set(Some(Utc::now().naive_utc()));
    match accepted.update(&state.connection).await {
        Ok(_) => ok_response(FriendshipIdPayload { friendship_id: id }),
        Err(err) => {
            error!("friend request accept failed: {}", err);
            server_error_response()
        }
    }
}

pub async fn reject_friend_request(
    state: &AppState,
    current: &CurrentUser,
    request_id: i32,
) -> Response {
    let row = match Friendship::find_by_id(request_id)
        .one(&state.connection)
        .await
    {
        Ok(Some(row)) => row,
        Ok(None) => return failure_response("Friend request not found"),
        Err(err) => {
            error!("friend request lookup failed: {}", err);
            return server_error_response();
        }
    };

    if let Some(message) = respond_error(&row, current.id, true) {
        return failure_response(message);
    }

    // Reject keeps the row for history; cancel deletes it.
    let mut rejected = row.into_active_model();
    rejected.status = ActiveValue::Set(FriendshipStatus::Rejected);
    rejected.responded_at = ActiveValue::Set(Some(Utc::now().naive_utc()));
    match rejected.update(&state.connection).await {
        Ok(_) => message_response("Friend request rejected"),
        Err(err) => {
            error!("friend request reject failed: {}", err);
            server_error_response()
        }
    }
}

pub async fn cancel_friend_request(
    state: &AppState,
    current: &CurrentUser,
    request_id: i32,
) -> Response {
    let row = match Friendship::find_by_id(request_id)
        .one(&state.connection)
        .await
    {
        Ok(Some(row)) => row,
        Ok(None) => return failure_response("Friend request not found"),
        Err(err) => {
            error!("friend request lookup failed: {}", err);
            return server_error_response();
        }
    };

    if let Some(message) = respond_error(&row, current.id, false) {
        return failure_response(message);
    }

    match row.delete(&state.connection).await {
        Ok(_) => message_response("Friend request cancelled"),
        Err(err) => {
            error!("friend request cancel failed: {}", err);
            server_error_response()
        }
    }
}

pub async fn remove_friend(
    state: &AppState,
    current: &CurrentUser,
    friendship_id: i32,
) -> Response {
    let row = match Friendship::find_by_id(friendship_id)
        .one(&state.connection)
        .await
    {
        Ok(Some(row)) => row,
        Ok(None) => return failure_response("Friendship not found"),
        Err(err) => {
            error!("friendship lookup failed: {}", err);
            return server_error_response();
        }
    };

    if let Some(message) = removal_error(&row, current.id) {
        return failure_response(message);
    }

    match row.delete(&state.connection).await {
        Ok(_) => message_response("Friend removed"),
        Err(err) => {
            error!("friendship removal failed: {}", err);
            server_error_response()
        }
    }
}

/// Blocking replaces whatever relationship existed; there is no unblock
/// action on the public surface.
pub async fn block_user(state: &AppState, current: &CurrentUser, user_id: i32) -> Response {
    if user_id == current.id {
        return failure_response("You cannot block yourself");
    }

    match User::find_by_id(user_id).one(&state.connection).await {
        Ok(Some(_)) => {}
        Ok(None) => return failure_response("User not found"),
        Err(err) => {
            error!("block target lookup failed: {}", err);
            return server_error_response();
        }
    }

    if let Err(err) = Friendship::delete_many()
        .filter(pair_condition(current.id, user_id))
        .exec(&state.connection)
        .await
    {
        error!("could not clear prior relationship: {}", err);
        return server_error_response();
    }

    let block_row = friendship::ActiveModel {
        requester_id: ActiveValue::Set(current.id),
        recipient_id: ActiveValue::Set(user_id),
        status: ActiveValue::Set(FriendshipStatus::Blocked),
        requested_at: ActiveValue::Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    match Friendship::insert(block_row).exec(&state.connection).await {
        Ok(_) => message_response("User blocked"),
        Err(err) => {
            error!("block insert failed: {}", err);
            server_error_response()
        }
    }
}

pub async fn check_friendship(state: &AppState, current: &CurrentUser, other: i32) -> Response {
    if other == current.id {
        return failure_response("Cannot check a friendship with yourself");
    }

    let rows = match Friendship::find()
        .filter(pair_condition(current.id, other))
        .order_by_desc(friendship::Column::RequestedAt)
        .all(&state.connection)
        .await
    {
        Ok(rows) => rows,
        Err(err) => {
            error!("friendship status lookup failed: {}", err);
            return server_error_response();
        }
    };

    // Prefer the live row; a rejected one only matters when it is all there is.
    let row = rows
        .iter()
        .find(|r| r.status != FriendshipStatus::Rejected)
        .or_else(|| rows.first());

    let payload = match row {
        None => FriendshipStatusPayload::none(),
        Some(row) => friendship_status_payload(row, current.id),
    };
    ok_response(payload)
}

fn friendship_status_payload(row: &friendship::Model, viewer: i32) -> FriendshipStatusPayload {
    use sea_orm::ActiveEnum;

    let (message, friendship_id, initiated_by) = match row.status {
        FriendshipStatus::Pending => {
            let message = if row.requester_id == viewer {
                "Friend request sent"
            } else {
                "Friend request received"
            };
            (message, Some(row.id), Some(row.requester_id))
        }
        FriendshipStatus::Accepted => ("You are friends", Some(row.id), None),
        FriendshipStatus::Rejected => ("A previous request was rejected", None, None),
        FriendshipStatus::Blocked => ("This relationship is blocked", None, None),
    };

    FriendshipStatusPayload {
        status: row.status.to_value(),
        message: message.to_string(),
        friendship_id,
        initiated_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn row(requester: i32, recipient: i32, status: FriendshipStatus) -> friendship::Model {
        friendship::Model {
            id: 42,
            requester_id: requester,
            recipient_id: recipient,
            status,
            requested_at: NaiveDateTime::default(),
            responded_at: None,
        }
    }

    #[test]
    fn pending_conflict_disambiguates_direction() {
        let pending = row(1, 2, FriendshipStatus::Pending);
        assert_eq!(
            request_conflict_message(&pending, 1),
            "You already sent a friend request to this user"
        );
        assert_eq!(
            request_conflict_message(&pending, 2),
            "This user already sent you a friend request"
        );
    }

    #[test]
    fn accepted_and_blocked_pairs_refuse_new_requests() {
        assert_eq!(
            request_conflict_message(&row(1, 2, FriendshipStatus::Accepted), 1),
            "You are already friends with this user"
        );
        assert_eq!(
            request_conflict_message(&row(2, 1, FriendshipStatus::Blocked), 1),
            "This relationship is blocked"
        );
    }

    #[test]
    fn only_the_recipient_accepts_a_pending_request() {
        let pending = row(1, 2, FriendshipStatus::Pending);
        assert_eq!(respond_error(&pending, 2, true), None);
        assert_eq!(
            respond_error(&pending, 1, true),
            Some("Only the recipient can respond to this request")
        );
        assert_eq!(
            respond_error(&pending, 3, true),
            Some("Only the recipient can respond to this request")
        );
    }

    #[test]
    fn only_the_sender_cancels_a_pending_request() {
        let pending = row(1, 2, FriendshipStatus::Pending);
        assert_eq!(respond_error(&pending, 1, false), None);
        assert_eq!(
            respond_error(&pending, 2, false),
            Some("Only the sender can cancel this request")
        );
    }

    #[test]
    fn responding_to_a_settled_request_fails() {
        let accepted = row(1, 2, FriendshipStatus::Accepted);
        assert_eq!(
            respond_error(&accepted, 2, true),
            Some("This friend request is no longer pending")
        );
    }

    #[test]
    fn either_party_removes_an_accepted_friendship() {
        let accepted = row(1, 2, FriendshipStatus::Accepted);
        assert_eq!(removal_error(&accepted, 1), None);
        assert_eq!(removal_error(&accepted, 2), None);
        assert_eq!(
            removal_error(&accepted, 3),
            Some("You are not part of this friendship")
        );
        assert_eq!(
            removal_error(&row(1, 2, FriendshipStatus::Pending), 1),
            Some("You are not friends with this user")
        );
    }

    #[test]
    fn status_payload_reports_direction_for_pending() {
        let pending = row(1, 2, FriendshipStatus::Pending);
        let seen_by_sender = friendship_status_payload(&pending, 1);
        assert_eq!(seen_by_sender.status, "pendiente");
        assert_eq!(seen_by_sender.message, "Friend request sent");
        assert_eq!(seen_by_sender.initiated_by, Some(1));
        assert_eq!(seen_by_sender.friendship_id, Some(42));

        let seen_by_recipient = friendship_status_payload(&pending, 2);
        assert_eq!(seen_by_recipient.message, "Friend request received");
    }

    #[test]
    fn status_payload_for_accepted_and_blocked() {
        let accepted = friendship_status_payload(&row(1, 2, FriendshipStatus::Accepted), 1);
        assert_eq!(accepted.status, "aceptada");
        assert_eq!(accepted.friendship_id, Some(42));

        let blocked = friendship_status_payload(&row(1, 2, FriendshipStatus::Blocked), 2);
        assert_eq!(blocked.status, "bloqueada");
        assert_eq!(blocked.friendship_id, None);
    }
}
