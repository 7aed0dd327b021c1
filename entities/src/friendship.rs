use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Relationship state between two users. Values are the wire contract.
///
/// `Rejected` rows are kept for history and do not block a new request;
/// every other state participates in the unordered-pair unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
pub enum FriendshipStatus {
    #[sea_orm(string_value = "pendiente")]
    #[serde(rename = "pendiente")]
    Pending,
    #[sea_orm(string_value = "aceptada")]
    #[serde(rename = "aceptada")]
    Accepted,
    #[sea_orm(string_value = "rechazada")]
    #[serde(rename = "rechazada")]
    Rejected,
    #[sea_orm(string_value = "bloqueada")]
    #[serde(rename = "bloqueada")]
    Blocked,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "friendships")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub requester_id: i32,
    pub recipient_id: i32,
    pub status: FriendshipStatus,
    pub requested_at: DateTime,
    pub responded_at: Option<DateTime>,
}

impl Model {
    /// The other end of the relationship, seen from `user_id`.
    pub fn counterpart_of(&self, user_id: i32) -> i32 {
        if self.requester_id == user_id {
            self.recipient_id
        } else {
            self.requester_id
        }
    }

    pub fn involves(&self, user_id: i32) -> bool {
        self.requester_id == user_id || self.recipient_id == user_id
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequesterId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Requester,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Recipient,
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveEnum;

    #[test]
    fn status_wire_values_are_stable() {
        assert_eq!(FriendshipStatus::Pending.to_value(), "pendiente");
        assert_eq!(FriendshipStatus::Accepted.to_value(), "aceptada");
        assert_eq!(FriendshipStatus::Rejected.to_value(), "rechazada");
        assert_eq!(FriendshipStatus::Blocked.to_value(), "bloqueada");
    }

    #[test]
    fn counterpart_flips_between_the_two_parties() {
        let row = Model {
            id: 1,
            requester_id: 7,
            recipient_id: 9,
            status: FriendshipStatus::Pending,
            requested_at: chrono::NaiveDateTime::default(),
            responded_at: None,
        };
        assert_eq!(row.counterpart_of(7), 9);
        assert_eq!(row.counterpart_of(9), 7);
        assert!(row.involves(7) && row.involves(9));
        assert!(!row.involves(8));
    }
}
