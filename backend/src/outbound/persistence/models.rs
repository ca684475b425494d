//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{polls, users, votes};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    #[expect(dead_code, reason = "selected for completeness; not surfaced")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for registering a user.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub external_id: &'a str,
    pub email: Option<&'a str>,
    pub name: Option<&'a str>,
}

/// Row struct for reading from the polls table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = polls)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PollRow {
    pub id: Uuid,
    pub topic: String,
    pub options: Vec<String>,
    pub is_public: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub analysis: Option<serde_json::Value>,
}

/// Insertable struct for creating polls.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = polls)]
pub(crate) struct NewPollRow<'a> {
    pub id: Uuid,
    pub topic: &'a str,
    pub options: &'a [String],
    pub is_public: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub analysis: Option<serde_json::Value>,
}

/// Row struct for reading from the votes table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VoteRow {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub user_id: String,
    pub option_index: i32,
    pub created_at: DateTime<Utc>,
}
