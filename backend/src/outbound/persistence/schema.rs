//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Profiles linked to the external identity provider.
    users (id) {
        id -> Uuid,
        /// Identity provider subject; unique.
        external_id -> Text,
        email -> Nullable<Text>,
        name -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    polls (id) {
        id -> Uuid,
        topic -> Text,
        /// Ordered options; votes reference them by position.
        options -> Array<Text>,
        is_public -> Bool,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
        created_by -> Uuid,
        created_at -> Timestamptz,
        /// Generated result summary, if one was recorded.
        analysis -> Nullable<Jsonb>,
    }
}

diesel::table! {
    votes (id) {
        id -> Uuid,
        poll_id -> Uuid,
        /// Voter's external identity, not `users.id`.
        user_id -> Text,
        option_index -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(polls -> users (created_by));
diesel::joinable!(votes -> polls (poll_id));

diesel::allow_tables_to_appear_in_same_query!(users, polls, votes);
