pub mod auth;
pub mod comments;
pub mod dogs;
pub mod statuses;
