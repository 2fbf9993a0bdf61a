//! Comments on dog reports
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/comments` | List comments, newest first (filter: dog_report) |
//! | POST | `/api/comments` | Comment on a report |
//! | GET | `/api/comments/{id}` | Get a comment |
//! | PUT | `/api/comments/{id}` | Replace a comment's text |
//! | PATCH | `/api/comments/{id}` | Update a comment's text |
//! | DELETE | `/api/comments/{id}` | Delete a comment |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CommentService;
