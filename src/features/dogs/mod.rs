//! Stray dog reports
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/dogs` | List reports (filters: condition, user, created_at, created_after, created_before) |
//! | POST | `/api/dogs` | Create a report (JSON or multipart with `image`) |
//! | GET | `/api/dogs/{id}` | Get a report |
//! | PUT | `/api/dogs/{id}` | Replace a report |
//! | PATCH | `/api/dogs/{id}` | Update part of a report |
//! | DELETE | `/api/dogs/{id}` | Delete a report with its status and comments |
//!
//! Reports may be anonymous. Owned reports can only be changed by their submitter.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{DogReportService, GeocodingService};
