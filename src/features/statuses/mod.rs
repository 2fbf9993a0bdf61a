//! Welfare status attached one-to-one to a dog report
//!
//! A default status is created together with every report; the endpoints
//! below let callers inspect and edit it.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/status` | List statuses, optionally for one report |
//! | POST | `/api/status` | Create a status for a report that has none |
//! | GET | `/api/status/{id}` | Get a status |
//! | PUT | `/api/status/{id}` | Replace vaccinated/rescued/notes |
//! | PATCH | `/api/status/{id}` | Update some of vaccinated/rescued/notes |
//! | DELETE | `/api/status/{id}` | Delete a status |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::StatusService;
