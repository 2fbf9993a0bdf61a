//! Local accounts and token issuance.
//!
//! Users register with a username and password (hashed with Argon2) and receive an
//! HS256 access/refresh token pair. Every other feature only sees the resulting
//! [`model::AuthenticatedUser`], resolved per request by the middleware in
//! `core::middleware`.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/auth/register` | No | Create an account, returns tokens |
//! | POST | `/api/auth/login` | No | Exchange credentials for tokens |
//! | POST | `/api/auth/refresh` | No | Exchange a refresh token for an access token |
//! | POST | `/api/auth/logout` | Yes | Revoke the supplied refresh token |
//! | GET | `/api/auth/me` | Yes | Current user |

pub mod dtos;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use services::{AuthService, TokenService};
