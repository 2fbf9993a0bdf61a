mod status_service;

pub use status_service::{insert_default_status, StatusService};
