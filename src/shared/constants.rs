/// Display name used for records without a submitter
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

/// Stored as a report's location when reverse geocoding fails
pub const LOCATION_UNKNOWN: &str = "Unknown";

/// Storage directory for report photos
pub const DOG_REPORT_IMAGE_DIR: &str = "dog_reports";

/// Maximum image size in bytes (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Image MIME types accepted for report photos
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum length of a report's location text
pub const MAX_LOCATION_LENGTH: u64 = 255;

/// Maximum length of a comment body
pub const MAX_COMMENT_LENGTH: u64 = 5000;
