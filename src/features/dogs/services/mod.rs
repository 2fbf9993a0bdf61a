mod dog_report_service;
mod geocoding_service;

pub use dog_report_service::DogReportService;
pub use geocoding_service::GeocodingService;
