mod dog_report_handler;

pub use dog_report_handler::*;
