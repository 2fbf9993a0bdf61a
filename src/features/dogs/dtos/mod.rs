mod dog_report_dto;
mod dog_report_input;

pub use dog_report_dto::*;
pub use dog_report_input::*;
