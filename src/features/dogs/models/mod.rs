mod dog_report;

pub use dog_report::*;
