mod dog_status;

pub use dog_status::*;
