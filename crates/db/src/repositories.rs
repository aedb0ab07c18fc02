pub mod admin;
pub mod patient;
pub mod slot;
