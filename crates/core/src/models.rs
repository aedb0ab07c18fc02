pub mod admin;
pub mod form;
pub mod patient;
pub mod slot;
