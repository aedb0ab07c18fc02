/// Administrator login
pub mod admin;
/// Public calendar queries
pub mod availability;
/// Patient records and medical notes
pub mod patients;
/// Public booking and reservation review
pub mod reservations;
/// Slot management for administrators
pub mod slots;
