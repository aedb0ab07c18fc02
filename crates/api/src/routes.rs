/// Administrator login
pub mod admin;
/// Health and version probes
pub mod health;
/// Patient records
pub mod pacientes;
/// Slots, reservations and the public calendar
pub mod turnos;
