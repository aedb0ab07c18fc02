use axum::{
    Router,
    routing::{get, patch, post, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        // Public booking
        .route("/api/turnos", post(handlers::reservations::reserve_slot))
        .route(
            "/api/turnos/disponibles",
            get(handlers::availability::open_slots),
        )
        .route(
            "/api/dias-disponibles",
            get(handlers::availability::available_days),
        )
        // Administration
        .route(
            "/api/admin/turnos",
            post(handlers::slots::create_slot).get(handlers::slots::list_slots),
        )
        .route(
            "/api/admin/turnos/reservas/pendientes",
            get(handlers::reservations::list_pending),
        )
        .route(
            "/api/admin/turnos/:id",
            axum::routing::delete(handlers::slots::delete_slot),
        )
        .route(
            "/api/admin/turnos/:id/disponibilidad",
            patch(handlers::slots::update_availability),
        )
        .route(
            "/api/admin/turnos/:id/reserva/estado",
            patch(handlers::reservations::decide_reservation),
        )
        .route(
            "/api/admin/turnos/:id/reserva/paciente",
            patch(handlers::reservations::link_patient),
        )
        .route(
            "/api/admin/turnos/:id/asignar",
            put(handlers::slots::assign_slot),
        )
}
