use axum::{
    Router,
    routing::get,
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/admin/pacientes",
            get(handlers::patients::list_patients).post(handlers::patients::create_patient),
        )
        .route(
            "/api/admin/pacientes/:id",
            get(handlers::patients::get_patient)
                .put(handlers::patients::update_patient)
                .delete(handlers::patients::delete_patient),
        )
        .route(
            "/api/admin/pacientes/:id/notas",
            get(handlers::patients::list_notes).post(handlers::patients::add_note),
        )
}
