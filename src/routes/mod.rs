pub mod api;
pub mod web;

use std::sync::Arc;

use axum::Router;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().merge(web::router()).nest("/api", api::router())
}
