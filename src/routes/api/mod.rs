pub mod generos;
pub mod horarios;
pub mod peliculas;
pub mod salas;
pub mod ventas;

use std::sync::Arc;

use axum::Router;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/peliculas", peliculas::router())
        .nest("/genres", generos::router())
        .nest("/salas", salas::router())
        .nest("/horarios", horarios::router())
        .nest("/ventas", ventas::router())
}
