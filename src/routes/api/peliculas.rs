use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde::Deserialize;

use crate::{
    AppState, catalog,
    catalog::FiltroPeliculas,
    entities::{genero, pelicula},
    error::{AppError, AppResult},
    models::{PeliculaCreate, PeliculaPatch, PeliculaResponse, PeliculaUpdate},
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(find_all).post(create)).route(
        "/{id}",
        get(find_by_id).put(update_full).patch(update_partial).delete(delete_by_id),
    )
}

fn no_encontrada(id: i32) -> AppError {
    AppError::not_found(format!("No se ha encontrado una película con id {id}"))
}

async fn genero_debe_existir<C: ConnectionTrait>(db: &C, genero_id: i32) -> AppResult<()> {
    if genero::Entity::find_by_id(genero_id).one(db).await?.is_none() {
        return Err(AppError::validation(format!("El género con id {genero_id} no existe")));
    }
    Ok(())
}

async fn con_genero<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<PeliculaResponse> {
    let row = pelicula::Entity::find_by_id(id)
        .find_also_related(genero::Entity)
        .one(db)
        .await?
        .ok_or_else(|| no_encontrada(id))?;
    Ok(PeliculaResponse::from_row(row))
}

#[derive(Debug, Default, Deserialize)]
struct FiltroQuery {
    q: Option<String>,
    genero_id: Option<i32>,
    duracion_max: Option<i32>,
    disponible: Option<bool>,
}

/// List all movies. Accepts the same optional filters as the homepage:
/// `q`, `genero_id`, `duracion_max` and `disponible`.
async fn find_all(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FiltroQuery>,
) -> AppResult<Json<Vec<PeliculaResponse>>> {
    let filtro = FiltroPeliculas {
        q: query.q,
        genero_id: query.genero_id,
        duracion_max: query.duracion_max,
        disponible: query.disponible.unwrap_or(false),
    };

    let rows = catalog::peliculas_filtradas(&state.db, &filtro).await?;
    Ok(Json(rows.into_iter().map(PeliculaResponse::from_row).collect()))
}

async fn find_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<PeliculaResponse>> {
    Ok(Json(con_genero(&state.db, id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(dto): Json<PeliculaCreate>,
) -> AppResult<(StatusCode, Json<PeliculaResponse>)> {
    let dto = dto.normalized()?;
    genero_debe_existir(&state.db, dto.genero_id).await?;

    let actores = dto.actores_json();
    let pelicula = pelicula::ActiveModel {
        titulo: Set(dto.titulo),
        genero_id: Set(dto.genero_id),
        duracion: Set(dto.duracion),
        disponible: Set(dto.disponible),
        director: Set(dto.director),
        descripcion: Set(dto.descripcion),
        trailer: Set(dto.trailer),
        productora: Set(dto.productora),
        idioma: Set(dto.idioma),
        vose: Set(dto.vose),
        actores: Set(actores),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(id = pelicula.id, titulo = %pelicula.titulo, "película creada");
    Ok((StatusCode::CREATED, Json(con_genero(&state.db, pelicula.id).await?)))
}

async fn update_full(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(dto): Json<PeliculaUpdate>,
) -> AppResult<Json<PeliculaResponse>> {
    let dto = dto.normalized()?;

    let pelicula =
        pelicula::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrada(id))?;
    genero_debe_existir(&state.db, dto.genero_id).await?;

    let actores = dto.actores_json();
    let mut am: pelicula::ActiveModel = pelicula.into();
    am.titulo = Set(dto.titulo);
    am.genero_id = Set(dto.genero_id);
    am.duracion = Set(dto.duracion);
    am.disponible = Set(dto.disponible);
    am.director = Set(dto.director);
    am.descripcion = Set(dto.descripcion);
    am.trailer = Set(dto.trailer);
    am.productora = Set(dto.productora);
    am.idioma = Set(dto.idioma);
    am.vose = Set(dto.vose);
    am.actores = Set(actores);
    let pelicula = am.update(&state.db).await?;

    Ok(Json(con_genero(&state.db, pelicula.id).await?))
}

async fn update_partial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(dto): Json<PeliculaPatch>,
) -> AppResult<Json<PeliculaResponse>> {
    let dto = dto.normalized()?;

    let pelicula =
        pelicula::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrada(id))?;

    if let Some(genero_id) = dto.genero_id {
        genero_debe_existir(&state.db, genero_id).await?;
    }

    let mut am: pelicula::ActiveModel = pelicula.into();
    let mut cambiado = false;

    if let Some(titulo) = dto.titulo {
        am.titulo = Set(titulo);
        cambiado = true;
    }
    if let Some(genero_id) = dto.genero_id {
        am.genero_id = Set(genero_id);
        cambiado = true;
    }
    if let Some(duracion) = dto.duracion {
        am.duracion = Set(duracion);
        cambiado = true;
    }
    if let Some(disponible) = dto.disponible {
        am.disponible = Set(disponible);
        cambiado = true;
    }
    if let Some(director) = dto.director {
        am.director = Set(director);
        cambiado = true;
    }
    if let Some(descripcion) = dto.descripcion {
        am.descripcion = Set(descripcion);
        cambiado = true;
    }
    if let Some(trailer) = dto.trailer {
        am.trailer = Set(trailer);
        cambiado = true;
    }
    if let Some(productora) = dto.productora {
        am.productora = Set(productora);
        cambiado = true;
    }
    if let Some(idioma) = dto.idioma {
        am.idioma = Set(idioma);
        cambiado = true;
    }
    if let Some(vose) = dto.vose {
        am.vose = Set(vose);
        cambiado = true;
    }
    if let Some(actores) = dto.actores {
        am.actores = Set(actores.as_ref().map(|lista| serde_json::json!(lista)));
        cambiado = true;
    }

    if cambiado {
        am.update(&state.db).await?;
    }

    Ok(Json(con_genero(&state.db, id).await?))
}

async fn delete_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    let pelicula =
        pelicula::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrada(id))?;

    pelicula::Entity::delete_by_id(pelicula.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
