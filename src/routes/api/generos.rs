use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::{
    AppState,
    entities::genero,
    error::{AppError, AppResult},
    models::{GeneroCreate, GeneroPatch, GeneroResponse, GeneroUpdate},
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(find_all).post(create)).route(
        "/{id}",
        get(find_by_id).put(update_full).patch(update_partial).delete(delete_by_id),
    )
}

fn no_encontrado(id: i32) -> AppError {
    AppError::not_found(format!("No se ha encontrado el género con id {id}"))
}

async fn find_all(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<GeneroResponse>>> {
    let generos = genero::Entity::find().all(&state.db).await?;
    Ok(Json(generos.into_iter().map(GeneroResponse::from).collect()))
}

async fn find_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<GeneroResponse>> {
    let genero =
        genero::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrado(id))?;
    Ok(Json(genero.into()))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(dto): Json<GeneroCreate>,
) -> AppResult<(StatusCode, Json<GeneroResponse>)> {
    let dto = dto.normalized()?;

    let genero = genero::ActiveModel { name_genre: Set(dto.name_genre), ..Default::default() }
        .insert(&state.db)
        .await?;

    tracing::info!(id = genero.id, "género creado");
    Ok((StatusCode::CREATED, Json(genero.into())))
}

async fn update_full(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(dto): Json<GeneroUpdate>,
) -> AppResult<Json<GeneroResponse>> {
    let dto = dto.normalized()?;

    let genero =
        genero::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrado(id))?;

    let mut am: genero::ActiveModel = genero.into();
    am.name_genre = Set(dto.name_genre);
    let genero = am.update(&state.db).await?;

    Ok(Json(genero.into()))
}

async fn update_partial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(dto): Json<GeneroPatch>,
) -> AppResult<Json<GeneroResponse>> {
    let dto = dto.normalized()?;

    let genero =
        genero::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrado(id))?;

    // An update with no changed columns would fail in sea-orm.
    let Some(name_genre) = dto.name_genre else {
        return Ok(Json(genero.into()));
    };

    let mut am: genero::ActiveModel = genero.into();
    am.name_genre = Set(name_genre);
    let genero = am.update(&state.db).await?;

    Ok(Json(genero.into()))
}

async fn delete_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    let genero =
        genero::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrado(id))?;

    genero::Entity::delete_by_id(genero.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
