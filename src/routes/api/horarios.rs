use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};

use crate::{
    AppState,
    entities::{horario, pelicula, sala},
    error::{AppError, AppResult},
    models::{HorarioCreate, HorarioPatch, HorarioResponse, HorarioUpdate},
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(find_all).post(create)).route(
        "/{id}",
        get(find_by_id).put(update_full).patch(update_partial).delete(delete_by_id),
    )
}

fn no_encontrado(id: i32) -> AppError {
    AppError::not_found(format!("No se ha encontrado el horario con id {id}"))
}

// A showtime must point at an existing movie and room.
async fn referencias_validas<C: ConnectionTrait>(
    db: &C,
    pelicula_id: Option<i32>,
    sala_id: Option<i32>,
) -> AppResult<()> {
    if let Some(pelicula_id) = pelicula_id {
        if pelicula::Entity::find_by_id(pelicula_id).one(db).await?.is_none() {
            return Err(AppError::validation(format!(
                "La película con id {pelicula_id} no existe"
            )));
        }
    }
    if let Some(sala_id) = sala_id {
        if sala::Entity::find_by_id(sala_id).one(db).await?.is_none() {
            return Err(AppError::validation(format!("La sala con id {sala_id} no existe")));
        }
    }
    Ok(())
}

async fn con_sala<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<HorarioResponse> {
    let row = horario::Entity::find_by_id(id)
        .find_also_related(sala::Entity)
        .one(db)
        .await?
        .ok_or_else(|| no_encontrado(id))?;
    Ok(HorarioResponse::from_row(row))
}

async fn find_all(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<HorarioResponse>>> {
    let rows = horario::Entity::find().find_also_related(sala::Entity).all(&state.db).await?;
    Ok(Json(rows.into_iter().map(HorarioResponse::from_row).collect()))
}

async fn find_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<HorarioResponse>> {
    Ok(Json(con_sala(&state.db, id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(dto): Json<HorarioCreate>,
) -> AppResult<(StatusCode, Json<HorarioResponse>)> {
    let dto = dto.normalized()?;
    referencias_validas(&state.db, Some(dto.pelicula_id), Some(dto.sala_id)).await?;

    let horario = horario::ActiveModel {
        pelicula_id: Set(dto.pelicula_id),
        sala_id: Set(dto.sala_id),
        hora: Set(dto.hora),
        disponible: Set(dto.disponible),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(id = horario.id, "horario creado");
    Ok((StatusCode::CREATED, Json(con_sala(&state.db, horario.id).await?)))
}

async fn update_full(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(dto): Json<HorarioUpdate>,
) -> AppResult<Json<HorarioResponse>> {
    let dto = dto.normalized()?;

    let horario =
        horario::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrado(id))?;
    referencias_validas(&state.db, Some(dto.pelicula_id), Some(dto.sala_id)).await?;

    let mut am: horario::ActiveModel = horario.into();
    am.pelicula_id = Set(dto.pelicula_id);
    am.sala_id = Set(dto.sala_id);
    am.hora = Set(dto.hora);
    am.disponible = Set(dto.disponible);
    let horario = am.update(&state.db).await?;

    Ok(Json(con_sala(&state.db, horario.id).await?))
}

async fn update_partial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(dto): Json<HorarioPatch>,
) -> AppResult<Json<HorarioResponse>> {
    let dto = dto.normalized()?;

    let horario =
        horario::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrado(id))?;
    referencias_validas(&state.db, dto.pelicula_id, dto.sala_id).await?;

    let mut am: horario::ActiveModel = horario.into();
    let mut cambiado = false;

    if let Some(pelicula_id) = dto.pelicula_id {
        am.pelicula_id = Set(pelicula_id);
        cambiado = true;
    }
    if let Some(sala_id) = dto.sala_id {
        am.sala_id = Set(sala_id);
        cambiado = true;
    }
    if let Some(hora) = dto.hora {
        am.hora = Set(hora);
        cambiado = true;
    }
    if let Some(disponible) = dto.disponible {
        am.disponible = Set(disponible);
        cambiado = true;
    }

    if cambiado {
        am.update(&state.db).await?;
    }

    Ok(Json(con_sala(&state.db, id).await?))
}

async fn delete_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    let horario =
        horario::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrado(id))?;

    horario::Entity::delete_by_id(horario.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
