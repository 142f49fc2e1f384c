use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, TryIntoModel,
};

use crate::{
    AppState,
    entities::sala,
    error::{AppError, AppResult},
    models::{SalaCreate, SalaPatch, SalaResponse, SalaUpdate},
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(find_all).post(create)).route(
        "/{id}",
        get(find_by_id).put(update_full).patch(update_partial).delete(delete_by_id),
    )
}

fn no_encontrada(id: i32) -> AppError {
    AppError::not_found(format!("No se ha encontrado la sala con id {id}"))
}

/// Room names are unique; checked here so the caller gets a 400 instead of a
/// raw constraint error.
async fn nombre_libre<C: ConnectionTrait>(
    db: &C,
    nombre: &str,
    salvo_id: Option<i32>,
) -> AppResult<()> {
    let existente =
        sala::Entity::find().filter(sala::Column::Nombre.eq(nombre)).one(db).await?;
    if let Some(existente) = existente {
        if salvo_id != Some(existente.id) {
            return Err(AppError::validation(format!("Ya existe una sala con el nombre '{nombre}'")));
        }
    }
    Ok(())
}

async fn find_all(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<SalaResponse>>> {
    let salas = sala::Entity::find().all(&state.db).await?;
    Ok(Json(salas.into_iter().map(SalaResponse::from).collect()))
}

async fn find_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<SalaResponse>> {
    let sala =
        sala::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrada(id))?;
    Ok(Json(sala.into()))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(dto): Json<SalaCreate>,
) -> AppResult<(StatusCode, Json<SalaResponse>)> {
    let dto = dto.normalized()?;
    nombre_libre(&state.db, &dto.nombre, None).await?;

    let sala = sala::ActiveModel {
        nombre: Set(dto.nombre),
        capacidad: Set(dto.capacidad),
        tipo: Set(dto.tipo),
        precio: Set(dto.precio),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(id = sala.id, nombre = %sala.nombre, "sala creada");
    Ok((StatusCode::CREATED, Json(sala.into())))
}

async fn update_full(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(dto): Json<SalaUpdate>,
) -> AppResult<Json<SalaResponse>> {
    let dto = dto.normalized()?;

    let sala =
        sala::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrada(id))?;
    nombre_libre(&state.db, &dto.nombre, Some(sala.id)).await?;

    let mut am: sala::ActiveModel = sala.into();
    am.nombre = Set(dto.nombre);
    am.capacidad = Set(dto.capacidad);
    am.tipo = Set(dto.tipo);
    am.precio = Set(dto.precio);
    let sala = am.update(&state.db).await?;

    Ok(Json(sala.into()))
}

async fn update_partial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(dto): Json<SalaPatch>,
) -> AppResult<Json<SalaResponse>> {
    let dto = dto.normalized()?;

    let sala =
        sala::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrada(id))?;

    if let Some(nombre) = dto.nombre.as_deref() {
        nombre_libre(&state.db, nombre, Some(sala.id)).await?;
    }

    let mut am: sala::ActiveModel = sala.into();
    let mut cambiado = false;

    if let Some(nombre) = dto.nombre {
        am.nombre = Set(nombre);
        cambiado = true;
    }
    if let Some(capacidad) = dto.capacidad {
        am.capacidad = Set(capacidad);
        cambiado = true;
    }
    if let Some(tipo) = dto.tipo {
        am.tipo = Set(tipo);
        cambiado = true;
    }
    if let Some(precio) = dto.precio {
        am.precio = Set(precio);
        cambiado = true;
    }

    let sala = if cambiado { am.update(&state.db).await? } else { am.try_into_model()? };
    Ok(Json(sala.into()))
}

async fn delete_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    let sala =
        sala::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrada(id))?;

    sala::Entity::delete_by_id(sala.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
