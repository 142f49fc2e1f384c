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
    entities::{horario, sala, venta},
    error::{AppError, AppResult},
    models::{HorarioResponse, VentaCreate, VentaPatch, VentaResponse, VentaUpdate},
};

// TODO: look the unit price up from the sala attached to the horario.
pub const PRECIO_UNITARIO: f64 = 8.0;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(find_all).post(create)).route(
        "/{id}",
        get(find_by_id).put(update_full).patch(update_partial).delete(delete_by_id),
    )
}

fn no_encontrada(id: i32) -> AppError {
    AppError::not_found(format!("No se ha encontrado la venta con id {id}"))
}

async fn horario_anidado<C: ConnectionTrait>(
    db: &C,
    horario_id: i32,
) -> AppResult<Option<HorarioResponse>> {
    let row =
        horario::Entity::find_by_id(horario_id).find_also_related(sala::Entity).one(db).await?;
    Ok(row.map(HorarioResponse::from_row))
}

async fn horario_debe_existir<C: ConnectionTrait>(db: &C, horario_id: i32) -> AppResult<()> {
    if horario::Entity::find_by_id(horario_id).one(db).await?.is_none() {
        return Err(AppError::validation(format!("El horario con id {horario_id} no existe")));
    }
    Ok(())
}

async fn respuesta<C: ConnectionTrait>(db: &C, venta: venta::Model) -> AppResult<VentaResponse> {
    let horario = horario_anidado(db, venta.horario_id).await?;
    Ok(VentaResponse::from_row(venta, horario))
}

async fn find_all(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<VentaResponse>>> {
    let ventas = venta::Entity::find().all(&state.db).await?;
    let mut out = Vec::with_capacity(ventas.len());
    for venta in ventas {
        out.push(respuesta(&state.db, venta).await?);
    }
    Ok(Json(out))
}

async fn find_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<VentaResponse>> {
    let venta =
        venta::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrada(id))?;
    Ok(Json(respuesta(&state.db, venta).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(dto): Json<VentaCreate>,
) -> AppResult<(StatusCode, Json<VentaResponse>)> {
    let dto = dto.normalized()?;
    horario_debe_existir(&state.db, dto.horario_id).await?;

    let precio_total = PRECIO_UNITARIO * f64::from(dto.cantidad);

    let venta = venta::ActiveModel {
        horario_id: Set(dto.horario_id),
        precio_total: Set(precio_total),
        cantidad: Set(dto.cantidad),
        metodo_pago: Set(dto.metodo_pago),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(id = venta.id, precio_total, "venta creada");
    Ok((StatusCode::CREATED, Json(respuesta(&state.db, venta).await?)))
}

async fn update_full(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(dto): Json<VentaUpdate>,
) -> AppResult<Json<VentaResponse>> {
    let dto = dto.normalized()?;

    let venta =
        venta::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrada(id))?;
    horario_debe_existir(&state.db, dto.horario_id).await?;

    // The client-sent precio_total is accepted by the schema but always
    // recomputed from the quantity, as the original service did.
    let mut am: venta::ActiveModel = venta.into();
    am.horario_id = Set(dto.horario_id);
    am.cantidad = Set(dto.cantidad);
    am.metodo_pago = Set(dto.metodo_pago);
    am.precio_total = Set(PRECIO_UNITARIO * f64::from(dto.cantidad));
    let venta = am.update(&state.db).await?;

    Ok(Json(respuesta(&state.db, venta).await?))
}

async fn update_partial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(dto): Json<VentaPatch>,
) -> AppResult<Json<VentaResponse>> {
    let dto = dto.normalized()?;

    let venta =
        venta::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrada(id))?;

    if let Some(horario_id) = dto.horario_id {
        horario_debe_existir(&state.db, horario_id).await?;
    }

    let recalcular = dto.horario_id.is_some() || dto.cantidad.is_some();
    let cantidad = dto.cantidad.unwrap_or(venta.cantidad);

    let mut am: venta::ActiveModel = venta.into();
    let mut cambiado = false;

    if let Some(horario_id) = dto.horario_id {
        am.horario_id = Set(horario_id);
        cambiado = true;
    }
    if let Some(valor) = dto.cantidad {
        am.cantidad = Set(valor);
        cambiado = true;
    }
    if let Some(metodo_pago) = dto.metodo_pago {
        am.metodo_pago = Set(metodo_pago);
        cambiado = true;
    }
    if let Some(precio_total) = dto.precio_total {
        am.precio_total = Set(precio_total);
        cambiado = true;
    }
    if recalcular {
        am.precio_total = Set(PRECIO_UNITARIO * f64::from(cantidad));
    }

    let venta = if cambiado {
        am.update(&state.db).await?
    } else {
        sea_orm::TryIntoModel::try_into_model(am)?
    };

    Ok(Json(respuesta(&state.db, venta).await?))
}

async fn delete_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    let venta =
        venta::Entity::find_by_id(id).one(&state.db).await?.ok_or_else(|| no_encontrada(id))?;

    venta::Entity::delete_by_id(venta.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
