use std::sync::Arc;

use axum::{
    Router,
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use serde::Deserialize;

use crate::{
    AppState, catalog,
    catalog::FiltroPeliculas,
    entities::{genero, horario, pelicula, sala, venta, venta::MetodoPago},
    error::AppError,
    routes::api::ventas::PRECIO_UNITARIO,
    templates,
    templates::VentaFormData,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/peliculas", get(lista_peliculas))
        .route("/genres", get(lista_generos))
        .route("/salas", get(lista_salas))
        .route("/horarios", get(lista_horarios))
        .route("/ventas", get(lista_ventas))
        .route("/ventas/new", get(nueva_venta_form).post(crear_venta))
}

#[derive(Debug, Default, Deserialize)]
struct HomeQuery {
    q: Option<String>,
    genero_id: Option<String>,
    duracion_max: Option<String>,
    disponible: Option<String>,
}

/// Query-string values arrive as raw strings from the form; non-numeric
/// values are dropped rather than rejected. The availability checkbox only
/// submits `disponible=True` when checked.
fn normalizar_filtros(raw: &HomeQuery) -> FiltroPeliculas {
    FiltroPeliculas {
        q: raw.q.clone(),
        genero_id: raw.genero_id.as_deref().and_then(|v| v.parse().ok()).filter(|id| *id > 0),
        duracion_max: raw.duracion_max.as_deref().and_then(|v| v.parse().ok()),
        disponible: raw.disponible.as_deref() == Some("True"),
    }
}

async fn home(State(state): State<Arc<AppState>>, Query(raw): Query<HomeQuery>) -> Response {
    let filtro = normalizar_filtros(&raw);

    let result = async {
        let generos = genero::Entity::find().all(&state.db).await?;
        let peliculas = catalog::peliculas_filtradas(&state.db, &filtro).await?;
        Ok::<_, AppError>(templates::home_page(&peliculas, &generos, &filtro))
    }
    .await;

    responder(result)
}

async fn lista_peliculas(State(state): State<Arc<AppState>>) -> Response {
    let result = async {
        let rows = pelicula::Entity::find().find_also_related(genero::Entity).all(&state.db).await?;
        Ok::<_, AppError>(templates::peliculas_page(&rows))
    }
    .await;

    responder(result)
}

async fn lista_generos(State(state): State<Arc<AppState>>) -> Response {
    let result = async {
        let generos = genero::Entity::find().all(&state.db).await?;
        Ok::<_, AppError>(templates::generos_page(&generos))
    }
    .await;

    responder(result)
}

async fn lista_salas(State(state): State<Arc<AppState>>) -> Response {
    let result = async {
        let salas = sala::Entity::find().all(&state.db).await?;
        Ok::<_, AppError>(templates::salas_page(&salas))
    }
    .await;

    responder(result)
}

async fn lista_horarios(State(state): State<Arc<AppState>>) -> Response {
    let result = async {
        let rows = horario::Entity::find().find_also_related(sala::Entity).all(&state.db).await?;
        Ok::<_, AppError>(templates::horarios_page(&rows))
    }
    .await;

    responder(result)
}

async fn lista_ventas(State(state): State<Arc<AppState>>) -> Response {
    let result = async {
        let ventas = venta::Entity::find().all(&state.db).await?;
        Ok::<_, AppError>(templates::ventas_page(&ventas))
    }
    .await;

    responder(result)
}

async fn nueva_venta_form(State(state): State<Arc<AppState>>) -> Response {
    let result = async {
        let horarios = horario::Entity::find().all(&state.db).await?;
        Ok::<_, AppError>(templates::venta_form_page(&horarios, &[], &VentaFormData::default()))
    }
    .await;

    responder(result)
}

#[derive(Debug, Default, Deserialize)]
struct VentaFormRaw {
    #[serde(default)]
    horario_id: String,
    #[serde(default)]
    cantidad: String,
    #[serde(default)]
    metodo_pago: String,
}

/// Validates the form field by field, collecting every problem so the user
/// sees the full list on one round trip.
async fn crear_venta(
    State(state): State<Arc<AppState>>,
    Form(form): Form<VentaFormRaw>,
) -> Response {
    let datos = VentaFormData {
        horario_id: form.horario_id.clone(),
        cantidad: form.cantidad.clone(),
        metodo_pago: form.metodo_pago.clone(),
    };

    let result = async {
        let mut errores: Vec<String> = Vec::new();

        let mut horario_id: Option<i32> = None;
        let valor = form.horario_id.trim();
        if valor.is_empty() {
            errores.push("El horario es requerido".to_string());
        } else {
            match valor.parse::<i32>() {
                Ok(id) if id >= 1 => {
                    if horario::Entity::find_by_id(id).one(&state.db).await?.is_none() {
                        errores.push("El horario seleccionado no existe".to_string());
                    } else {
                        horario_id = Some(id);
                    }
                }
                Ok(_) => {
                    errores.push("El id del horario tiene que ser un número positivo".to_string())
                }
                Err(_) => {
                    errores.push("El id del horario tiene que ser un número válido".to_string())
                }
            }
        }

        let mut cantidad: Option<i32> = None;
        let valor = form.cantidad.trim();
        if valor.is_empty() {
            errores.push("La cantidad es requerida".to_string());
        } else {
            match valor.parse::<i32>() {
                Ok(n) if n >= 1 => cantidad = Some(n),
                Ok(_) => errores.push("La cantidad debe ser un número positivo".to_string()),
                Err(_) => errores.push("La cantidad debe ser un número válido".to_string()),
            }
        }

        let metodo_pago = MetodoPago::parse(form.metodo_pago.trim());
        if metodo_pago.is_none() {
            errores.push("El método de pago debe ser efectivo o tarjeta".to_string());
        }

        let (true, Some(horario_id), Some(cantidad), Some(metodo_pago)) =
            (errores.is_empty(), horario_id, cantidad, metodo_pago)
        else {
            let horarios = horario::Entity::find().all(&state.db).await?;
            let html = templates::venta_form_page(&horarios, &errores, &datos);
            let mut resp = Html(html).into_response();
            *resp.status_mut() = StatusCode::BAD_REQUEST;
            return Ok::<_, AppError>(resp);
        };

        // The insert runs inside a transaction so a failure leaves nothing
        // behind; dropping the handle without commit rolls back.
        let txn = state.db.begin().await?;
        venta::ActiveModel {
            horario_id: Set(horario_id),
            precio_total: Set(PRECIO_UNITARIO * f64::from(cantidad)),
            cantidad: Set(cantidad),
            metodo_pago: Set(metodo_pago),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        Ok(Redirect::to("/ventas").into_response())
    }
    .await;

    responder_response(result)
}

fn responder(result: Result<String, AppError>) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(err) => pagina_error(err),
    }
}

fn responder_response(result: Result<Response, AppError>) -> Response {
    match result {
        Ok(resp) => resp,
        Err(err) => pagina_error(err),
    }
}

fn pagina_error(err: AppError) -> Response {
    tracing::error!(error = %err, "error en ruta web");
    let mut resp =
        Html(templates::error_page("Error interno del servidor".to_string())).into_response();
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp
}
