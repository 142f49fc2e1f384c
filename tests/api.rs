//! Integration tests for the JSON API and the web surface, driven through
//! the full router against an in-memory SQLite database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tower::ServiceExt;

use cartelera::{AppState, app, config::Config, db};

async fn test_app() -> Router {
    // A single pooled connection so every request sees the same :memory: db.
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let conn = Database::connect(opts).await.expect("connect to in-memory sqlite");
    db::migrate(&conn).await.expect("run migrations");

    let config = Arc::new(Config {
        addr: "127.0.0.1:0".parse().expect("addr"),
        database_url: "sqlite::memory:".to_string(),
        seed_db: false,
    });

    app(Arc::new(AppState { config, db: conn }))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = resp.into_body().collect().await.expect("body").to_bytes();
    let json = if bytes.is_empty() { None } else { serde_json::from_slice(&bytes).ok() };
    (status, json)
}

async fn crear_genero(app: &Router, nombre: &str) -> i64 {
    let (status, body) =
        send(app, "POST", "/api/genres", Some(json!({ "name_genre": nombre }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body.expect("genre body")["id"].as_i64().expect("genre id")
}

async fn crear_sala(app: &Router, nombre: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/salas",
        Some(json!({ "nombre": nombre, "capacidad": 100, "tipo": "2D", "precio": 7.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body.expect("sala body")["id"].as_i64().expect("sala id")
}

async fn crear_pelicula(app: &Router, titulo: &str, genero_id: i64, duracion: i32) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/peliculas",
        Some(json!({
            "titulo": titulo,
            "genero_id": genero_id,
            "duracion": duracion,
            "disponible": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body.expect("pelicula body")["id"].as_i64().expect("pelicula id")
}

async fn crear_horario(app: &Router, pelicula_id: i64, sala_id: i64, hora: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/horarios",
        Some(json!({
            "pelicula_id": pelicula_id,
            "sala_id": sala_id,
            "hora": hora,
            "disponible": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body.expect("horario body")["id"].as_i64().expect("horario id")
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pelicula_create_then_get_round_trip() {
    let app = test_app().await;
    let genero_id = crear_genero(&app, "Drama").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/peliculas",
        Some(json!({
            "titulo": "Mareas",
            "genero_id": genero_id,
            "duracion": 128,
            "disponible": true,
            "director": "Julián Soto",
            "descripcion": "Dos hermanos vuelven al pueblo costero.",
            "idioma": "Español",
            "vose": false,
            "actores": ["Ana Beltrán", "Sergio Lamas"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let creada = body.expect("body");
    let id = creada["id"].as_i64().expect("id");

    let (status, body) = send(&app, "GET", &format!("/api/peliculas/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let leida = body.expect("body");

    assert_eq!(leida["titulo"], "Mareas");
    assert_eq!(leida["genero_id"].as_i64(), Some(genero_id));
    assert_eq!(leida["duracion"], 128);
    assert_eq!(leida["disponible"], true);
    assert_eq!(leida["director"], "Julián Soto");
    assert_eq!(leida["vose"], false);
    assert_eq!(leida["actores"], json!(["Ana Beltrán", "Sergio Lamas"]));
    assert_eq!(leida["genero"]["name_genre"], "Drama");
    assert_eq!(leida, creada);
}

#[tokio::test]
async fn genero_full_update_overwrites_name() {
    let app = test_app().await;
    let id = crear_genero(&app, "Drama").await;

    let (status, body) =
        send(&app, "PUT", &format!("/api/genres/{id}"), Some(json!({ "name_genre": "Comedia" })))
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.expect("body")["name_genre"], "Comedia");

    let (_, body) = send(&app, "GET", &format!("/api/genres/{id}"), None).await;
    assert_eq!(body.expect("body")["name_genre"], "Comedia");
}

#[tokio::test]
async fn horario_round_trip_includes_nested_sala() {
    let app = test_app().await;
    let genero_id = crear_genero(&app, "Acción").await;
    let pelicula_id = crear_pelicula(&app, "El Último Tren", genero_id, 112).await;
    let sala_id = crear_sala(&app, "Sala 1").await;
    let horario_id = crear_horario(&app, pelicula_id, sala_id, "20:00").await;

    let (status, body) = send(&app, "GET", &format!("/api/horarios/{horario_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let horario = body.expect("body");
    assert_eq!(horario["hora"], "20:00");
    assert_eq!(horario["sala"]["nombre"], "Sala 1");
    assert_eq!(horario["sala"]["tipo"], "2D");
}

// ---------------------------------------------------------------------------
// Partial updates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_changes_only_supplied_fields() {
    let app = test_app().await;
    let genero_id = crear_genero(&app, "Drama").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/peliculas",
        Some(json!({
            "titulo": "Mareas",
            "genero_id": genero_id,
            "duracion": 128,
            "disponible": true,
            "director": "Julián Soto",
        })),
    )
    .await;
    let id = body.expect("body")["id"].as_i64().expect("id");

    let (status, body) =
        send(&app, "PATCH", &format!("/api/peliculas/{id}"), Some(json!({ "duracion": 130 })))
            .await;
    assert_eq!(status, StatusCode::OK);
    let actualizada = body.expect("body");

    assert_eq!(actualizada["duracion"], 130);
    assert_eq!(actualizada["titulo"], "Mareas");
    assert_eq!(actualizada["director"], "Julián Soto");
    assert_eq!(actualizada["disponible"], true);
}

#[tokio::test]
async fn patch_with_explicit_null_clears_nullable_field() {
    let app = test_app().await;
    let genero_id = crear_genero(&app, "Drama").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/peliculas",
        Some(json!({
            "titulo": "Mareas",
            "genero_id": genero_id,
            "duracion": 128,
            "disponible": true,
            "director": "Julián Soto",
        })),
    )
    .await;
    let id = body.expect("body")["id"].as_i64().expect("id");

    let (status, body) =
        send(&app, "PATCH", &format!("/api/peliculas/{id}"), Some(json!({ "director": null })))
            .await;
    assert_eq!(status, StatusCode::OK);
    let actualizada = body.expect("body");
    assert_eq!(actualizada["director"], Value::Null);
    assert_eq!(actualizada["titulo"], "Mareas");
}

#[tokio::test]
async fn empty_patch_leaves_row_untouched() {
    let app = test_app().await;
    let id = crear_genero(&app, "Drama").await;

    let (status, body) =
        send(&app, "PATCH", &format!("/api/genres/{id}"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.expect("body")["name_genre"], "Drama");
}

// ---------------------------------------------------------------------------
// Deletes and not-found
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_then_get_returns_not_found() {
    let app = test_app().await;
    let id = crear_genero(&app, "Drama").await;

    let (status, _) = send(&app, "DELETE", &format!("/api/genres/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/genres/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.expect("body")["detail"].as_str().expect("detail").contains("No se ha encontrado"));
}

#[tokio::test]
async fn delete_of_unknown_id_returns_not_found() {
    let app = test_app().await;
    let (status, _) = send(&app, "DELETE", "/api/peliculas/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_unknown_venta_returns_not_found() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/ventas/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.expect("body")["detail"], "No se ha encontrado la venta con id 42");
}

// ---------------------------------------------------------------------------
// Sala validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sala_with_non_positive_capacity_is_rejected_and_not_persisted() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/salas",
        Some(json!({ "nombre": "Sala 1", "capacidad": 0, "tipo": "2D", "precio": 7.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", "/api/salas", None).await;
    assert_eq!(body.expect("body").as_array().expect("list").len(), 0);
}

#[tokio::test]
async fn sala_with_negative_price_is_rejected() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/salas",
        Some(json!({ "nombre": "Sala 1", "capacidad": 50, "tipo": "2D", "precio": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sala_with_unknown_type_is_rejected() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/salas",
        Some(json!({ "nombre": "Sala 1", "capacidad": 50, "tipo": "4DX", "precio": 7.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.expect("body")["detail"], "Tipo de sala inválido");
}

#[tokio::test]
async fn sala_type_is_normalized_to_uppercase() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/salas",
        Some(json!({ "nombre": "Sala IMAX", "capacidad": 240, "tipo": "imax", "precio": 12.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.expect("body")["tipo"], "IMAX");
}

#[tokio::test]
async fn duplicate_sala_name_is_rejected() {
    let app = test_app().await;
    crear_sala(&app, "Sala 1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/salas",
        Some(json!({ "nombre": "Sala 1", "capacidad": 80, "tipo": "3D", "precio": 9.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.expect("body")["detail"].as_str().expect("detail").contains("Ya existe"));
}

// ---------------------------------------------------------------------------
// Referential checks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn horario_with_unknown_references_is_rejected() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/horarios",
        Some(json!({ "pelicula_id": 1, "sala_id": 1, "hora": "20:00", "disponible": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn venta_with_unknown_horario_is_rejected() {
    let app = test_app().await;
    let (status, body) =
        send(&app, "POST", "/api/ventas", Some(json!({ "horario_id": 7, "cantidad": 2 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.expect("body")["detail"], "El horario con id 7 no existe");
}

// ---------------------------------------------------------------------------
// Venta pricing
// ---------------------------------------------------------------------------

async fn montar_horario(app: &Router) -> i64 {
    let genero_id = crear_genero(app, "Acción").await;
    let pelicula_id = crear_pelicula(app, "El Último Tren", genero_id, 112).await;
    let sala_id = crear_sala(app, "Sala 1").await;
    crear_horario(app, pelicula_id, sala_id, "20:00").await
}

#[tokio::test]
async fn venta_price_is_unit_price_times_quantity() {
    let app = test_app().await;
    let horario_id = montar_horario(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/ventas",
        Some(json!({ "horario_id": horario_id, "cantidad": 3, "metodo_pago": "efectivo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let venta = body.expect("body");
    assert_eq!(venta["precio_total"], 24.0);
    assert_eq!(venta["metodo_pago"], "efectivo");
    assert_eq!(venta["horario"]["hora"], "20:00");
}

#[tokio::test]
async fn venta_patch_recomputes_price_when_quantity_changes() {
    let app = test_app().await;
    let horario_id = montar_horario(&app).await;

    let (_, body) =
        send(&app, "POST", "/api/ventas", Some(json!({ "horario_id": horario_id, "cantidad": 3 })))
            .await;
    let id = body.expect("body")["id"].as_i64().expect("id");

    let (status, body) =
        send(&app, "PATCH", &format!("/api/ventas/{id}"), Some(json!({ "cantidad": 2 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.expect("body")["precio_total"], 16.0);
}

#[tokio::test]
async fn venta_patch_without_quantity_keeps_price() {
    let app = test_app().await;
    let horario_id = montar_horario(&app).await;

    let (_, body) =
        send(&app, "POST", "/api/ventas", Some(json!({ "horario_id": horario_id, "cantidad": 3 })))
            .await;
    let id = body.expect("body")["id"].as_i64().expect("id");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/ventas/{id}"),
        Some(json!({ "metodo_pago": "efectivo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let venta = body.expect("body");
    assert_eq!(venta["precio_total"], 24.0);
    assert_eq!(venta["metodo_pago"], "efectivo");
}

#[tokio::test]
async fn venta_full_update_ignores_client_price() {
    let app = test_app().await;
    let horario_id = montar_horario(&app).await;

    let (_, body) =
        send(&app, "POST", "/api/ventas", Some(json!({ "horario_id": horario_id, "cantidad": 3 })))
            .await;
    let id = body.expect("body")["id"].as_i64().expect("id");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/ventas/{id}"),
        Some(json!({
            "horario_id": horario_id,
            "cantidad": 5,
            "metodo_pago": "tarjeta",
            "precio_total": 1.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.expect("body")["precio_total"], 40.0);
}

// ---------------------------------------------------------------------------
// Filtered catalog
// ---------------------------------------------------------------------------

async fn montar_cartelera(app: &Router) -> (i64, i64) {
    let genero_1 = crear_genero(app, "Acción").await;
    let genero_2 = crear_genero(app, "Drama").await;

    let (status, _) = send(
        app,
        "POST",
        "/api/peliculas",
        Some(json!({
            "titulo": "Alpha",
            "genero_id": genero_1,
            "duracion": 90,
            "disponible": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        app,
        "POST",
        "/api/peliculas",
        Some(json!({
            "titulo": "Beta",
            "genero_id": genero_2,
            "duracion": 150,
            "disponible": false,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (genero_1, genero_2)
}

fn titulos(body: Value) -> Vec<String> {
    body.as_array()
        .expect("list")
        .iter()
        .map(|p| p["titulo"].as_str().expect("titulo").to_string())
        .collect()
}

#[tokio::test]
async fn filter_by_max_duration() {
    let app = test_app().await;
    montar_cartelera(&app).await;

    let (status, body) = send(&app, "GET", "/api/peliculas?duracion_max=100", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titulos(body.expect("body")), vec!["Alpha"]);
}

#[tokio::test]
async fn filter_by_availability() {
    let app = test_app().await;
    montar_cartelera(&app).await;

    let (status, body) = send(&app, "GET", "/api/peliculas?disponible=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titulos(body.expect("body")), vec!["Alpha"]);
}

#[tokio::test]
async fn unmatched_genre_with_matched_title_returns_nothing() {
    let app = test_app().await;
    let (_, genero_2) = montar_cartelera(&app).await;

    let uri = format!("/api/peliculas?q=Alpha&genero_id={genero_2}");
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(titulos(body.expect("body")).is_empty());
}

#[tokio::test]
async fn text_search_is_case_insensitive_and_ordered_by_title() {
    let app = test_app().await;
    montar_cartelera(&app).await;

    let (status, body) = send(&app, "GET", "/api/peliculas?q=alpha", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titulos(body.expect("body")), vec!["Alpha"]);

    let (_, body) = send(&app, "GET", "/api/peliculas", None).await;
    assert_eq!(titulos(body.expect("body")), vec!["Alpha", "Beta"]);
}

#[tokio::test]
async fn text_search_matches_serialized_cast_list() {
    let app = test_app().await;
    let genero_id = crear_genero(&app, "Drama").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/peliculas",
        Some(json!({
            "titulo": "Mareas",
            "genero_id": genero_id,
            "duracion": 128,
            "disponible": true,
            "actores": ["Ana Beltrán", "Sergio Lamas"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/api/peliculas?q=beltr%C3%A1n", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titulos(body.expect("body")), vec!["Mareas"]);
}

// ---------------------------------------------------------------------------
// Web surface
// ---------------------------------------------------------------------------

#[tokio::test]
async fn home_page_renders_catalog() {
    let app = test_app().await;
    montar_cartelera(&app).await;

    let req = Request::builder().uri("/").body(Body::empty()).expect("request");
    let resp = app.clone().oneshot(req).await.expect("response");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = resp.into_body().collect().await.expect("body").to_bytes();
    let html = String::from_utf8_lossy(&bytes);
    assert!(html.contains("Alpha"));
    assert!(html.contains("Beta"));
}

#[tokio::test]
async fn venta_form_submission_redirects_to_listing() {
    let app = test_app().await;
    let horario_id = montar_horario(&app).await;

    let req = Request::builder()
        .method("POST")
        .uri("/ventas/new")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("horario_id={horario_id}&cantidad=2&metodo_pago=tarjeta")))
        .expect("request");
    let resp = app.clone().oneshot(req).await.expect("response");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let (_, body) = send(&app, "GET", "/api/ventas", None).await;
    let ventas = body.expect("body");
    assert_eq!(ventas.as_array().expect("list").len(), 1);
    assert_eq!(ventas[0]["precio_total"], 16.0);
}

#[tokio::test]
async fn invalid_venta_form_lists_every_error() {
    let app = test_app().await;

    let req = Request::builder()
        .method("POST")
        .uri("/ventas/new")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("horario_id=&cantidad=abc&metodo_pago=bizum"))
        .expect("request");
    let resp = app.clone().oneshot(req).await.expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let bytes = resp.into_body().collect().await.expect("body").to_bytes();
    let html = String::from_utf8_lossy(&bytes);
    assert!(html.contains("El horario es requerido"));
    assert!(html.contains("La cantidad debe ser un número válido"));
    assert!(html.contains("El método de pago debe ser efectivo o tarjeta"));
}
