use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    entities::{genero, horario, pelicula, sala, venta},
    error::{AppError, AppResult},
};

pub use crate::entities::venta::MetodoPago;

/// Room presentation formats accepted by the API. Input is matched
/// case-insensitively and stored uppercase.
pub const TIPOS_SALA: [&str; 3] = ["2D", "3D", "IMAX"];

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn non_empty(campo: &str, valor: &str) -> AppResult<String> {
    let trimmed = valor.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("El campo '{campo}' no puede estar vacío")));
    }
    Ok(trimmed.to_string())
}

fn positive_id(campo: &str, valor: i32) -> AppResult<()> {
    if valor < 1 {
        return Err(AppError::validation(format!(
            "El campo '{campo}' debe ser un número positivo"
        )));
    }
    Ok(())
}

fn tipo_sala(valor: &str) -> AppResult<String> {
    let trimmed = non_empty("tipo", valor)?;
    let upper = trimmed.to_uppercase();
    if !TIPOS_SALA.contains(&upper.as_str()) {
        return Err(AppError::validation("Tipo de sala inválido"));
    }
    Ok(upper)
}

/// Distinguishes an absent PATCH field (outer `None`) from an explicit JSON
/// null (`Some(None)`), which clears a nullable column.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

fn actores_to_json(actores: &Option<Vec<String>>) -> Option<serde_json::Value> {
    actores.as_ref().map(|lista| serde_json::json!(lista))
}

fn actores_from_json(valor: Option<serde_json::Value>) -> Option<Vec<String>> {
    valor.and_then(|v| serde_json::from_value(v).ok())
}

// ---------------------------------------------------------------------------
// Genero
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize)]
pub struct GeneroResponse {
    pub id: i32,
    pub name_genre: String,
}

impl From<genero::Model> for GeneroResponse {
    fn from(m: genero::Model) -> Self {
        Self { id: m.id, name_genre: m.name_genre }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneroCreate {
    pub name_genre: String,
}

impl GeneroCreate {
    pub fn normalized(self) -> AppResult<Self> {
        Ok(Self { name_genre: non_empty("name_genre", &self.name_genre)? })
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneroUpdate {
    pub name_genre: String,
}

impl GeneroUpdate {
    pub fn normalized(self) -> AppResult<Self> {
        Ok(Self { name_genre: non_empty("name_genre", &self.name_genre)? })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneroPatch {
    pub name_genre: Option<String>,
}

impl GeneroPatch {
    pub fn normalized(self) -> AppResult<Self> {
        let name_genre = match self.name_genre {
            Some(v) => Some(non_empty("name_genre", &v)?),
            None => None,
        };
        Ok(Self { name_genre })
    }
}

// ---------------------------------------------------------------------------
// Pelicula
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize)]
pub struct PeliculaResponse {
    pub id: i32,
    pub titulo: String,
    pub genero_id: i32,
    pub duracion: i32,
    pub disponible: bool,
    pub director: Option<String>,
    pub descripcion: Option<String>,
    pub trailer: Option<String>,
    pub productora: Option<String>,
    pub idioma: Option<String>,
    pub vose: Option<bool>,
    pub actores: Option<Vec<String>>,
    pub genero: Option<GeneroResponse>,
}

impl PeliculaResponse {
    pub fn from_row((p, g): (pelicula::Model, Option<genero::Model>)) -> Self {
        Self {
            id: p.id,
            titulo: p.titulo,
            genero_id: p.genero_id,
            duracion: p.duracion,
            disponible: p.disponible,
            director: p.director,
            descripcion: p.descripcion,
            trailer: p.trailer,
            productora: p.productora,
            idioma: p.idioma,
            vose: p.vose,
            actores: actores_from_json(p.actores),
            genero: g.map(GeneroResponse::from),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PeliculaCreate {
    pub titulo: String,
    pub genero_id: i32,
    pub duracion: i32,
    pub disponible: bool,
    pub director: Option<String>,
    pub descripcion: Option<String>,
    pub trailer: Option<String>,
    pub productora: Option<String>,
    pub idioma: Option<String>,
    pub vose: Option<bool>,
    pub actores: Option<Vec<String>>,
}

impl PeliculaCreate {
    pub fn normalized(mut self) -> AppResult<Self> {
        self.titulo = non_empty("titulo", &self.titulo)?;
        positive_id("genero_id", self.genero_id)?;
        if self.duracion < 1 {
            return Err(AppError::validation("La duración debe ser un número positivo"));
        }
        Ok(self)
    }

    pub fn actores_json(&self) -> Option<serde_json::Value> {
        actores_to_json(&self.actores)
    }
}

#[derive(Debug, Deserialize)]
pub struct PeliculaUpdate {
    pub titulo: String,
    pub genero_id: i32,
    pub duracion: i32,
    pub disponible: bool,
    pub director: Option<String>,
    pub descripcion: Option<String>,
    pub trailer: Option<String>,
    pub productora: Option<String>,
    pub idioma: Option<String>,
    pub vose: Option<bool>,
    pub actores: Option<Vec<String>>,
}

impl PeliculaUpdate {
    pub fn normalized(mut self) -> AppResult<Self> {
        self.titulo = non_empty("titulo", &self.titulo)?;
        positive_id("genero_id", self.genero_id)?;
        if self.duracion < 1 {
            return Err(AppError::validation("La duración debe ser un número positivo"));
        }
        Ok(self)
    }

    pub fn actores_json(&self) -> Option<serde_json::Value> {
        actores_to_json(&self.actores)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PeliculaPatch {
    pub titulo: Option<String>,
    pub genero_id: Option<i32>,
    pub duracion: Option<i32>,
    pub disponible: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub director: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub descripcion: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub trailer: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub productora: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub idioma: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub vose: Option<Option<bool>>,
    #[serde(default, deserialize_with = "double_option")]
    pub actores: Option<Option<Vec<String>>>,
}

impl PeliculaPatch {
    pub fn normalized(mut self) -> AppResult<Self> {
        if let Some(titulo) = self.titulo.take() {
            self.titulo = Some(non_empty("titulo", &titulo)?);
        }
        if let Some(genero_id) = self.genero_id {
            positive_id("genero_id", genero_id)?;
        }
        if let Some(duracion) = self.duracion {
            if duracion < 1 {
                return Err(AppError::validation("La duración debe ser un número positivo"));
            }
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Sala
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize)]
pub struct SalaResponse {
    pub id: i32,
    pub nombre: String,
    pub capacidad: i32,
    pub tipo: String,
    pub precio: f64,
}

impl From<sala::Model> for SalaResponse {
    fn from(m: sala::Model) -> Self {
        Self { id: m.id, nombre: m.nombre, capacidad: m.capacidad, tipo: m.tipo, precio: m.precio }
    }
}

#[derive(Debug, Deserialize)]
pub struct SalaCreate {
    pub nombre: String,
    pub capacidad: i32,
    pub tipo: String,
    pub precio: f64,
}

impl SalaCreate {
    pub fn normalized(mut self) -> AppResult<Self> {
        self.nombre = non_empty("nombre", &self.nombre)?;
        if self.capacidad <= 0 {
            return Err(AppError::validation("La capacidad debe ser un número positivo"));
        }
        if self.precio < 0.0 {
            return Err(AppError::validation("El precio debe ser un número positivo o cero"));
        }
        self.tipo = tipo_sala(&self.tipo)?;
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct SalaUpdate {
    pub nombre: String,
    pub capacidad: i32,
    pub tipo: String,
    pub precio: f64,
}

impl SalaUpdate {
    pub fn normalized(mut self) -> AppResult<Self> {
        self.nombre = non_empty("nombre", &self.nombre)?;
        if self.capacidad <= 0 {
            return Err(AppError::validation("La capacidad debe ser un número positivo"));
        }
        if self.precio < 0.0 {
            return Err(AppError::validation("El precio debe ser un número positivo o cero"));
        }
        self.tipo = tipo_sala(&self.tipo)?;
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SalaPatch {
    pub nombre: Option<String>,
    pub capacidad: Option<i32>,
    pub tipo: Option<String>,
    pub precio: Option<f64>,
}

impl SalaPatch {
    pub fn normalized(mut self) -> AppResult<Self> {
        if let Some(nombre) = self.nombre.take() {
            self.nombre = Some(non_empty("nombre", &nombre)?);
        }
        if let Some(capacidad) = self.capacidad {
            if capacidad <= 0 {
                return Err(AppError::validation("La capacidad debe ser un número positivo"));
            }
        }
        if let Some(precio) = self.precio {
            if precio < 0.0 {
                return Err(AppError::validation("El precio debe ser un número positivo o cero"));
            }
        }
        if let Some(tipo) = self.tipo.take() {
            self.tipo = Some(tipo_sala(&tipo)?);
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Horario
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize)]
pub struct HorarioResponse {
    pub id: i32,
    pub pelicula_id: i32,
    pub sala_id: i32,
    pub hora: String,
    pub disponible: bool,
    pub sala: Option<SalaResponse>,
}

impl HorarioResponse {
    pub fn from_row((h, s): (horario::Model, Option<sala::Model>)) -> Self {
        Self {
            id: h.id,
            pelicula_id: h.pelicula_id,
            sala_id: h.sala_id,
            hora: h.hora,
            disponible: h.disponible,
            sala: s.map(SalaResponse::from),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HorarioCreate {
    pub pelicula_id: i32,
    pub sala_id: i32,
    pub hora: String,
    pub disponible: bool,
}

impl HorarioCreate {
    pub fn normalized(mut self) -> AppResult<Self> {
        positive_id("pelicula_id", self.pelicula_id)?;
        positive_id("sala_id", self.sala_id)?;
        self.hora = non_empty("hora", &self.hora)?;
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct HorarioUpdate {
    pub pelicula_id: i32,
    pub sala_id: i32,
    pub hora: String,
    pub disponible: bool,
}

impl HorarioUpdate {
    pub fn normalized(mut self) -> AppResult<Self> {
        positive_id("pelicula_id", self.pelicula_id)?;
        positive_id("sala_id", self.sala_id)?;
        self.hora = non_empty("hora", &self.hora)?;
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HorarioPatch {
    pub pelicula_id: Option<i32>,
    pub sala_id: Option<i32>,
    pub hora: Option<String>,
    pub disponible: Option<bool>,
}

impl HorarioPatch {
    pub fn normalized(mut self) -> AppResult<Self> {
        if let Some(pelicula_id) = self.pelicula_id {
            positive_id("pelicula_id", pelicula_id)?;
        }
        if let Some(sala_id) = self.sala_id {
            positive_id("sala_id", sala_id)?;
        }
        if let Some(hora) = self.hora.take() {
            self.hora = Some(non_empty("hora", &hora)?);
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Venta
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize)]
pub struct VentaResponse {
    pub id: i32,
    pub horario_id: i32,
    pub precio_total: f64,
    pub cantidad: i32,
    pub metodo_pago: MetodoPago,
    pub horario: Option<HorarioResponse>,
}

impl VentaResponse {
    pub fn from_row(v: venta::Model, horario: Option<HorarioResponse>) -> Self {
        Self {
            id: v.id,
            horario_id: v.horario_id,
            precio_total: v.precio_total,
            cantidad: v.cantidad,
            metodo_pago: v.metodo_pago,
            horario,
        }
    }
}

fn metodo_pago_default() -> MetodoPago {
    MetodoPago::Tarjeta
}

#[derive(Debug, Deserialize)]
pub struct VentaCreate {
    pub horario_id: i32,
    pub cantidad: i32,
    #[serde(default = "metodo_pago_default")]
    pub metodo_pago: MetodoPago,
}

impl VentaCreate {
    pub fn normalized(self) -> AppResult<Self> {
        positive_id("horario_id", self.horario_id)?;
        if self.cantidad < 1 {
            return Err(AppError::validation("La cantidad debe ser un número positivo"));
        }
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct VentaUpdate {
    pub horario_id: i32,
    pub cantidad: i32,
    pub metodo_pago: MetodoPago,
    pub precio_total: f64,
}

impl VentaUpdate {
    pub fn normalized(self) -> AppResult<Self> {
        positive_id("horario_id", self.horario_id)?;
        if self.cantidad < 1 {
            return Err(AppError::validation("La cantidad debe ser un número positivo"));
        }
        if self.precio_total < 0.0 {
            return Err(AppError::validation("El precio total debe ser un número positivo"));
        }
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VentaPatch {
    pub horario_id: Option<i32>,
    pub cantidad: Option<i32>,
    pub metodo_pago: Option<MetodoPago>,
    pub precio_total: Option<f64>,
}

impl VentaPatch {
    pub fn normalized(self) -> AppResult<Self> {
        if let Some(horario_id) = self.horario_id {
            positive_id("horario_id", horario_id)?;
        }
        if let Some(cantidad) = self.cantidad {
            if cantidad < 1 {
                return Err(AppError::validation("La cantidad debe ser un número positivo"));
            }
        }
        if let Some(precio_total) = self.precio_total {
            if precio_total < 0.0 {
                return Err(AppError::validation("El precio debe ser un número positivo"));
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims_whitespace() {
        let dto = GeneroCreate { name_genre: "  Drama  ".to_string() };
        assert_eq!(dto.normalized().unwrap().name_genre, "Drama");
    }

    #[test]
    fn empty_name_rejected() {
        let dto = GeneroCreate { name_genre: "   ".to_string() };
        assert!(matches!(dto.normalized(), Err(AppError::Validation(_))));
    }

    #[test]
    fn tipo_sala_normalizes_case() {
        let dto = SalaCreate {
            nombre: "Sala 5".to_string(),
            capacidad: 80,
            tipo: "imax".to_string(),
            precio: 10.0,
        };
        assert_eq!(dto.normalized().unwrap().tipo, "IMAX");
    }

    #[test]
    fn tipo_sala_rejects_unknown_format() {
        let dto = SalaCreate {
            nombre: "Sala 5".to_string(),
            capacidad: 80,
            tipo: "4DX".to_string(),
            precio: 10.0,
        };
        assert!(matches!(dto.normalized(), Err(AppError::Validation(_))));
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let patch: PeliculaPatch = serde_json::from_str(r#"{"director": null}"#).unwrap();
        assert_eq!(patch.director, Some(None));
        assert_eq!(patch.descripcion, None);

        let patch: PeliculaPatch = serde_json::from_str(r#"{"director": "Ruiz"}"#).unwrap();
        assert_eq!(patch.director, Some(Some("Ruiz".to_string())));
    }

    #[test]
    fn venta_create_defaults_to_tarjeta() {
        let dto: VentaCreate = serde_json::from_str(r#"{"horario_id": 1, "cantidad": 2}"#).unwrap();
        assert_eq!(dto.metodo_pago, MetodoPago::Tarjeta);
    }
}
