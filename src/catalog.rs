use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Select,
    sea_query::{Alias, Expr, Func},
};

use crate::{
    entities::{genero, pelicula},
    error::AppResult,
};

/// Filters accepted by the homepage and by `GET /api/peliculas`.
#[derive(Clone, Debug, Default)]
pub struct FiltroPeliculas {
    /// Case-insensitive substring matched against titulo, director,
    /// descripcion and the serialized cast list.
    pub q: Option<String>,
    pub genero_id: Option<i32>,
    pub duracion_max: Option<i32>,
    /// When true, only movies currently on the listings.
    pub disponible: bool,
}

impl FiltroPeliculas {
    pub fn is_empty(&self) -> bool {
        self.q.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.genero_id.is_none()
            && self.duracion_max.is_none()
            && !self.disponible
    }
}

fn seleccion_filtrada(filtro: &FiltroPeliculas) -> Select<pelicula::Entity> {
    let mut cond = Condition::all();

    if let Some(q) = filtro.q.as_deref() {
        let q = q.trim();
        if !q.is_empty() {
            let term = format!("%{}%", q.to_lowercase());
            // actores is a JSON column; substring match runs over its
            // serialized text form, as the original did with CAST(... AS TEXT).
            cond = cond.add(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            pelicula::Entity,
                            pelicula::Column::Titulo,
                        ))))
                        .like(&term),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            pelicula::Entity,
                            pelicula::Column::Director,
                        ))))
                        .like(&term),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            pelicula::Entity,
                            pelicula::Column::Descripcion,
                        ))))
                        .like(&term),
                    )
                    .add(
                        Expr::expr(Func::lower(
                            Expr::col((pelicula::Entity, pelicula::Column::Actores))
                                .cast_as(Alias::new("TEXT")),
                        ))
                        .like(&term),
                    ),
            );
        }
    }

    if let Some(genero_id) = filtro.genero_id {
        cond = cond.add(pelicula::Column::GeneroId.eq(genero_id));
    }

    if let Some(duracion_max) = filtro.duracion_max {
        if duracion_max > 0 {
            cond = cond.add(pelicula::Column::Duracion.lte(duracion_max));
        }
    }

    if filtro.disponible {
        cond = cond.add(pelicula::Column::Disponible.eq(true));
    }

    pelicula::Entity::find().filter(cond).order_by_asc(pelicula::Column::Titulo)
}

/// Runs the combined homepage filter, eager-loading each movie's genre.
pub async fn peliculas_filtradas<C: ConnectionTrait>(
    db: &C,
    filtro: &FiltroPeliculas,
) -> AppResult<Vec<(pelicula::Model, Option<genero::Model>)>> {
    Ok(seleccion_filtrada(filtro).find_also_related(genero::Entity).all(db).await?)
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;

    fn sql_for(filtro: FiltroPeliculas) -> String {
        seleccion_filtrada(&filtro).build(DbBackend::Sqlite).to_string()
    }

    #[test]
    fn no_filters_only_orders_by_title() {
        let sql = sql_for(FiltroPeliculas::default());
        assert!(!sql.contains("WHERE"), "unexpected WHERE in: {sql}");
        assert!(sql.contains("ORDER BY \"peliculas\".\"titulo\" ASC"));
    }

    #[test]
    fn text_search_covers_all_searchable_columns() {
        let sql = sql_for(FiltroPeliculas { q: Some("Alpha".to_string()), ..Default::default() });
        for col in ["titulo", "director", "descripcion", "actores"] {
            assert!(sql.contains(col), "missing {col} in: {sql}");
        }
        assert!(sql.contains("LIKE"));
        assert!(sql.contains("%alpha%"), "search term not lowercased: {sql}");
    }

    #[test]
    fn parametric_filters_are_and_combined() {
        let sql = sql_for(FiltroPeliculas {
            q: None,
            genero_id: Some(2),
            duracion_max: Some(120),
            disponible: true,
        });
        assert!(sql.contains("\"genero_id\" = 2"));
        assert!(sql.contains("\"duracion\" <= 120"));
        assert!(sql.contains("AND"));
    }

    #[test]
    fn non_positive_duration_cap_is_ignored() {
        let sql = sql_for(FiltroPeliculas { duracion_max: Some(0), ..Default::default() });
        assert!(!sql.contains("duracion"), "duracion filter should be dropped: {sql}");
    }

    #[test]
    fn blank_search_is_ignored() {
        let filtro = FiltroPeliculas { q: Some("   ".to_string()), ..Default::default() };
        assert!(filtro.is_empty());
        assert!(!sql_for(filtro).contains("LIKE"));
    }
}
