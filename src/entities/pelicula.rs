use sea_orm::entity::prelude::*;

// The cast list lives in a single JSON column rather than a join table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "peliculas")]
pub struct Model {
    #[sea_orm(primary_key)]
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
    pub actores: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::genero::Entity",
        from = "Column::GeneroId",
        to = "super::genero::Column::Id"
    )]
    Genero,
    #[sea_orm(has_many = "super::horario::Entity")]
    Horario,
}

impl Related<super::genero::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Genero.def()
    }
}

impl Related<super::horario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Horario.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
