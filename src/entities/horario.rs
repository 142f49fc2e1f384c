use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "horarios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub pelicula_id: i32,
    pub sala_id: i32,
    pub hora: String,
    pub disponible: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pelicula::Entity",
        from = "Column::PeliculaId",
        to = "super::pelicula::Column::Id"
    )]
    Pelicula,
    #[sea_orm(
        belongs_to = "super::sala::Entity",
        from = "Column::SalaId",
        to = "super::sala::Column::Id"
    )]
    Sala,
    #[sea_orm(has_many = "super::venta::Entity")]
    Venta,
}

impl Related<super::pelicula::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pelicula.def()
    }
}

impl Related<super::sala::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sala.def()
    }
}

impl Related<super::venta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venta.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
