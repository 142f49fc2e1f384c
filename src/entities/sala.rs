use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "salas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub nombre: String,
    pub capacidad: i32,
    pub tipo: String,
    pub precio: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::horario::Entity")]
    Horario,
}

impl Related<super::horario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Horario.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
