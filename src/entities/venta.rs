use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum MetodoPago {
    #[sea_orm(string_value = "efectivo")]
    Efectivo,
    #[sea_orm(string_value = "tarjeta")]
    Tarjeta,
}

impl MetodoPago {
    pub fn as_str(self) -> &'static str {
        match self {
            MetodoPago::Efectivo => "efectivo",
            MetodoPago::Tarjeta => "tarjeta",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "efectivo" => Some(MetodoPago::Efectivo),
            "tarjeta" => Some(MetodoPago::Tarjeta),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ventas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub horario_id: i32,
    pub precio_total: f64,
    pub cantidad: i32,
    pub metodo_pago: MetodoPago,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::horario::Entity",
        from = "Column::HorarioId",
        to = "super::horario::Column::Id"
    )]
    Horario,
}

impl Related<super::horario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Horario.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
