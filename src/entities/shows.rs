use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub theater_id: i32,
    pub date: DateTime,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::theaters::Entity",
        from = "Column::TheaterId",
        to = "super::theaters::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Theaters,

    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
}

impl Related<super::theaters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Theaters.def()
    }
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
