use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub banner_type: String,
    #[sea_orm(column_type = "Text")]
    pub banner_value: String,
    pub banner_position: Option<i16>,
    pub captain_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::crew_member::Entity")]
    CrewMember,
    #[sea_orm(has_many = "super::boat_module::Entity")]
    BoatModule,
}

impl Related<super::crew_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CrewMember.def()
    }
}

impl Related<super::boat_module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BoatModule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
