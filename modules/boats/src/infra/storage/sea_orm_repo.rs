//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over the connection so tests can hand it an in-memory SQLite
//! handle. Every multi-row write opens its own transaction on that connection.

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::contract::model::{CrewMember, Module, Trip};
use crate::domain::repo::{ModulePatch, TripDetailsPatch, TripsRepository, UniqueViolation};
use crate::infra::storage::entity::{boat_module, crew_member, trip};
use crate::infra::storage::mapper;

/// Unique-index violations become [`UniqueViolation`]; everything else keeps its context.
fn db_err(e: DbErr, what: &'static str) -> anyhow::Error {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => UniqueViolation(detail).into(),
        _ => anyhow::Error::new(e).context(what),
    }
}

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmTripsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmTripsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    async fn crew_of(&self, boat_ids: &[Uuid]) -> anyhow::Result<Vec<crew_member::Model>> {
        crew_member::Entity::find()
            .filter(crew_member::Column::BoatId.is_in(boat_ids.iter().copied()))
            .order_by_asc(crew_member::Column::Role)
            .order_by_asc(crew_member::Column::Email)
            .all(&self.conn)
            .await
            .map_err(|e| db_err(e, "load crew failed"))
    }

    async fn modules_of(&self, boat_ids: &[Uuid]) -> anyhow::Result<Vec<boat_module::Model>> {
        boat_module::Entity::find()
            .filter(boat_module::Column::BoatId.is_in(boat_ids.iter().copied()))
            .order_by_asc(boat_module::Column::SortOrder)
            .all(&self.conn)
            .await
            .map_err(|e| db_err(e, "load modules failed"))
    }
}

fn member_filter(user_id: &str, email: &str) -> Condition {
    Condition::any()
        .add(crew_member::Column::UserId.eq(user_id))
        .add(crew_member::Column::Email.eq(email))
}

#[async_trait]
impl<C> TripsRepository for SeaOrmTripsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn create_trip(&self, t: &Trip) -> anyhow::Result<()> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| db_err(e, "begin create_trip failed"))?;

        trip::Entity::insert(mapper::trip_to_active(t))
            .exec(&txn)
            .await
            .map_err(|e| db_err(e, "insert trip failed"))?;

        if !t.crew.is_empty() {
            crew_member::Entity::insert_many(t.crew.iter().map(|m| mapper::crew_to_active(m, t)))
                .exec(&txn)
                .await
                .map_err(|e| db_err(e, "insert crew failed"))?;
        }

        txn.commit()
            .await
            .map_err(|e| db_err(e, "commit create_trip failed"))
    }

    async fn find_trip(&self, id: Uuid) -> anyhow::Result<Option<Trip>> {
        let Some(row) = trip::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(|e| db_err(e, "find_trip failed"))?
        else {
            return Ok(None);
        };
        let crew = self.crew_of(&[id]).await?;
        let modules = self.modules_of(&[id]).await?;
        mapper::trip_from_entities(row, crew, modules).map(Some)
    }

    async fn find_membership(
        &self,
        trip_id: Uuid,
        user_id: &str,
        email: &str,
    ) -> anyhow::Result<Option<CrewMember>> {
        crew_member::Entity::find()
            .filter(crew_member::Column::BoatId.eq(trip_id))
            .filter(member_filter(user_id, email))
            .order_by_asc(crew_member::Column::Role)
            .one(&self.conn)
            .await
            .map_err(|e| db_err(e, "find_membership failed"))?
            .map(mapper::crew_from_entity)
            .transpose()
    }

    async fn list_trips_for(&self, user_id: &str, email: &str) -> anyhow::Result<Vec<Trip>> {
        let ids: Vec<Uuid> = crew_member::Entity::find()
            .select_only()
            .column(crew_member::Column::BoatId)
            .filter(member_filter(user_id, email))
            .distinct()
            .into_tuple()
            .all(&self.conn)
            .await
            .map_err(|e| db_err(e, "list memberships failed"))?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = trip::Entity::find()
            .filter(trip::Column::Id.is_in(ids.iter().copied()))
            .order_by_desc(trip::Column::CreatedAt)
            .all(&self.conn)
            .await
            .map_err(|e| db_err(e, "list trips failed"))?;

        let mut crew: HashMap<Uuid, Vec<_>> = HashMap::new();
        for m in self.crew_of(&ids).await? {
            crew.entry(m.boat_id).or_default().push(m);
        }
        let mut modules: HashMap<Uuid, Vec<_>> = HashMap::new();
        for m in self.modules_of(&ids).await? {
            modules.entry(m.boat_id).or_default().push(m);
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                mapper::trip_from_entities(
                    row,
                    crew.remove(&id).unwrap_or_default(),
                    modules.remove(&id).unwrap_or_default(),
                )
            })
            .collect()
    }

    async fn update_trip_details(
        &self,
        trip_id: Uuid,
        patch: &TripDetailsPatch,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let mut update = trip::Entity::update_many();
        update = match patch {
            TripDetailsPatch::Name(name) => {
                update.col_expr(trip::Column::Name, Expr::value(name.clone()))
            }
            TripDetailsPatch::Description(description) => update.col_expr(
                trip::Column::Description,
                Expr::value(description.clone()),
            ),
            TripDetailsPatch::Banner(banner) => update
                .col_expr(trip::Column::BannerType, Expr::value(banner.kind.as_str()))
                .col_expr(trip::Column::BannerValue, Expr::value(banner.value.clone()))
                .col_expr(
                    trip::Column::BannerPosition,
                    Expr::value(banner.position.map(i16::from)),
                ),
        };
        let res = update
            .col_expr(trip::Column::UpdatedAt, Expr::value(updated_at))
            .filter(trip::Column::Id.eq(trip_id))
            .exec(&self.conn)
            .await
            .map_err(|e| db_err(e, "update_trip_details failed"))?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_trip(&self, id: Uuid) -> anyhow::Result<bool> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| db_err(e, "begin delete_trip failed"))?;

        boat_module::Entity::delete_many()
            .filter(boat_module::Column::BoatId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| db_err(e, "delete modules failed"))?;
        crew_member::Entity::delete_many()
            .filter(crew_member::Column::BoatId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| db_err(e, "delete crew failed"))?;
        let res = trip::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| db_err(e, "delete trip failed"))?;

        txn.commit()
            .await
            .map_err(|e| db_err(e, "commit delete_trip failed"))?;
        Ok(res.rows_affected > 0)
    }

    async fn insert_module(&self, mut module: Module) -> anyhow::Result<Module> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| db_err(e, "begin insert_module failed"))?;

        let max_order: Option<Option<i32>> = boat_module::Entity::find()
            .select_only()
            .column_as(boat_module::Column::SortOrder.max(), "max_order")
            .filter(boat_module::Column::BoatId.eq(module.boat_id))
            .into_tuple()
            .one(&txn)
            .await
            .map_err(|e| db_err(e, "max sort_order failed"))?;
        module.order = max_order.flatten().unwrap_or(0) + 1;

        boat_module::Entity::insert(mapper::module_to_active(&module)?)
            .exec(&txn)
            .await
            .map_err(|e| db_err(e, "insert module failed"))?;

        txn.commit()
            .await
            .map_err(|e| db_err(e, "commit insert_module failed"))?;
        Ok(module)
    }

    async fn update_module(
        &self,
        trip_id: Uuid,
        module_id: Uuid,
        patch: &ModulePatch,
    ) -> anyhow::Result<bool> {
        let mut update = boat_module::Entity::update_many();
        update = match patch {
            ModulePatch::Mode(mode) => {
                update.col_expr(boat_module::Column::Mode, Expr::value(mode.as_str()))
            }
            ModulePatch::Settings(settings) => update.col_expr(
                boat_module::Column::Settings,
                Expr::value(mapper::encode_settings(settings)?),
            ),
            ModulePatch::Data { data, mode } => {
                let update = update
                    .col_expr(boat_module::Column::Data, Expr::value(mapper::encode_data(data)?));
                match mode {
                    Some(mode) => {
                        update.col_expr(boat_module::Column::Mode, Expr::value(mode.as_str()))
                    }
                    None => update,
                }
            }
        };
        let res = update
            .filter(boat_module::Column::Id.eq(module_id))
            .filter(boat_module::Column::BoatId.eq(trip_id))
            .exec(&self.conn)
            .await
            .map_err(|e| db_err(e, "update_module failed"))?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_module(&self, trip_id: Uuid, module_id: Uuid) -> anyhow::Result<bool> {
        let res = boat_module::Entity::delete_many()
            .filter(boat_module::Column::Id.eq(module_id))
            .filter(boat_module::Column::BoatId.eq(trip_id))
            .exec(&self.conn)
            .await
            .map_err(|e| db_err(e, "delete_module failed"))?;
        Ok(res.rows_affected > 0)
    }

    async fn update_crew_roles(&self, t: &Trip) -> anyhow::Result<()> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| db_err(e, "begin update_crew_roles failed"))?;

        trip::Entity::update_many()
            .col_expr(trip::Column::CaptainUserId, Expr::value(t.captain_user_id.clone()))
            .col_expr(trip::Column::UpdatedAt, Expr::value(t.updated_at))
            .filter(trip::Column::Id.eq(t.id))
            .exec(&txn)
            .await
            .map_err(|e| db_err(e, "update captain failed"))?;

        for m in &t.crew {
            crew_member::Entity::update_many()
                .col_expr(crew_member::Column::Role, Expr::value(m.role.as_str()))
                .filter(crew_member::Column::Id.eq(m.id))
                .filter(crew_member::Column::BoatId.eq(t.id))
                .exec(&txn)
                .await
                .map_err(|e| db_err(e, "update crew role failed"))?;
        }

        txn.commit()
            .await
            .map_err(|e| db_err(e, "commit update_crew_roles failed"))
    }

    async fn delete_crew_member(&self, trip_id: Uuid, member_id: Uuid) -> anyhow::Result<bool> {
        let res = crew_member::Entity::delete_many()
            .filter(crew_member::Column::Id.eq(member_id))
            .filter(crew_member::Column::BoatId.eq(trip_id))
            .exec(&self.conn)
            .await
            .map_err(|e| db_err(e, "delete_crew_member failed"))?;
        Ok(res.rows_affected > 0)
    }

    async fn link_pending_memberships(&self, user_id: &str, email: &str) -> anyhow::Result<u64> {
        let res = crew_member::Entity::update_many()
            .col_expr(crew_member::Column::UserId, Expr::value(user_id))
            .filter(crew_member::Column::Email.eq(email))
            .filter(crew_member::Column::UserId.is_null())
            .exec(&self.conn)
            .await
            .context("link_pending_memberships failed")?;
        Ok(res.rows_affected)
    }
}
