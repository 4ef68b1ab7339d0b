//! Writes from another member landing between a command's load and its store.
//!
//! `Interleaving` wraps the SeaORM repository and, once armed, commits a
//! competing patch right before it forwards the next update.

mod common;

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use boats::{
    config::BoatsConfig,
    contract::model::{
        Banner, BannerType, CrewMember, Module, ModuleKind, ModuleMode, ModulePayload, NewModule,
        PollOption, Trip,
    },
    domain::repo::{ModulePatch, TripDetailsPatch, TripsRepository},
    infra::storage::SeaOrmTripsRepository,
    Boats,
};

use common::{captain, create_test_db, member, new_trip, MockIdentity, CAPTAIN_ID};

struct Interleaving {
    inner: Arc<dyn TripsRepository>,
    module_write: Mutex<Option<ModulePatch>>,
    details_write: Mutex<Option<TripDetailsPatch>>,
}

impl Interleaving {
    fn new(inner: Arc<dyn TripsRepository>) -> Self {
        Self {
            inner,
            module_write: Mutex::new(None),
            details_write: Mutex::new(None),
        }
    }

    fn before_next_module_update(&self, patch: ModulePatch) {
        *self.module_write.lock().unwrap() = Some(patch);
    }

    fn before_next_details_update(&self, patch: TripDetailsPatch) {
        *self.details_write.lock().unwrap() = Some(patch);
    }
}

#[async_trait]
impl TripsRepository for Interleaving {
    async fn create_trip(&self, trip: &Trip) -> anyhow::Result<()> {
        self.inner.create_trip(trip).await
    }

    async fn find_trip(&self, id: Uuid) -> anyhow::Result<Option<Trip>> {
        self.inner.find_trip(id).await
    }

    async fn find_membership(
        &self,
        trip_id: Uuid,
        user_id: &str,
        email: &str,
    ) -> anyhow::Result<Option<CrewMember>> {
        self.inner.find_membership(trip_id, user_id, email).await
    }

    async fn list_trips_for(&self, user_id: &str, email: &str) -> anyhow::Result<Vec<Trip>> {
        self.inner.list_trips_for(user_id, email).await
    }

    async fn update_trip_details(
        &self,
        trip_id: Uuid,
        patch: &TripDetailsPatch,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let competing = self.details_write.lock().unwrap().take();
        if let Some(competing) = competing {
            self.inner
                .update_trip_details(trip_id, &competing, updated_at)
                .await?;
        }
        self.inner
            .update_trip_details(trip_id, patch, updated_at)
            .await
    }

    async fn delete_trip(&self, id: Uuid) -> anyhow::Result<bool> {
        self.inner.delete_trip(id).await
    }

    async fn insert_module(&self, module: Module) -> anyhow::Result<Module> {
        self.inner.insert_module(module).await
    }

    async fn update_module(
        &self,
        trip_id: Uuid,
        module_id: Uuid,
        patch: &ModulePatch,
    ) -> anyhow::Result<bool> {
        let competing = self.module_write.lock().unwrap().take();
        if let Some(competing) = competing {
            self.inner
                .update_module(trip_id, module_id, &competing)
                .await?;
        }
        self.inner.update_module(trip_id, module_id, patch).await
    }

    async fn delete_module(&self, trip_id: Uuid, module_id: Uuid) -> anyhow::Result<bool> {
        self.inner.delete_module(trip_id, module_id).await
    }

    async fn update_crew_roles(&self, trip: &Trip) -> anyhow::Result<()> {
        self.inner.update_crew_roles(trip).await
    }

    async fn delete_crew_member(&self, trip_id: Uuid, member_id: Uuid) -> anyhow::Result<bool> {
        self.inner.delete_crew_member(trip_id, member_id).await
    }

    async fn link_pending_memberships(&self, user_id: &str, email: &str) -> anyhow::Result<u64> {
        self.inner.link_pending_memberships(user_id, email).await
    }
}

async fn interleaved_boats() -> (Boats, Arc<Interleaving>) {
    let db = create_test_db().await;
    let repo = Arc::new(Interleaving::new(Arc::new(SeaOrmTripsRepository::new(db))));
    let boats = Boats::with_ports(
        repo.clone(),
        Arc::new(MockIdentity::default()),
        &BoatsConfig::default(),
    );
    (boats, repo)
}

fn poll(ids: &[&str]) -> ModulePayload {
    ModulePayload::Poll(
        ids.iter()
            .map(|id| PollOption {
                id: id.to_string(),
                author: CAPTAIN_ID.to_string(),
                text: format!("Option {id}"),
                votes: BTreeSet::new(),
                selected: false,
            })
            .collect(),
    )
}

fn saved(data: ModulePayload) -> ModulePatch {
    ModulePatch::Data {
        data,
        mode: Some(ModuleMode::View),
    }
}

#[tokio::test]
async fn test_mode_toggle_keeps_concurrently_saved_data() -> Result<()> {
    let (boats, repo) = interleaved_boats().await;
    let service = boats.service();
    let trip = service
        .create_trip(&captain(), new_trip("Race", &["crew@x.com"]))
        .await?
        .trip;
    let module = service
        .add_module(&captain(), trip.id, NewModule::of_kind(ModuleKind::Poll))
        .await?;
    service
        .save_module_data(&captain(), trip.id, module.id, poll(&["a"]))
        .await?;

    repo.before_next_module_update(saved(poll(&["b"])));
    service
        .set_module_mode(&captain(), trip.id, module.id, ModuleMode::Edit)
        .await?;

    let stored = service.get_trip(&captain(), trip.id).await?;
    let stored_module = stored.module(module.id).unwrap();
    assert_eq!(stored_module.data, poll(&["b"]));
    assert_eq!(stored_module.mode, ModuleMode::Edit);
    Ok(())
}

#[tokio::test]
async fn test_settings_save_keeps_concurrently_saved_data() -> Result<()> {
    let (boats, repo) = interleaved_boats().await;
    let service = boats.service();
    let trip = service
        .create_trip(&captain(), new_trip("Race", &[]))
        .await?
        .trip;
    let module = service
        .add_module(&captain(), trip.id, NewModule::of_kind(ModuleKind::Poll))
        .await?;

    let mut settings = module.settings.clone();
    settings.allow_multiple = false;
    repo.before_next_module_update(saved(poll(&["a", "b"])));
    service
        .save_module_settings(&captain(), trip.id, module.id, settings)
        .await?;

    let stored = service.get_trip(&captain(), trip.id).await?;
    let stored_module = stored.module(module.id).unwrap();
    assert_eq!(stored_module.data, poll(&["a", "b"]));
    assert_eq!(stored_module.mode, ModuleMode::View);
    assert!(!stored_module.settings.allow_multiple);
    Ok(())
}

#[tokio::test]
async fn test_select_option_keeps_concurrent_mode_change() -> Result<()> {
    let (boats, repo) = interleaved_boats().await;
    let service = boats.service();
    let trip = service
        .create_trip(&captain(), new_trip("Race", &["crew@x.com"]))
        .await?
        .trip;
    let module = service
        .add_module(&captain(), trip.id, NewModule::of_kind(ModuleKind::Poll))
        .await?;
    service
        .save_module_data(&captain(), trip.id, module.id, poll(&["a"]))
        .await?;

    repo.before_next_module_update(ModulePatch::Mode(ModuleMode::Edit));
    service
        .select_option(&member("user_crew", "crew@x.com"), trip.id, module.id, "a".into())
        .await?;

    let stored = service.get_trip(&captain(), trip.id).await?;
    let stored_module = stored.module(module.id).unwrap();
    assert_eq!(stored_module.mode, ModuleMode::Edit);
    let ModulePayload::Poll(options) = &stored_module.data else {
        panic!("poll payload expected");
    };
    assert!(options[0].selected);
    Ok(())
}

#[tokio::test]
async fn test_rename_keeps_concurrent_banner_and_description() -> Result<()> {
    let (boats, repo) = interleaved_boats().await;
    let service = boats.service();
    let trip = service
        .create_trip(&captain(), new_trip("Before", &[]))
        .await?
        .trip;

    let banner = Banner {
        kind: BannerType::Color,
        value: "#0b3d91".into(),
        position: None,
    };
    repo.before_next_details_update(TripDetailsPatch::Banner(banner.clone()));
    service
        .rename_trip(&captain(), trip.id, "After".into())
        .await?;

    repo.before_next_details_update(TripDetailsPatch::Description("Two nights".into()));
    service
        .update_banner(&captain(), trip.id, banner.clone())
        .await?;

    let stored = service.get_trip(&captain(), trip.id).await?;
    assert_eq!(stored.name, "After");
    assert_eq!(stored.banner, banner);
    assert_eq!(stored.description, "Two nights");
    Ok(())
}
