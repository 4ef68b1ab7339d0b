//! Trip state transitions.
//!
//! Every mutation of a loaded [`Trip`] goes through [`apply`]: one exhaustive
//! command enum, one function, no shared mutable state. The service persists
//! whatever part of the returned trip the command touched.

use chrono::{DateTime, Utc};

use crate::contract::model::{
    Banner, CrewMemberId, Module, ModuleId, ModuleKind, ModuleMode, ModulePayload,
    ModuleSettings, Role, Trip,
};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub enum TripCommand {
    Rename { name: String },
    UpdateDescription { description: String },
    UpdateBanner { banner: Banner },
    AddModule { module: Module },
    RemoveModule { module_id: ModuleId },
    SetModuleMode { module_id: ModuleId, mode: ModuleMode },
    SaveModuleData { module_id: ModuleId, data: ModulePayload },
    SaveModuleSettings { module_id: ModuleId, settings: ModuleSettings },
    SelectOption { module_id: ModuleId, option_id: String },
    ChangeCrewRole { member_id: CrewMemberId, role: Role },
    RemoveCrewMember { member_id: CrewMemberId },
}

impl TripCommand {
    /// Whether the command changes trip-level columns (and so bumps `updated_at`).
    fn touches_details(&self) -> bool {
        matches!(
            self,
            Self::Rename { .. } | Self::UpdateDescription { .. } | Self::UpdateBanner { .. }
        )
    }
}

/// Order for the next module: one past the highest live order.
///
/// Equals `count + 1` while no module has been removed; never reuses an
/// order that is still taken.
pub fn next_module_order(trip: &Trip) -> i32 {
    trip.modules.values().map(|m| m.order).max().unwrap_or(0) + 1
}

/// Apply `command` to `trip`, returning the new state or the rule it broke.
pub fn apply(trip: Trip, command: TripCommand) -> Result<Trip, DomainError> {
    apply_at(trip, command, Utc::now())
}

pub(crate) fn apply_at(
    mut trip: Trip,
    command: TripCommand,
    now: DateTime<Utc>,
) -> Result<Trip, DomainError> {
    let touches_details = command.touches_details();

    match command {
        TripCommand::Rename { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::EmptyName);
            }
            trip.name = name.to_string();
        }
        TripCommand::UpdateDescription { description } => {
            trip.description = description.trim().to_string();
        }
        TripCommand::UpdateBanner { banner } => {
            if matches!(banner.position, Some(p) if p > 100) {
                return Err(DomainError::validation("banner.position", "must be within 0..=100"));
            }
            trip.banner = banner;
        }
        TripCommand::AddModule { module } => {
            if module.boat_id != trip.id {
                return Err(DomainError::validation("module.boatId", "belongs to another trip"));
            }
            if module.data.kind() != module.kind {
                return Err(kind_mismatch(module.kind, module.data.kind()));
            }
            if trip.modules.values().any(|m| m.order == module.order) {
                return Err(DomainError::conflict(format!(
                    "module order {} is already taken",
                    module.order
                )));
            }
            trip.modules.insert(module.id, module);
        }
        TripCommand::RemoveModule { module_id } => {
            trip.modules
                .remove(&module_id)
                .ok_or_else(|| DomainError::module_not_found(module_id))?;
        }
        TripCommand::SetModuleMode { module_id, mode } => {
            module_mut(&mut trip, module_id)?.mode = mode;
        }
        TripCommand::SaveModuleData { module_id, data } => {
            let module = module_mut(&mut trip, module_id)?;
            if data.kind() != module.kind {
                return Err(kind_mismatch(module.kind, data.kind()));
            }
            module.data = data;
            module.mode = ModuleMode::View;
        }
        TripCommand::SaveModuleSettings {
            module_id,
            settings,
        } => {
            module_mut(&mut trip, module_id)?.settings = settings;
        }
        TripCommand::SelectOption {
            module_id,
            option_id,
        } => {
            let module = module_mut(&mut trip, module_id)?;
            let kind = module.kind;
            let ModulePayload::Poll(options) = &mut module.data else {
                return Err(DomainError::validation(
                    "optionId",
                    format!("{kind} modules have no selectable options"),
                ));
            };
            // Other options are left as they are, even when allow_multiple is false.
            if let Some(option) = options.iter_mut().find(|o| o.id == option_id) {
                option.selected = true;
            }
        }
        TripCommand::ChangeCrewRole { member_id, role } => {
            change_crew_role(&mut trip, member_id, role)?;
        }
        TripCommand::RemoveCrewMember { member_id } => {
            let idx = trip
                .crew
                .iter()
                .position(|m| m.id == member_id)
                .ok_or_else(|| DomainError::crew_member_not_found(member_id))?;
            if trip.crew[idx].role == Role::Captain {
                return Err(DomainError::validation(
                    "crewMemberId",
                    "the captain cannot be removed from the trip",
                ));
            }
            trip.crew.remove(idx);
        }
    }

    if touches_details {
        trip.updated_at = now;
    }
    Ok(trip)
}

fn module_mut(trip: &mut Trip, module_id: ModuleId) -> Result<&mut Module, DomainError> {
    trip.modules
        .get_mut(&module_id)
        .ok_or_else(|| DomainError::module_not_found(module_id))
}

fn kind_mismatch(expected: ModuleKind, got: ModuleKind) -> DomainError {
    DomainError::validation(
        "data",
        format!("{got} payload does not fit a {expected} module"),
    )
}

fn change_crew_role(
    trip: &mut Trip,
    member_id: CrewMemberId,
    role: Role,
) -> Result<(), DomainError> {
    let target = trip
        .crew_member(member_id)
        .ok_or_else(|| DomainError::crew_member_not_found(member_id))?
        .clone();

    match (target.role, role) {
        (Role::Captain, Role::Captain) | (Role::Crew, Role::Crew) => Ok(()),
        (Role::Captain, Role::Crew) => Err(DomainError::validation(
            "role",
            "promote another crew member to hand over captaincy",
        )),
        (Role::Crew, Role::Captain) => {
            let Some(user_id) = target.user_id else {
                return Err(DomainError::validation(
                    "crewMemberId",
                    "pending invitees cannot become captain",
                ));
            };
            for member in &mut trip.crew {
                member.role = if member.id == member_id {
                    Role::Captain
                } else {
                    Role::Crew
                };
            }
            trip.captain_user_id = user_id;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{CrewMember, PollOption};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn trip() -> Trip {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Trip {
            id,
            name: "Summer Regatta".into(),
            description: String::new(),
            banner: Banner::default(),
            captain_user_id: "user_alice".into(),
            crew: vec![
                CrewMember {
                    id: Uuid::new_v4(),
                    boat_id: id,
                    user_id: Some("user_alice".into()),
                    email: "alice@x.com".into(),
                    role: Role::Captain,
                },
                CrewMember {
                    id: Uuid::new_v4(),
                    boat_id: id,
                    user_id: Some("user_bob".into()),
                    email: "bob@x.com".into(),
                    role: Role::Crew,
                },
                CrewMember {
                    id: Uuid::new_v4(),
                    boat_id: id,
                    user_id: None,
                    email: "carol@x.com".into(),
                    role: Role::Crew,
                },
            ],
            modules: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn module(trip: &Trip, kind: ModuleKind) -> Module {
        Module {
            id: Uuid::new_v4(),
            boat_id: trip.id,
            kind,
            name: kind.to_string(),
            description: String::new(),
            order: next_module_order(trip),
            settings: ModuleSettings::default(),
            data: ModulePayload::empty(kind),
            mode: ModuleMode::Edit,
        }
    }

    fn with_module(trip: Trip, kind: ModuleKind) -> (Trip, ModuleId) {
        let m = module(&trip, kind);
        let id = m.id;
        (apply(trip, TripCommand::AddModule { module: m }).unwrap(), id)
    }

    fn option(id: &str, selected: bool) -> PollOption {
        PollOption {
            id: id.into(),
            author: "alice@x.com".into(),
            text: id.to_uppercase(),
            votes: Default::default(),
            selected,
        }
    }

    fn captains(trip: &Trip) -> Vec<&CrewMember> {
        trip.crew.iter().filter(|m| m.role == Role::Captain).collect()
    }

    #[test]
    fn rename_trims_and_rejects_blank() {
        let t = apply(trip(), TripCommand::Rename { name: "  Alpha  ".into() }).unwrap();
        assert_eq!(t.name, "Alpha");

        let err = apply(t, TripCommand::Rename { name: "   ".into() }).unwrap_err();
        assert_eq!(err, DomainError::EmptyName);
    }

    #[test]
    fn detail_changes_bump_updated_at() {
        let t = trip();
        let later = t.updated_at + chrono::Duration::minutes(5);
        let t = apply_at(
            t,
            TripCommand::UpdateDescription {
                description: "Lake weekend".into(),
            },
            later,
        )
        .unwrap();
        assert_eq!(t.updated_at, later);
    }

    #[test]
    fn banner_position_is_bounded() {
        let banner = Banner {
            position: Some(101),
            ..Banner::default()
        };
        let err = apply(trip(), TripCommand::UpdateBanner { banner }).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn sequential_adds_get_increasing_orders() {
        let mut t = trip();
        for _ in 0..4 {
            t = with_module(t, ModuleKind::Poll).0;
        }
        let orders: Vec<i32> = t.ordered_modules().iter().map(|m| m.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }

    #[test]
    fn remove_then_add_never_duplicates_a_live_order() {
        let (t, first) = with_module(trip(), ModuleKind::Poll);
        let (t, _) = with_module(t, ModuleKind::DatePoll);
        let (t, _) = with_module(t, ModuleKind::Itinerary);
        let t = apply(t, TripCommand::RemoveModule { module_id: first }).unwrap();

        let (t, added) = with_module(t, ModuleKind::Poll);
        assert_eq!(t.module(added).unwrap().order, 4);

        let mut orders: Vec<i32> = t.modules.values().map(|m| m.order).collect();
        orders.sort_unstable();
        orders.dedup();
        assert_eq!(orders.len(), t.modules.len());
    }

    #[test]
    fn add_rejects_taken_order() {
        let (t, _) = with_module(trip(), ModuleKind::Poll);
        let mut clash = module(&t, ModuleKind::Poll);
        clash.order = 1;
        let err = apply(t, TripCommand::AddModule { module: clash }).unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[test]
    fn new_module_starts_in_edit_and_save_switches_to_view() {
        let (t, id) = with_module(trip(), ModuleKind::Poll);
        assert_eq!(t.module(id).unwrap().mode, ModuleMode::Edit);

        let data = ModulePayload::Poll(vec![option("a", false)]);
        let t = apply(
            t,
            TripCommand::SaveModuleData {
                module_id: id,
                data: data.clone(),
            },
        )
        .unwrap();
        let m = t.module(id).unwrap();
        assert_eq!(m.mode, ModuleMode::View);
        assert_eq!(m.data, data);

        let t = apply(
            t,
            TripCommand::SetModuleMode {
                module_id: id,
                mode: ModuleMode::Edit,
            },
        )
        .unwrap();
        assert_eq!(t.module(id).unwrap().mode, ModuleMode::Edit);
    }

    #[test]
    fn later_save_replaces_data_wholesale() {
        let (t, id) = with_module(trip(), ModuleKind::Poll);
        let a = ModulePayload::Poll(vec![option("a", false), option("b", false)]);
        let b = ModulePayload::Poll(vec![option("c", false)]);
        let t = apply(t, TripCommand::SaveModuleData { module_id: id, data: a }).unwrap();
        let t = apply(
            t,
            TripCommand::SaveModuleData {
                module_id: id,
                data: b.clone(),
            },
        )
        .unwrap();
        assert_eq!(t.module(id).unwrap().data, b);
    }

    #[test]
    fn save_rejects_payload_of_another_kind() {
        let (t, id) = with_module(trip(), ModuleKind::Poll);
        let err = apply(
            t,
            TripCommand::SaveModuleData {
                module_id: id,
                data: ModulePayload::Itinerary(vec![]),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn module_commands_report_missing_module() {
        let missing = Uuid::new_v4();
        let err = apply(
            trip(),
            TripCommand::SetModuleMode {
                module_id: missing,
                mode: ModuleMode::View,
            },
        )
        .unwrap_err();
        assert_eq!(err, DomainError::module_not_found(missing));
    }

    #[test]
    fn select_option_leaves_single_choice_poll_dual_selected() {
        let (t, id) = with_module(trip(), ModuleKind::Poll);
        let t = apply(
            t,
            TripCommand::SaveModuleSettings {
                module_id: id,
                settings: ModuleSettings {
                    allow_multiple: false,
                    ..ModuleSettings::default()
                },
            },
        )
        .unwrap();
        let t = apply(
            t,
            TripCommand::SaveModuleData {
                module_id: id,
                data: ModulePayload::Poll(vec![option("a", true), option("b", false)]),
            },
        )
        .unwrap();

        let t = apply(
            t,
            TripCommand::SelectOption {
                module_id: id,
                option_id: "b".into(),
            },
        )
        .unwrap();

        // Known defect: "a" stays selected next to "b".
        let ModulePayload::Poll(options) = &t.module(id).unwrap().data else {
            panic!("poll payload expected");
        };
        assert!(options.iter().all(|o| o.selected));
    }

    #[test]
    fn select_unknown_option_is_a_no_op() {
        let (t, id) = with_module(trip(), ModuleKind::Poll);
        let t = apply(
            t,
            TripCommand::SaveModuleData {
                module_id: id,
                data: ModulePayload::Poll(vec![option("a", false)]),
            },
        )
        .unwrap();
        let before = t.module(id).unwrap().clone();
        let t = apply(
            t,
            TripCommand::SelectOption {
                module_id: id,
                option_id: "zzz".into(),
            },
        )
        .unwrap();
        assert_eq!(t.module(id).unwrap(), &before);
    }

    #[test]
    fn select_on_non_poll_is_rejected() {
        let (t, id) = with_module(trip(), ModuleKind::Itinerary);
        let err = apply(
            t,
            TripCommand::SelectOption {
                module_id: id,
                option_id: "a".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn promoting_crew_transfers_captaincy() {
        let t = trip();
        let bob = t.crew[1].id;
        let t = apply(
            t,
            TripCommand::ChangeCrewRole {
                member_id: bob,
                role: Role::Captain,
            },
        )
        .unwrap();

        let caps = captains(&t);
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].id, bob);
        assert_eq!(t.captain_user_id, "user_bob");
        assert_eq!(t.crew[0].role, Role::Crew);
    }

    #[test]
    fn captain_cannot_be_demoted_directly() {
        let t = trip();
        let alice = t.crew[0].id;
        let err = apply(
            t,
            TripCommand::ChangeCrewRole {
                member_id: alice,
                role: Role::Crew,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn pending_invitee_cannot_become_captain() {
        let t = trip();
        let carol = t.crew[2].id;
        let err = apply(
            t.clone(),
            TripCommand::ChangeCrewRole {
                member_id: carol,
                role: Role::Captain,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(captains(&t)[0].user_id.as_deref(), Some("user_alice"));
    }

    #[test]
    fn remove_crew_member_keeps_captain() {
        let t = trip();
        let (alice, bob) = (t.crew[0].id, t.crew[1].id);

        let t = apply(t, TripCommand::RemoveCrewMember { member_id: bob }).unwrap();
        assert_eq!(t.crew.len(), 2);

        let err = apply(t, TripCommand::RemoveCrewMember { member_id: alice }).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
