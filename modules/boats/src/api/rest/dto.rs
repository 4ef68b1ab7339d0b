use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{
    Banner, BannerType, CreatedTrip, CrewInvite, CrewMember, DateOption, Identity,
    InvitationOutcome, InvitationReport, ItineraryItem, Module, ModuleKind, ModuleMode,
    ModulePayload, ModuleSettings, NewModule, NewTrip, PollOption, Role, Trip,
};
use crate::domain::membership;
use crate::errors::ErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoleDto {
    Captain,
    Crew,
}

impl From<Role> for RoleDto {
    fn from(r: Role) -> Self {
        match r {
            Role::Captain => Self::Captain,
            Role::Crew => Self::Crew,
        }
    }
}

impl From<RoleDto> for Role {
    fn from(r: RoleDto) -> Self {
        match r {
            RoleDto::Captain => Self::Captain,
            RoleDto::Crew => Self::Crew,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BannerTypeDto {
    Link,
    Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BannerDto {
    #[serde(rename = "type")]
    pub kind: BannerTypeDto,
    pub value: String,
    /// Vertical focus for link banners, 0..=100.
    #[serde(default)]
    pub position: Option<u8>,
}

impl From<Banner> for BannerDto {
    fn from(b: Banner) -> Self {
        Self {
            kind: match b.kind {
                BannerType::Link => BannerTypeDto::Link,
                BannerType::Color => BannerTypeDto::Color,
            },
            value: b.value,
            position: b.position,
        }
    }
}

impl From<BannerDto> for Banner {
    fn from(b: BannerDto) -> Self {
        Self {
            kind: match b.kind {
                BannerTypeDto::Link => BannerType::Link,
                BannerTypeDto::Color => BannerType::Color,
            },
            value: b.value,
            position: b.position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKindDto {
    Poll,
    DatePoll,
    Itinerary,
}

impl From<ModuleKind> for ModuleKindDto {
    fn from(k: ModuleKind) -> Self {
        match k {
            ModuleKind::Poll => Self::Poll,
            ModuleKind::DatePoll => Self::DatePoll,
            ModuleKind::Itinerary => Self::Itinerary,
        }
    }
}

impl From<ModuleKindDto> for ModuleKind {
    fn from(k: ModuleKindDto) -> Self {
        match k {
            ModuleKindDto::Poll => Self::Poll,
            ModuleKindDto::DatePoll => Self::DatePoll,
            ModuleKindDto::Itinerary => Self::Itinerary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModuleModeDto {
    View,
    Edit,
}

impl From<ModuleMode> for ModuleModeDto {
    fn from(m: ModuleMode) -> Self {
        match m {
            ModuleMode::View => Self::View,
            ModuleMode::Edit => Self::Edit,
        }
    }
}

impl From<ModuleModeDto> for ModuleMode {
    fn from(m: ModuleModeDto) -> Self {
        match m {
            ModuleModeDto::View => Self::View,
            ModuleModeDto::Edit => Self::Edit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSettingsDto {
    pub allow_multiple: bool,
    pub anonymous_voting: bool,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

impl From<ModuleSettings> for ModuleSettingsDto {
    fn from(s: ModuleSettings) -> Self {
        Self {
            allow_multiple: s.allow_multiple,
            anonymous_voting: s.anonymous_voting,
            deadline: s.deadline,
        }
    }
}

impl From<ModuleSettingsDto> for ModuleSettings {
    fn from(s: ModuleSettingsDto) -> Self {
        Self {
            allow_multiple: s.allow_multiple,
            anonymous_voting: s.anonymous_voting,
            deadline: s.deadline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionDto {
    pub id: String,
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub votes: Vec<String>,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateOptionDto {
    pub id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub votes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryItemDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

/// Module entries tagged by module type; unknown types are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum ModuleDataDto {
    Poll(Vec<PollOptionDto>),
    DatePoll(Vec<DateOptionDto>),
    Itinerary(Vec<ItineraryItemDto>),
}

impl From<ModulePayload> for ModuleDataDto {
    fn from(p: ModulePayload) -> Self {
        match p {
            ModulePayload::Poll(items) => Self::Poll(
                items
                    .into_iter()
                    .map(|o| PollOptionDto {
                        id: o.id,
                        author: o.author,
                        text: o.text,
                        votes: o.votes.into_iter().collect(),
                        selected: o.selected,
                    })
                    .collect(),
            ),
            ModulePayload::DatePoll(items) => Self::DatePoll(
                items
                    .into_iter()
                    .map(|o| DateOptionDto {
                        id: o.id,
                        start_date: o.start_date,
                        end_date: o.end_date,
                        votes: o.votes.into_iter().collect(),
                    })
                    .collect(),
            ),
            ModulePayload::Itinerary(items) => Self::Itinerary(
                items
                    .into_iter()
                    .map(|i| ItineraryItemDto {
                        id: i.id,
                        title: i.title,
                        location: i.location,
                        starts_at: i.starts_at,
                        ends_at: i.ends_at,
                        notes: i.notes,
                    })
                    .collect(),
            ),
        }
    }
}

impl From<ModuleDataDto> for ModulePayload {
    fn from(d: ModuleDataDto) -> Self {
        match d {
            ModuleDataDto::Poll(items) => Self::Poll(
                items
                    .into_iter()
                    .map(|o| PollOption {
                        id: o.id,
                        author: o.author,
                        text: o.text,
                        votes: o.votes.into_iter().collect(),
                        selected: o.selected,
                    })
                    .collect(),
            ),
            ModuleDataDto::DatePoll(items) => Self::DatePoll(
                items
                    .into_iter()
                    .map(|o| DateOption {
                        id: o.id,
                        start_date: o.start_date,
                        end_date: o.end_date,
                        votes: o.votes.into_iter().collect(),
                    })
                    .collect(),
            ),
            ModuleDataDto::Itinerary(items) => Self::Itinerary(
                items
                    .into_iter()
                    .map(|i| ItineraryItem {
                        id: i.id,
                        title: i.title,
                        location: i.location,
                        starts_at: i.starts_at,
                        ends_at: i.ends_at,
                        notes: i.notes,
                    })
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDto {
    pub id: Uuid,
    pub boat_id: Uuid,
    #[serde(rename = "type")]
    pub kind: ModuleKindDto,
    pub name: String,
    pub description: String,
    pub order: i32,
    pub settings: ModuleSettingsDto,
    pub data: ModuleDataDto,
    pub mode: ModuleModeDto,
}

impl From<Module> for ModuleDto {
    fn from(m: Module) -> Self {
        Self {
            id: m.id,
            boat_id: m.boat_id,
            kind: m.kind.into(),
            name: m.name,
            description: m.description,
            order: m.order,
            settings: m.settings.into(),
            data: m.data.into(),
            mode: m.mode.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrewMemberDto {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub email: String,
    pub role: RoleDto,
    /// True until the invitee signs up.
    pub pending: bool,
}

impl From<CrewMember> for CrewMemberDto {
    fn from(m: CrewMember) -> Self {
        Self {
            pending: m.is_pending(),
            id: m.id,
            user_id: m.user_id,
            email: m.email,
            role: m.role.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub banner: BannerDto,
    pub captain_user_id: String,
    /// Role of the caller on this trip.
    pub role: Option<RoleDto>,
    pub crew: Vec<CrewMemberDto>,
    /// Modules sorted by `order`.
    pub modules: Vec<ModuleDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TripDto {
    pub fn for_caller(trip: Trip, identity: &Identity) -> Self {
        let role = membership::member_of(&trip, identity).map(|m| m.role.into());
        let modules = trip
            .ordered_modules()
            .into_iter()
            .cloned()
            .map(ModuleDto::from)
            .collect();
        Self {
            id: trip.id,
            name: trip.name,
            description: trip.description,
            banner: trip.banner.into(),
            captain_user_id: trip.captain_user_id,
            role,
            crew: trip.crew.into_iter().map(CrewMemberDto::from).collect(),
            modules,
            created_at: trip.created_at,
            updated_at: trip.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripListDto {
    pub trips: Vec<TripDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationReportDto {
    pub sent: Vec<String>,
    pub skipped_existing: Vec<String>,
    pub failed: Vec<String>,
}

impl From<InvitationReport> for InvitationReportDto {
    fn from(r: InvitationReport) -> Self {
        Self {
            sent: r.sent,
            skipped_existing: r.skipped_existing,
            failed: r.failed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTripDto {
    pub trip: TripDto,
    pub invitations: InvitationReportDto,
    /// Set when the identity lookup failed; invitations can be re-sent later.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_error: Option<InvitationErrorDto>,
}

/// Stable code plus a fixed message; the upstream cause only reaches the logs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvitationErrorDto {
    pub code: String,
    pub detail: String,
}

impl InvitationErrorDto {
    fn lookup_failed() -> Self {
        Self {
            code: ErrorCode::boats_identity_upstream_v1.def().code.to_string(),
            detail: "Invitations could not be sent; retry from the trip".to_string(),
        }
    }
}

impl CreatedTripDto {
    pub fn for_caller(created: CreatedTrip, identity: &Identity) -> Self {
        let (invitations, invitation_error) = match created.invitations {
            InvitationOutcome::Dispatched(report) => (report.into(), None),
            InvitationOutcome::Failed => (
                InvitationReportDto::default(),
                Some(InvitationErrorDto::lookup_failed()),
            ),
        };
        Self {
            trip: TripDto::for_caller(created.trip, identity),
            invitations,
            invitation_error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrewInviteReq {
    pub email_address: String,
    #[serde(default = "default_invite_role")]
    pub role: RoleDto,
}

fn default_invite_role() -> RoleDto {
    RoleDto::Crew
}

/// Request to create a trip
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTripReq {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub banner: Option<BannerDto>,
    #[serde(default)]
    pub crew_invites: Vec<CrewInviteReq>,
}

impl From<CreateTripReq> for NewTrip {
    fn from(req: CreateTripReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            banner: req.banner.map(Into::into),
            crew_invites: req
                .crew_invites
                .into_iter()
                .map(|i| CrewInvite {
                    email_address: i.email_address,
                    role: i.role.into(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameTripReq {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDescriptionReq {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddModuleReq {
    #[serde(rename = "type")]
    pub kind: ModuleKindDto,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: Option<ModuleSettingsDto>,
}

impl From<AddModuleReq> for NewModule {
    fn from(req: AddModuleReq) -> Self {
        Self {
            kind: req.kind.into(),
            name: req.name,
            description: req.description,
            settings: req.settings.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetModeReq {
    pub mode: ModuleModeDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveModuleDataReq {
    pub data: ModuleDataDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptionReq {
    pub option_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleReq {
    pub role: RoleDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationsDto {
    pub linked: u64,
}
