use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TripId = Uuid;
pub type ModuleId = Uuid;
pub type CrewMemberId = Uuid;

/// Authenticated caller as vouched for by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub first_name: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            first_name: None,
        }
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }
}

/// Error returned when a stored or submitted tag is not one of the known variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Captain,
    Crew,
}

string_enum!(Role, "role", { Captain => "captain", Crew => "crew" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerType {
    Link,
    Color,
}

string_enum!(BannerType, "banner type", { Link => "link", Color => "color" });

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerType,
    pub value: String,
    /// Vertical focus of a link banner, 0..=100.
    pub position: Option<u8>,
}

impl Default for Banner {
    fn default() -> Self {
        Self {
            kind: BannerType::Link,
            value: "https://images.pexels.com/photos/1796730/pexels-photo-1796730.jpeg?auto=compress&cs=tinysrgb&fit=crop&h=627&w=1200".to_string(),
            position: Some(40),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewMember {
    pub id: CrewMemberId,
    pub boat_id: TripId,
    /// `None` until the invited person signs up and claims the invitation.
    pub user_id: Option<String>,
    pub email: String,
    pub role: Role,
}

impl CrewMember {
    pub fn is_pending(&self) -> bool {
        self.user_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: TripId,
    pub name: String,
    pub description: String,
    pub banner: Banner,
    pub captain_user_id: String,
    pub crew: Vec<CrewMember>,
    pub modules: BTreeMap<ModuleId, Module>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(&id)
    }

    pub fn crew_member(&self, id: CrewMemberId) -> Option<&CrewMember> {
        self.crew.iter().find(|m| m.id == id)
    }

    /// Modules in display order.
    pub fn ordered_modules(&self) -> Vec<&Module> {
        let mut modules: Vec<&Module> = self.modules.values().collect();
        modules.sort_by_key(|m| m.order);
        modules
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Poll,
    DatePoll,
    Itinerary,
}

string_enum!(ModuleKind, "module type", {
    Poll => "poll",
    DatePoll => "date_poll",
    Itinerary => "itinerary",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleMode {
    View,
    Edit,
}

string_enum!(ModuleMode, "module mode", { View => "view", Edit => "edit" });

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSettings {
    pub allow_multiple: bool,
    pub anonymous_voting: bool,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            allow_multiple: true,
            anonymous_voting: true,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: String,
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub votes: BTreeSet<String>,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOption {
    pub id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub votes: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryItem {
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

/// Entries of a module; the variant always matches the module's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum ModulePayload {
    Poll(Vec<PollOption>),
    DatePoll(Vec<DateOption>),
    Itinerary(Vec<ItineraryItem>),
}

impl ModulePayload {
    pub fn empty(kind: ModuleKind) -> Self {
        match kind {
            ModuleKind::Poll => Self::Poll(Vec::new()),
            ModuleKind::DatePoll => Self::DatePoll(Vec::new()),
            ModuleKind::Itinerary => Self::Itinerary(Vec::new()),
        }
    }

    pub fn kind(&self) -> ModuleKind {
        match self {
            Self::Poll(_) => ModuleKind::Poll,
            Self::DatePoll(_) => ModuleKind::DatePoll,
            Self::Itinerary(_) => ModuleKind::Itinerary,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Poll(items) => items.len(),
            Self::DatePoll(items) => items.len(),
            Self::Itinerary(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry ids in payload order.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::Poll(items) => items.iter().map(|i| i.id.as_str()).collect(),
            Self::DatePoll(items) => items.iter().map(|i| i.id.as_str()).collect(),
            Self::Itinerary(items) => items.iter().map(|i| i.id.as_str()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: ModuleId,
    pub boat_id: TripId,
    pub kind: ModuleKind,
    pub name: String,
    pub description: String,
    /// 1-based sort key, unique within the trip; gaps are allowed after removals.
    pub order: i32,
    pub settings: ModuleSettings,
    pub data: ModulePayload,
    pub mode: ModuleMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewInvite {
    pub email_address: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrip {
    pub name: String,
    pub description: String,
    pub banner: Option<Banner>,
    pub crew_invites: Vec<CrewInvite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewModule {
    pub kind: ModuleKind,
    pub name: Option<String>,
    pub description: Option<String>,
    pub settings: Option<ModuleSettings>,
}

impl NewModule {
    pub fn of_kind(kind: ModuleKind) -> Self {
        Self {
            kind,
            name: None,
            description: None,
            settings: None,
        }
    }
}

/// Per-address result of one invitation fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvitationReport {
    /// Invitations accepted by the identity provider.
    pub sent: Vec<String>,
    /// Addresses that already belong to an account; no invitation sent.
    pub skipped_existing: Vec<String>,
    /// Addresses whose invitation could not be created.
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationOutcome {
    Dispatched(InvitationReport),
    /// The account lookup failed; nothing was sent and the caller may retry.
    /// The cause is logged, not carried.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedTrip {
    pub trip: Trip,
    pub invitations: InvitationOutcome,
}
