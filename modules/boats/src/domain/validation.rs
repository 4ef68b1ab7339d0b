//! Shape checks applied before any command reaches the aggregate or storage.

use std::collections::HashSet;

use url::Url;

use crate::contract::model::{
    Banner, BannerType, CrewInvite, Identity, ModulePayload, NewTrip, Role,
};
use crate::domain::error::DomainError;
use crate::domain::membership::normalize_email;

pub const MAX_OPTION_TEXT_LENGTH: usize = 500;
pub const MAX_ENTRIES_PER_MODULE: usize = 200;
pub const MAX_ENTRY_ID_LENGTH: usize = 64;

pub fn trip_name(name: &str, max: usize) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::EmptyName);
    }
    let len = name.chars().count();
    if len > max {
        return Err(DomainError::name_too_long(len, max));
    }
    Ok(name.to_string())
}

pub fn description(text: &str, max: usize) -> Result<String, DomainError> {
    let text = text.trim();
    if text.chars().count() > max {
        return Err(DomainError::validation(
            "description",
            format!("must be at most {max} characters"),
        ));
    }
    Ok(text.to_string())
}

/// Normalized address, or `InvalidEmail` for anything that is clearly not one.
pub fn email(raw: &str) -> Result<String, DomainError> {
    let email = normalize_email(raw);
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(DomainError::invalid_email(raw.trim()))
    }
}

pub fn banner(banner: &Banner) -> Result<(), DomainError> {
    if matches!(banner.position, Some(p) if p > 100) {
        return Err(DomainError::validation("banner.position", "must be within 0..=100"));
    }
    match banner.kind {
        BannerType::Link => {
            let url = Url::parse(banner.value.trim())
                .map_err(|e| DomainError::validation("banner.value", e.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(DomainError::validation(
                    "banner.value",
                    "link banners must use http or https",
                ));
            }
        }
        BannerType::Color => {
            let hex = banner.value.trim().strip_prefix('#').unwrap_or("");
            if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(DomainError::validation(
                    "banner.value",
                    "color banners must be #rgb or #rrggbb",
                ));
            }
        }
    }
    Ok(())
}

/// Validate a creation request and return its invites with normalized emails.
///
/// Invites with a blank address are dropped. The creator's own address and
/// repeated addresses are rejected, as is inviting anyone as captain.
pub fn new_trip(
    new_trip: &NewTrip,
    creator: &Identity,
    max_name: usize,
    max_description: usize,
) -> Result<(String, String, Vec<CrewInvite>), DomainError> {
    let name = trip_name(&new_trip.name, max_name)?;
    let description = description(&new_trip.description, max_description)?;
    if let Some(b) = &new_trip.banner {
        banner(b)?;
    }

    let creator_email = email(&creator.email)?;
    let mut seen = HashSet::from([creator_email]);
    let mut invites = Vec::with_capacity(new_trip.crew_invites.len());

    for invite in &new_trip.crew_invites {
        if invite.email_address.trim().is_empty() {
            continue;
        }
        let address = email(&invite.email_address)?;
        if invite.role == Role::Captain {
            return Err(DomainError::validation(
                "crewInvites.role",
                "the creator is the only captain",
            ));
        }
        if !seen.insert(address.clone()) {
            return Err(DomainError::duplicate_invite(address));
        }
        invites.push(CrewInvite {
            email_address: address,
            role: invite.role,
        });
    }

    Ok((name, description, invites))
}

pub fn module_name(name: &str, max: usize) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name", "cannot be empty"));
    }
    if name.chars().count() > max {
        return Err(DomainError::validation(
            "name",
            format!("must be at most {max} characters"),
        ));
    }
    Ok(name.to_string())
}

/// Entry-level checks for a module payload.
pub fn payload(data: &ModulePayload) -> Result<(), DomainError> {
    if data.len() > MAX_ENTRIES_PER_MODULE {
        return Err(DomainError::validation(
            "data",
            format!("at most {MAX_ENTRIES_PER_MODULE} entries per module"),
        ));
    }

    let mut ids = HashSet::new();
    for id in data.ids() {
        if id.trim().is_empty() || id.len() > MAX_ENTRY_ID_LENGTH {
            return Err(DomainError::validation(
                "data.id",
                format!("entry ids must be 1..={MAX_ENTRY_ID_LENGTH} characters"),
            ));
        }
        if !ids.insert(id) {
            return Err(DomainError::validation(
                "data.id",
                format!("duplicate entry id '{id}'"),
            ));
        }
    }

    match data {
        ModulePayload::Poll(options) => {
            for o in options {
                text_field("data.text", &o.text)?;
            }
        }
        ModulePayload::DatePoll(options) => {
            for o in options {
                if o.end_date < o.start_date {
                    return Err(DomainError::validation(
                        "data.endDate",
                        format!("option '{}' ends before it starts", o.id),
                    ));
                }
            }
        }
        ModulePayload::Itinerary(items) => {
            for i in items {
                text_field("data.title", &i.title)?;
                if matches!(i.ends_at, Some(end) if end < i.starts_at) {
                    return Err(DomainError::validation(
                        "data.endsAt",
                        format!("item '{}' ends before it starts", i.id),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn text_field(field: &str, value: &str) -> Result<(), DomainError> {
    let len = value.trim().chars().count();
    if len == 0 || len > MAX_OPTION_TEXT_LENGTH {
        return Err(DomainError::validation(
            field,
            format!("must be 1..={MAX_OPTION_TEXT_LENGTH} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{DateOption, PollOption};
    use chrono::{Duration, Utc};

    fn invite(email: &str) -> CrewInvite {
        CrewInvite {
            email_address: email.into(),
            role: Role::Crew,
        }
    }

    fn request(invites: Vec<CrewInvite>) -> NewTrip {
        NewTrip {
            name: "Summer Regatta".into(),
            description: String::new(),
            banner: None,
            crew_invites: invites,
        }
    }

    fn creator() -> Identity {
        Identity::new("user_alice", "alice@x.com")
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(email("  Bob@Example.COM ").unwrap(), "bob@example.com");
        for bad in ["", "bob", "bob@", "@x.com", "bob@x", "b ob@x.com", "bob@.com"] {
            assert!(email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn blank_invites_are_dropped() {
        let (_, _, invites) =
            new_trip(&request(vec![invite(" "), invite("bob@x.com")]), &creator(), 100, 2000)
                .unwrap();
        assert_eq!(invites, vec![invite("bob@x.com")]);
    }

    #[test]
    fn inviting_the_creator_is_a_duplicate() {
        let err = new_trip(&request(vec![invite("ALICE@x.com")]), &creator(), 100, 2000)
            .unwrap_err();
        assert_eq!(err, DomainError::duplicate_invite("alice@x.com"));
    }

    #[test]
    fn repeated_invite_is_a_duplicate() {
        let err = new_trip(
            &request(vec![invite("bob@x.com"), invite("Bob@X.com")]),
            &creator(),
            100,
            2000,
        )
        .unwrap_err();
        assert_eq!(err, DomainError::duplicate_invite("bob@x.com"));
    }

    #[test]
    fn captain_invites_are_rejected() {
        let mut req = request(vec![invite("bob@x.com")]);
        req.crew_invites[0].role = Role::Captain;
        assert!(matches!(
            new_trip(&req, &creator(), 100, 2000),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn name_length_counts_characters() {
        assert_eq!(trip_name(" Ålesund ", 7).unwrap(), "Ålesund");
        assert_eq!(trip_name("Ålesund!", 7), Err(DomainError::name_too_long(8, 7)));
    }

    #[test]
    fn banners_are_checked_by_type() {
        let mut b = Banner {
            kind: BannerType::Color,
            value: "#1a2B3c".into(),
            position: None,
        };
        assert!(banner(&b).is_ok());
        b.value = "red".into();
        assert!(banner(&b).is_err());

        b.kind = BannerType::Link;
        b.value = "ftp://images.example.com/a.png".into();
        assert!(banner(&b).is_err());
        b.value = "https://images.example.com/a.png".into();
        assert!(banner(&b).is_ok());
    }

    #[test]
    fn payload_rejects_duplicate_ids_and_inverted_ranges() {
        let option = |id: &str| PollOption {
            id: id.into(),
            author: "alice@x.com".into(),
            text: "Sail".into(),
            votes: Default::default(),
            selected: false,
        };
        assert!(payload(&ModulePayload::Poll(vec![option("a"), option("b")])).is_ok());
        assert!(payload(&ModulePayload::Poll(vec![option("a"), option("a")])).is_err());

        let now = Utc::now();
        let inverted = DateOption {
            id: "d".into(),
            start_date: now,
            end_date: now - Duration::days(1),
            votes: Default::default(),
        };
        assert!(payload(&ModulePayload::DatePoll(vec![inverted])).is_err());
    }
}
