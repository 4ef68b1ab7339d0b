use anyhow::Context;
use sea_orm::Set;

use crate::contract::model::{Banner, CrewMember, Module, ModulePayload, ModuleSettings, Trip};
use crate::infra::storage::entity::{boat_module, crew_member, trip};

pub fn trip_to_active(t: &Trip) -> trip::ActiveModel {
    trip::ActiveModel {
        id: Set(t.id),
        name: Set(t.name.clone()),
        description: Set(t.description.clone()),
        banner_type: Set(t.banner.kind.as_str().to_string()),
        banner_value: Set(t.banner.value.clone()),
        banner_position: Set(t.banner.position.map(i16::from)),
        captain_user_id: Set(t.captain_user_id.clone()),
        created_at: Set(t.created_at),
        updated_at: Set(t.updated_at),
    }
}

pub fn crew_to_active(m: &CrewMember, t: &Trip) -> crew_member::ActiveModel {
    crew_member::ActiveModel {
        id: Set(m.id),
        boat_id: Set(m.boat_id),
        user_id: Set(m.user_id.clone()),
        email: Set(m.email.clone()),
        role: Set(m.role.as_str().to_string()),
        created_at: Set(t.created_at),
    }
}

pub fn encode_settings(settings: &ModuleSettings) -> anyhow::Result<String> {
    serde_json::to_string(settings).context("encode module settings")
}

pub fn encode_data(data: &ModulePayload) -> anyhow::Result<String> {
    serde_json::to_string(data).context("encode module data")
}

pub fn module_to_active(m: &Module) -> anyhow::Result<boat_module::ActiveModel> {
    Ok(boat_module::ActiveModel {
        id: Set(m.id),
        boat_id: Set(m.boat_id),
        kind: Set(m.kind.as_str().to_string()),
        name: Set(m.name.clone()),
        description: Set(m.description.clone()),
        sort_order: Set(m.order),
        settings: Set(encode_settings(&m.settings)?),
        data: Set(encode_data(&m.data)?),
        mode: Set(m.mode.as_str().to_string()),
    })
}

pub fn crew_from_entity(e: crew_member::Model) -> anyhow::Result<CrewMember> {
    Ok(CrewMember {
        id: e.id,
        boat_id: e.boat_id,
        user_id: e.user_id,
        email: e.email,
        role: e.role.parse()?,
    })
}

pub fn module_from_entity(e: boat_module::Model) -> anyhow::Result<Module> {
    Ok(Module {
        id: e.id,
        boat_id: e.boat_id,
        kind: e.kind.parse()?,
        name: e.name,
        description: e.description,
        order: e.sort_order,
        settings: serde_json::from_str(&e.settings)
            .with_context(|| format!("decode settings of module {}", e.id))?,
        data: serde_json::from_str(&e.data)
            .with_context(|| format!("decode data of module {}", e.id))?,
        mode: e.mode.parse()?,
    })
}

/// Assemble a trip from its row plus the rows it owns.
pub fn trip_from_entities(
    e: trip::Model,
    crew: Vec<crew_member::Model>,
    modules: Vec<boat_module::Model>,
) -> anyhow::Result<Trip> {
    let banner_position = e
        .banner_position
        .map(u8::try_from)
        .transpose()
        .with_context(|| format!("banner position of trip {}", e.id))?;

    Ok(Trip {
        id: e.id,
        name: e.name,
        description: e.description,
        banner: Banner {
            kind: e.banner_type.parse()?,
            value: e.banner_value,
            position: banner_position,
        },
        captain_user_id: e.captain_user_id,
        crew: crew
            .into_iter()
            .map(crew_from_entity)
            .collect::<anyhow::Result<_>>()?,
        modules: modules
            .into_iter()
            .map(|m| module_from_entity(m).map(|m| (m.id, m)))
            .collect::<anyhow::Result<_>>()?,
        created_at: e.created_at,
        updated_at: e.updated_at,
    })
}
