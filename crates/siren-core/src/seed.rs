//! Built-in incident set used when storage holds no collection yet.

use crate::model::{Coordinates, Incident, IncidentKind, Status, Timestamp};
use chrono::NaiveDate;

struct SeedRow {
    id: &'static str,
    kind: IncidentKind,
    location: &'static str,
    status: Status,
    // (year, month, day, hour, minute)
    at: (i32, u32, u32, u32, u32),
    resources: &'static [&'static str],
    operator: &'static str,
    description: &'static str,
    lat: f64,
    lng: f64,
}

const SEED: [SeedRow; 5] = [
    SeedRow {
        id: "001",
        kind: IncidentKind::Fire,
        location: "Calle 123 #45-67",
        status: Status::Pending,
        at: (2024, 1, 15, 10, 30),
        resources: &[],
        operator: "Juan Pérez",
        description: "Incendio en edificio residencial",
        lat: 4.6097,
        lng: -74.0817,
    },
    SeedRow {
        id: "002",
        kind: IncidentKind::Accident,
        location: "Carrera 7 con Calle 26",
        status: Status::InProgress,
        at: (2024, 1, 15, 9, 15),
        resources: &["Ambulancia", "Policía"],
        operator: "María García",
        description: "Accidente de tránsito con heridos",
        lat: 4.6118,
        lng: -74.0723,
    },
    SeedRow {
        id: "003",
        kind: IncidentKind::Theft,
        location: "Centro Comercial Plaza",
        status: Status::Resolved,
        at: (2024, 1, 14, 16, 45),
        resources: &["Policía"],
        operator: "Carlos López",
        description: "Robo a mano armada en local comercial",
        lat: 4.6351,
        lng: -74.0703,
    },
    SeedRow {
        id: "004",
        kind: IncidentKind::MedicalEmergency,
        location: "Parque Nacional",
        status: Status::Pending,
        at: (2024, 1, 15, 11, 20),
        resources: &[],
        operator: "Ana Rodríguez",
        description: "Persona inconsciente en el parque",
        lat: 4.6126,
        lng: -74.0705,
    },
    SeedRow {
        id: "005",
        kind: IncidentKind::NaturalDisaster,
        location: "Barrio La Candelaria",
        status: Status::InProgress,
        at: (2024, 1, 15, 8, 0),
        resources: &["Bomberos", "Ambulancia"],
        operator: "Luis Martínez",
        description: "Deslizamiento de tierra",
        lat: 4.5981,
        lng: -74.0758,
    },
];

fn floating(at: (i32, u32, u32, u32, u32)) -> Option<Timestamp> {
    let (year, month, day, hour, minute) = at;
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, 0)
        .map(Timestamp::floating)
}

/// The five demonstration incidents a fresh installation starts with.
#[must_use]
pub fn seed_incidents() -> Vec<Incident> {
    SEED.iter()
        .filter_map(|row| {
            Some(Incident {
                id: row.id.to_string(),
                kind: row.kind,
                location: row.location.to_string(),
                status: row.status,
                timestamp: floating(row.at)?,
                resources: row.resources.iter().map(|r| (*r).to_string()).collect(),
                operator: row.operator.to_string(),
                description: Some(row.description.to_string()),
                involved_parties: Vec::new(),
                history: Vec::new(),
                coordinates: Some(Coordinates {
                    latitude: row.lat,
                    longitude: row.lng,
                }),
            })
        })
        .collect()
}
