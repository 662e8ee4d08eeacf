use super::timestamp::Timestamp;
use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Category of a reported emergency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IncidentKind {
    #[serde(rename = "Incendio")]
    Fire,
    #[serde(rename = "Accidente")]
    Accident,
    #[serde(rename = "Robo")]
    Theft,
    #[serde(rename = "Emergencia Médica")]
    MedicalEmergency,
    #[serde(rename = "Desastre Natural")]
    NaturalDisaster,
    #[serde(rename = "Otro")]
    Other,
}

impl IncidentKind {
    pub const ALL: [Self; 6] = [
        Self::Fire,
        Self::Accident,
        Self::Theft,
        Self::MedicalEmergency,
        Self::NaturalDisaster,
        Self::Other,
    ];

    /// Display label, identical to the persisted literal.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fire => "Incendio",
            Self::Accident => "Accidente",
            Self::Theft => "Robo",
            Self::MedicalEmergency => "Emergencia Médica",
            Self::NaturalDisaster => "Desastre Natural",
            Self::Other => "Otro",
        }
    }

    /// ASCII shorthand accepted on the command line.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Accident => "accident",
            Self::Theft => "theft",
            Self::MedicalEmergency => "medical",
            Self::NaturalDisaster => "disaster",
            Self::Other => "other",
        }
    }
}

/// The three lifecycle states, in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "En progreso")]
    InProgress,
    #[serde(rename = "Resuelto")]
    Resolved,
}

impl Status {
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Resolved];

    /// Display label, identical to the persisted literal.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::InProgress => "En progreso",
            Self::Resolved => "Resuelto",
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
        }
    }

    /// Resolved incidents are closed to further status and resource changes.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// A person involved in an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvolvedParty {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "documento")]
    pub document_id: String,
    #[serde(rename = "contacto")]
    pub contact: String,
}

impl InvolvedParty {
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.document_id.trim().is_empty()
            && self.contact.trim().is_empty()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.document_id.trim().is_empty()
            && !self.contact.trim().is_empty()
    }
}

/// One append-only record in an incident's history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "fecha")]
    pub timestamp: Timestamp,
    #[serde(rename = "accion")]
    pub action: String,
    #[serde(rename = "operador")]
    pub operator: String,
}

/// Approximate map position of an incident.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A tracked emergency.
///
/// Serialized with the field names of the persisted collection
/// (`tipo`, `ubicacion`, `estado`, `fechaHora`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IncidentRecord", into = "IncidentRecord")]
pub struct Incident {
    pub id: String,
    pub kind: IncidentKind,
    pub location: String,
    pub status: Status,
    pub timestamp: Timestamp,
    pub resources: Vec<String>,
    pub operator: String,
    pub description: Option<String>,
    pub involved_parties: Vec<InvolvedParty>,
    pub history: Vec<HistoryEntry>,
    pub coordinates: Option<Coordinates>,
}

/// Fields supplied by the caller when registering an incident.
///
/// The store assigns `id`, `timestamp`, `operator`, `status`, and the first
/// history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentDraft {
    pub kind: IncidentKind,
    pub location: String,
    pub description: Option<String>,
    pub resources: Vec<String>,
    pub involved_parties: Vec<InvolvedParty>,
    pub coordinates: Option<Coordinates>,
}

impl IncidentDraft {
    #[must_use]
    pub fn new(kind: IncidentKind, location: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            description: None,
            resources: Vec::new(),
            involved_parties: Vec::new(),
            coordinates: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_party(mut self, party: InvolvedParty) -> Self {
        self.involved_parties.push(party);
        self
    }

    #[must_use]
    pub const fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

/// Partial update merged into an existing incident.
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentPatch {
    pub kind: Option<IncidentKind>,
    pub location: Option<String>,
    pub status: Option<Status>,
    pub resources: Option<Vec<String>>,
    pub description: Option<String>,
    pub involved_parties: Option<Vec<InvolvedParty>>,
    pub coordinates: Option<Coordinates>,
}

impl IncidentPatch {
    #[must_use]
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn resources<I, S>(resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resources: Some(resources.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether this patch touches a field that is recorded in the history log.
    #[must_use]
    pub const fn is_material(&self) -> bool {
        self.status.is_some() || self.resources.is_some()
    }
}

/// Trim resource names, drop empty ones, and keep the first occurrence of each.
#[must_use]
pub fn dedup_resources<I, S>(resources: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for name in resources {
        let name = name.as_ref().trim();
        if !name.is_empty() && !out.iter().any(|existing| existing == name) {
            out.push(name.to_string());
        }
    }
    out
}

// Wire shape of an incident. Coordinates are flat `lat`/`lng` numbers and the
// optional collections may be absent in older data.
#[derive(Serialize, Deserialize)]
struct IncidentRecord {
    id: String,
    tipo: IncidentKind,
    ubicacion: String,
    estado: Status,
    #[serde(rename = "fechaHora")]
    fecha_hora: Timestamp,
    #[serde(default)]
    recursos: Vec<String>,
    #[serde(default)]
    operador: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    involucrados: Vec<InvolvedParty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    historial: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lng: Option<f64>,
}

impl From<IncidentRecord> for Incident {
    fn from(record: IncidentRecord) -> Self {
        let coordinates = match (record.lat, record.lng) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };
        Self {
            id: record.id,
            kind: record.tipo,
            location: record.ubicacion,
            status: record.estado,
            timestamp: record.fecha_hora,
            resources: record.recursos,
            operator: record.operador,
            description: record.descripcion,
            involved_parties: record.involucrados,
            history: record.historial,
            coordinates,
        }
    }
}

impl From<Incident> for IncidentRecord {
    fn from(incident: Incident) -> Self {
        Self {
            id: incident.id,
            tipo: incident.kind,
            ubicacion: incident.location,
            estado: incident.status,
            fecha_hora: incident.timestamp,
            recursos: incident.resources,
            operador: incident.operator,
            descripcion: incident.description,
            involucrados: incident.involved_parties,
            historial: incident.history,
            lat: incident.coordinates.map(|c| c.latitude),
            lng: incident.coordinates.map(|c| c.longitude),
        }
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl ParseEnumError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidEnumValue
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: invalid {}: '{}'", self.code(), self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub(crate) fn normalize(input: &str) -> String {
    input.trim().to_lowercase().replace('_', "-")
}

impl FromStr for IncidentKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|kind| normalized == kind.slug() || normalized == kind.label().to_lowercase())
            .ok_or_else(|| ParseEnumError {
                expected: "incident type",
                got: s.to_string(),
            })
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|status| {
                normalized == status.slug() || normalized == status.label().to_lowercase()
            })
            .ok_or_else(|| ParseEnumError {
                expected: "status",
                got: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{Incident, IncidentKind, IncidentPatch, Status, dedup_resources};
    use crate::error::ErrorCode;
    use std::str::FromStr;

    #[test]
    fn enum_json_uses_persisted_literals() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"En progreso\""
        );
        assert_eq!(
            serde_json::to_string(&IncidentKind::MedicalEmergency).unwrap(),
            "\"Emergencia Médica\""
        );
        assert_eq!(
            serde_json::from_str::<Status>("\"Resuelto\"").unwrap(),
            Status::Resolved
        );
        assert!(serde_json::from_str::<Status>("\"resolved\"").is_err());
    }

    #[test]
    fn parse_accepts_labels_and_slugs() {
        assert_eq!(Status::from_str("En Progreso").unwrap(), Status::InProgress);
        assert_eq!(Status::from_str("in_progress").unwrap(), Status::InProgress);
        assert_eq!(
            IncidentKind::from_str("emergencia médica").unwrap(),
            IncidentKind::MedicalEmergency
        );
        assert_eq!(IncidentKind::from_str(" FIRE ").unwrap(), IncidentKind::Fire);
        assert!(IncidentKind::from_str("flood").is_err());
        assert!(Status::from_str("closed").is_err());
    }

    #[test]
    fn parse_error_carries_enum_code() {
        let err = Status::from_str("closed").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidEnumValue);
        assert_eq!(err.to_string(), "E2005: invalid status: 'closed'");
    }

    #[test]
    fn display_parse_roundtrips() {
        for kind in IncidentKind::ALL {
            assert_eq!(IncidentKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        for status in Status::ALL {
            assert_eq!(Status::from_str(&status.to_string()).unwrap(), status);
        }
    }

    #[test]
    fn incident_reads_original_field_names() {
        let json = r#"{
            "id": "002",
            "tipo": "Accidente",
            "ubicacion": "Carrera 7 con Calle 26",
            "estado": "En progreso",
            "fechaHora": "2024-01-15T09:15:00",
            "recursos": ["Ambulancia", "Policía"],
            "operador": "María García",
            "lat": 4.6118,
            "lng": -74.0723
        }"#;
        let incident: Incident = serde_json::from_str(json).unwrap();
        assert_eq!(incident.kind, IncidentKind::Accident);
        assert_eq!(incident.status, Status::InProgress);
        assert_eq!(incident.resources, vec!["Ambulancia", "Policía"]);
        assert!(incident.history.is_empty());
        let coords = incident.coordinates.unwrap();
        assert!((coords.latitude - 4.6118).abs() < f64::EPSILON);

        let value = serde_json::to_value(&incident).unwrap();
        assert_eq!(value["estado"], "En progreso");
        assert_eq!(value["fechaHora"], "2024-01-15T09:15:00");
        assert!(value.get("descripcion").is_none());
        assert!(value.get("historial").is_none());
    }

    #[test]
    fn half_coordinates_are_dropped() {
        let json = r#"{"id":"9","tipo":"Otro","ubicacion":"x","estado":"Pendiente",
            "fechaHora":"2024-01-15T09:15:00","recursos":[],"operador":"a","lat":4.6}"#;
        let incident: Incident = serde_json::from_str(json).unwrap();
        assert!(incident.coordinates.is_none());
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let out = dedup_resources(["Policía", " Bomberos ", "Policía", "", "Ambulancia"]);
        assert_eq!(out, vec!["Policía", "Bomberos", "Ambulancia"]);
    }

    #[test]
    fn patch_materiality() {
        assert!(!IncidentPatch::default().with_location("x").is_material());
        assert!(IncidentPatch::status(Status::Resolved).is_material());
        assert!(IncidentPatch::resources(["Bomberos"]).is_material());
    }
}
