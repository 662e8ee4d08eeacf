//! Domain types: incidents, their lifecycle, and the signed-in session.

pub mod incident;
pub mod session;
pub mod timestamp;

pub use incident::{
    Coordinates, HistoryEntry, Incident, IncidentDraft, IncidentKind, IncidentPatch,
    InvolvedParty, ParseEnumError, Status, dedup_resources,
};
pub use session::{User, View};
pub use timestamp::{TextShape, Timestamp, TimestampError};
