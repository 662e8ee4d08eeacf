//! Operator actions with the dashboard's guard rails.
//!
//! The [`Store`] accepts any patch. The functions here are what the detail
//! view and the registration form call: they refuse to touch resolved
//! incidents, map resource selections to canonical names, and validate
//! drafts before anything is written.

use crate::error::ErrorCode;
use crate::model::{Incident, IncidentDraft, IncidentPatch, Status, View};
use crate::store::Store;
use std::fmt;
use tracing::info;

/// A dispatchable resource offered by the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub id: &'static str,
    pub name: &'static str,
    pub available: bool,
}

pub const KNOWN_RESOURCES: [Resource; 3] = [
    Resource {
        id: "policia",
        name: "Policía",
        available: true,
    },
    Resource {
        id: "bomberos",
        name: "Bomberos",
        available: true,
    },
    Resource {
        id: "ambulancia",
        name: "Ambulancia",
        available: false,
    },
];

/// Look up a known resource by id or display name, ignoring case.
#[must_use]
pub fn find_resource(input: &str) -> Option<&'static Resource> {
    let needle = input.trim().to_lowercase();
    KNOWN_RESOURCES
        .iter()
        .find(|r| r.id == needle || r.name.to_lowercase() == needle)
}

/// One failed form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// `ubicacion`, `descripcion`, `terminos`, or `involucrado-<n>-<campo>`.
    pub field: String,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("{}: incident '{0}' not found", ErrorCode::IncidentNotFound.code())]
    NotFound(String),

    #[error(
        "{}: incident '{id}' is {status} and cannot be changed",
        ErrorCode::InvalidStateTransition.code()
    )]
    InvalidTransition { id: String, status: Status },

    #[error("{}: resource '{0}' is not available", ErrorCode::InvalidStateTransition.code())]
    ResourceUnavailable(String),

    #[error("{}: {}", ErrorCode::InvalidDraft.code(), join_fields(.0))]
    InvalidDraft(Vec<FieldError>),
}

impl ActionError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::IncidentNotFound,
            Self::InvalidTransition { .. } | Self::ResourceUnavailable(_) => {
                ErrorCode::InvalidStateTransition
            }
            Self::InvalidDraft(_) => ErrorCode::InvalidDraft,
        }
    }
}

fn open_incident<'a>(store: &'a Store, id: &str) -> Result<&'a Incident, ActionError> {
    let incident = store
        .incident(id)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
    if incident.status.is_terminal() {
        return Err(ActionError::InvalidTransition {
            id: id.to_string(),
            status: incident.status,
        });
    }
    Ok(incident)
}

/// Set the status of an open incident.
pub fn change_status(store: &mut Store, id: &str, status: Status) -> Result<Incident, ActionError> {
    open_incident(store, id)?;
    let updated = store
        .update_incident(id, IncidentPatch::status(status))
        .cloned()
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
    info!(id, status = %status, "status changed");
    Ok(updated)
}

/// Replace the resources of an open incident.
///
/// Inputs may be resource ids or names; unknown names pass through as-is.
/// An unavailable resource may stay on an incident that already holds it
/// but cannot be newly assigned.
///
/// A non-empty selection moves the incident to in progress. The status is
/// always part of the update, so the history records a status change.
pub fn assign_resources<I, S>(store: &mut Store, id: &str, resources: I) -> Result<Incident, ActionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let incident = open_incident(store, id)?;
    let current = incident.status;
    let held = incident.resources.clone();

    let mut names = Vec::new();
    for input in resources {
        let input = input.as_ref();
        match find_resource(input) {
            Some(resource) if !resource.available && !held.iter().any(|h| h == resource.name) => {
                return Err(ActionError::ResourceUnavailable(resource.name.to_string()));
            }
            Some(resource) => names.push(resource.name.to_string()),
            None => names.push(input.to_string()),
        }
    }

    let status = if names.iter().any(|n| !n.trim().is_empty()) {
        Status::InProgress
    } else {
        current
    };
    let patch = IncidentPatch::resources(names).with_status(status);
    let updated = store
        .update_incident(id, patch)
        .cloned()
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
    info!(id, resources = ?updated.resources, "resources assigned");
    Ok(updated)
}

/// Check a draft the way the registration form does.
///
/// Fully blank parties are dropped; partially filled ones are errors.
pub fn validate_draft(draft: &IncidentDraft, terms_accepted: bool) -> Result<IncidentDraft, ActionError> {
    let mut errors = Vec::new();
    let mut push = |field: String, message: &'static str| errors.push(FieldError { field, message });

    if draft.location.trim().is_empty() {
        push("ubicacion".into(), "La ubicación es requerida");
    }
    if draft.description.as_deref().is_none_or(|d| d.trim().is_empty()) {
        push("descripcion".into(), "La descripción es requerida");
    }
    if !terms_accepted {
        push("terminos".into(), "Debe aceptar el tratamiento de datos personales");
    }
    for (idx, party) in draft.involved_parties.iter().enumerate() {
        if party.is_blank() {
            continue;
        }
        if party.name.trim().is_empty() {
            push(format!("involucrado-{idx}-nombre"), "Nombre requerido");
        }
        if party.document_id.trim().is_empty() {
            push(format!("involucrado-{idx}-documento"), "Documento requerido");
        }
        if party.contact.trim().is_empty() {
            push(format!("involucrado-{idx}-contacto"), "Contacto requerido");
        }
    }

    if !errors.is_empty() {
        return Err(ActionError::InvalidDraft(errors));
    }

    let mut clean = draft.clone();
    clean.involved_parties.retain(|party| !party.is_blank());
    Ok(clean)
}

/// Validate and register a new incident, then return to the dashboard.
pub fn register(
    store: &mut Store,
    draft: &IncidentDraft,
    terms_accepted: bool,
) -> Result<Incident, ActionError> {
    let clean = validate_draft(draft, terms_accepted)?;
    let created = store.add_incident(clean).clone();
    store.set_current_view(View::Dashboard);
    Ok(created)
}
