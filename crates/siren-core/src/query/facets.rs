use crate::model::{Incident, IncidentKind, Status};
use serde::Serialize;
use std::collections::BTreeSet;

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Distinct filterable values present in a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    /// Types, ordered by label.
    pub kinds: Vec<IncidentKind>,
    /// Statuses, ordered by label.
    pub statuses: Vec<Status>,
    pub years: Vec<i32>,
    pub months: Vec<u32>,
}

impl Facets {
    #[must_use]
    pub fn collect(incidents: &[Incident]) -> Self {
        let mut kinds: Vec<IncidentKind> = incidents
            .iter()
            .map(|incident| incident.kind)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        kinds.sort_by_key(|kind| kind.label());

        let mut statuses: Vec<Status> = incidents
            .iter()
            .map(|incident| incident.status)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        statuses.sort_by_key(|status| status.label());

        let years = incidents
            .iter()
            .map(|incident| incident.timestamp.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let months = incidents
            .iter()
            .map(|incident| incident.timestamp.month())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            kinds,
            statuses,
            years,
            months,
        }
    }
}

/// Display name for a calendar month (1-12).
#[must_use]
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(idx).copied()
}
