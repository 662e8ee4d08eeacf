use crate::model::{Incident, IncidentKind, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Multi-select filter criteria over the incident list.
///
/// Each dimension holds the allowed values; an empty set places no
/// restriction on that dimension. Dimensions combine with AND, values within
/// a dimension with OR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    pub kinds: BTreeSet<IncidentKind>,
    pub statuses: BTreeSet<Status>,
    pub years: BTreeSet<i32>,
    pub months: BTreeSet<u32>,
}

impl FilterSet {
    /// Returns true if any dimension restricts the list.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !(self.kinds.is_empty()
            && self.statuses.is_empty()
            && self.years.is_empty()
            && self.months.is_empty())
    }

    /// Returns true if the incident satisfies every non-empty dimension.
    #[must_use]
    pub fn matches(&self, incident: &Incident) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&incident.kind) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&incident.status) {
            return false;
        }
        if !self.years.is_empty() && !self.years.contains(&incident.timestamp.year()) {
            return false;
        }
        if !self.months.is_empty() && !self.months.contains(&incident.timestamp.month()) {
            return false;
        }
        true
    }

    /// Replace the dimensions present in `patch`, keeping the others.
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(kinds) = patch.kinds {
            self.kinds = kinds;
        }
        if let Some(statuses) = patch.statuses {
            self.statuses = statuses;
        }
        if let Some(years) = patch.years {
            self.years = years;
        }
        if let Some(months) = patch.months {
            self.months = months;
        }
    }
}

/// Partial replacement for [`FilterSet`]; `None` leaves a dimension as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub kinds: Option<BTreeSet<IncidentKind>>,
    pub statuses: Option<BTreeSet<Status>>,
    pub years: Option<BTreeSet<i32>>,
    pub months: Option<BTreeSet<u32>>,
}

impl FilterPatch {
    /// A patch that empties every dimension.
    #[must_use]
    pub fn clear_all() -> Self {
        Self {
            kinds: Some(BTreeSet::new()),
            statuses: Some(BTreeSet::new()),
            years: Some(BTreeSet::new()),
            months: Some(BTreeSet::new()),
        }
    }

    #[must_use]
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = IncidentKind>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    #[must_use]
    pub fn statuses(mut self, statuses: impl IntoIterator<Item = Status>) -> Self {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }

    #[must_use]
    pub fn years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = Some(years.into_iter().collect());
        self
    }

    #[must_use]
    pub fn months(mut self, months: impl IntoIterator<Item = u32>) -> Self {
        self.months = Some(months.into_iter().collect());
        self
    }
}

/// Case-insensitive substring match over type, location, status, operator and id.
///
/// An empty term matches everything.
#[must_use]
pub fn matches_search(incident: &Incident, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    [
        incident.kind.label(),
        incident.location.as_str(),
        incident.status.label(),
        incident.operator.as_str(),
        incident.id.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&term))
}

/// Returns true if any filter dimension or the search term is set.
#[must_use]
pub fn has_active_criteria(filters: &FilterSet, search_term: &str) -> bool {
    filters.is_active() || !search_term.is_empty()
}
