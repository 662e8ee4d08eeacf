//! Query pipeline: derive the displayed listing from the raw incident list.
//!
//! The pipeline is a pure function of its inputs:
//!
//! 1. **Filter**: [`FilterSet`] dimensions (AND across, OR within).
//! 2. **Search**: case-insensitive substring over type, location, status,
//!    operator and id.
//! 3. **Sort**: multi-key stable sort by [`SortSpec`].
//!
//! It never fails. An empty result is reported as [`Listing::NoMatches`] so
//! callers render an explicit "no matches" state.

pub mod facets;
pub mod filter;
pub mod sort;

pub use facets::{Facets, month_name};
pub use filter::{FilterPatch, FilterSet, has_active_criteria, matches_search};
pub use sort::{SortDirection, SortField, SortKey, SortSpec, numeric_id};

use crate::model::Incident;

/// Result of running the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<'a> {
    /// At least one incident, in display order.
    Rows(Vec<&'a Incident>),
    /// Nothing survived filtering and search.
    NoMatches,
}

impl<'a> Listing<'a> {
    #[must_use]
    pub fn rows(&self) -> &[&'a Incident] {
        match self {
            Self::Rows(rows) => rows,
            Self::NoMatches => &[],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::NoMatches)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&'a str> {
        self.rows().iter().map(|incident| incident.id.as_str()).collect()
    }
}

/// Filter and search stages only, preserving input order.
#[must_use]
pub fn select<'a>(
    incidents: &'a [Incident],
    filters: &FilterSet,
    search_term: &str,
) -> Vec<&'a Incident> {
    incidents
        .iter()
        .filter(|incident| filters.matches(incident))
        .filter(|incident| matches_search(incident, search_term))
        .collect()
}

/// Run the full pipeline.
#[must_use]
pub fn run<'a>(
    incidents: &'a [Incident],
    filters: &FilterSet,
    search_term: &str,
    sort: &SortSpec,
) -> Listing<'a> {
    let mut rows = select(incidents, filters, search_term);
    if rows.is_empty() {
        return Listing::NoMatches;
    }
    sort.sort(&mut rows);
    Listing::Rows(rows)
}
