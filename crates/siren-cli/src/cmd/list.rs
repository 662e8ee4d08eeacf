//! `siren list`: the dashboard table: filter, search, and sort incidents.

use crate::output::{OutputMode, pretty_rule, render_mode, when};
use clap::Args;
use siren_core::Store;
use siren_core::model::{Incident, IncidentKind, Status};
use siren_core::query::{FilterPatch, Listing, SortKey, SortSpec};
use std::io::{self, Write};

pub const NO_MATCHES: &str = "No se encontraron incidentes que coincidan con los filtros aplicados.";

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Keep only these types (repeatable or comma-separated).
    #[arg(long = "type", value_delimiter = ',')]
    pub kinds: Vec<IncidentKind>,

    /// Keep only these statuses (repeatable or comma-separated).
    #[arg(long = "status", value_delimiter = ',')]
    pub statuses: Vec<Status>,

    /// Keep only incidents from these years.
    #[arg(long = "year", value_delimiter = ',')]
    pub years: Vec<i32>,

    /// Keep only incidents from these months (1-12).
    #[arg(long = "month", value_delimiter = ',', value_parser = clap::value_parser!(u32).range(1..=12))]
    pub months: Vec<u32>,

    /// Case-insensitive text matched against type, location, status, operator and id.
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort key as `field[:asc|desc]`; repeat for tie-breakers.
    #[arg(long = "sort")]
    pub sort: Vec<SortKey>,
}

impl ListArgs {
    fn filter_patch(&self) -> FilterPatch {
        FilterPatch::default()
            .kinds(self.kinds.iter().copied())
            .statuses(self.statuses.iter().copied())
            .years(self.years.iter().copied())
            .months(self.months.iter().copied())
    }
}

/// Apply the list criteria to the store's query state.
pub fn apply(store: &mut Store, args: &ListArgs) {
    store.set_filters(args.filter_patch());
    store.set_search_term(args.search.clone().unwrap_or_default());
    store.set_sort_spec(SortSpec::new(args.sort.clone()));
}

pub fn run_list(args: &ListArgs, store: &mut Store, output: OutputMode) -> anyhow::Result<()> {
    apply(store, args);
    let listing = store.listing();
    let sort = store.state().sort_spec.describe();

    let rows: Vec<&Incident> = listing.rows().to_vec();
    render_mode(
        output,
        &rows,
        |rows, w| render_list_text(rows, w),
        |rows, w| render_list_pretty(rows, &listing, &sort, w),
    )
}

fn render_list_text(rows: &[&Incident], w: &mut dyn Write) -> io::Result<()> {
    for incident in rows {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            incident.id,
            incident.kind,
            incident.status,
            incident.timestamp,
            incident.location,
            incident.operator
        )?;
    }
    Ok(())
}

fn render_list_pretty(
    rows: &[&Incident],
    listing: &Listing<'_>,
    sort: &str,
    w: &mut dyn Write,
) -> io::Result<()> {
    if listing.is_empty() {
        writeln!(w, "{NO_MATCHES}")?;
        return Ok(());
    }

    writeln!(
        w,
        "{:<14} {:<18} {:<12} {:<17} {}",
        "ID", "TIPO", "ESTADO", "FECHA", "UBICACIÓN"
    )?;
    pretty_rule(w)?;
    for incident in rows {
        writeln!(
            w,
            "{:<14} {:<18} {:<12} {:<17} {}",
            incident.id,
            incident.kind.label(),
            incident.status.label(),
            when(&incident.timestamp),
            incident.location
        )?;
    }
    pretty_rule(w)?;
    write!(w, "{} incidente(s)", rows.len())?;
    if !sort.is_empty() {
        write!(w, " · orden: {sort}")?;
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use siren_core::query::SortField;
    use siren_core::storage::MemoryStorage;

    fn store() -> Store {
        Store::builder(MemoryStorage::new()).open().unwrap()
    }

    #[test]
    fn apply_sets_every_dimension() {
        let mut store = store();
        let args = ListArgs {
            statuses: vec![Status::Pending],
            sort: vec![SortKey::desc(SortField::Timestamp)],
            ..ListArgs::default()
        };
        apply(&mut store, &args);
        assert_eq!(store.listing().ids(), vec!["004", "001"]);
    }

    #[test]
    fn empty_criteria_clear_previous_ones() {
        let mut store = store();
        apply(
            &mut store,
            &ListArgs {
                kinds: vec![IncidentKind::Fire],
                ..ListArgs::default()
            },
        );
        apply(&mut store, &ListArgs::default());
        assert_eq!(store.listing().len(), 5);
    }

    #[test]
    fn pretty_reports_no_matches() {
        let mut store = store();
        apply(
            &mut store,
            &ListArgs {
                search: Some("zzz".into()),
                ..ListArgs::default()
            },
        );
        let listing = store.listing();
        let mut buf = Vec::new();
        render_list_pretty(&[], &listing, "", &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().trim_end(), NO_MATCHES);
    }

    #[test]
    fn text_rows_are_tab_separated() {
        let store = store();
        let listing = store.listing();
        let mut buf = Vec::new();
        render_list_text(&listing.rows()[..1], &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "001\tIncendio\tPendiente\t2024-01-15T10:30:00\tCalle 123 #45-67\tJuan Pérez\n"
        );
    }
}
