//! `siren facets`: the values offered by the filter panel.

use crate::output::{OutputMode, pretty_kv, render_mode};
use serde::Serialize;
use siren_core::Store;
use siren_core::model::{IncidentKind, Status};
use siren_core::query::month_name;
use std::io::{self, Write};

#[derive(Debug, Serialize)]
pub struct FacetReport {
    pub tipos: Vec<IncidentKind>,
    pub estados: Vec<Status>,
    pub anios: Vec<i32>,
    pub meses: Vec<MonthFacet>,
}

#[derive(Debug, Serialize)]
pub struct MonthFacet {
    pub numero: u32,
    pub nombre: &'static str,
}

pub fn facet_report(store: &Store) -> FacetReport {
    let facets = store.facets();
    FacetReport {
        tipos: facets.kinds,
        estados: facets.statuses,
        anios: facets.years,
        meses: facets
            .months
            .into_iter()
            .filter_map(|m| month_name(m).map(|nombre| MonthFacet { numero: m, nombre }))
            .collect(),
    }
}

fn joined<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn month_names(report: &FacetReport) -> String {
    report
        .meses
        .iter()
        .map(|m| m.nombre)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn run_facets(store: &Store, output: OutputMode) -> anyhow::Result<()> {
    let report = facet_report(store);
    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &FacetReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "tipo\t{}", joined(&report.tipos))?;
    writeln!(w, "estado\t{}", joined(&report.estados))?;
    writeln!(w, "año\t{}", joined(&report.anios))?;
    writeln!(w, "mes\t{}", month_names(report))
}

fn render_pretty(report: &FacetReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_kv(w, "Tipo", joined(&report.tipos))?;
    pretty_kv(w, "Estado", joined(&report.estados))?;
    pretty_kv(w, "Año", joined(&report.anios))?;
    pretty_kv(w, "Mes", month_names(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use siren_core::storage::MemoryStorage;

    #[test]
    fn seed_facets_name_january() {
        let store = Store::builder(MemoryStorage::new()).open().unwrap();
        let report = facet_report(&store);
        assert_eq!(report.anios, vec![2024]);
        assert_eq!(report.meses.len(), 1);
        assert_eq!(report.meses[0].nombre, "Enero");
        assert_eq!(report.tipos.len(), 5);
    }
}
