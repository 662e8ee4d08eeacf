//! `siren resources`: dispatchable resources and their availability.

use crate::output::{OutputMode, render_mode};
use serde::Serialize;
use siren_core::actions::KNOWN_RESOURCES;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ResourceRow {
    id: &'static str,
    name: &'static str,
    available: bool,
}

pub fn run_resources(output: OutputMode) -> anyhow::Result<()> {
    let rows: Vec<ResourceRow> = KNOWN_RESOURCES
        .iter()
        .map(|r| ResourceRow {
            id: r.id,
            name: r.name,
            available: r.available,
        })
        .collect();

    render_mode(
        output,
        &rows,
        |rows, w| {
            for row in rows {
                writeln!(w, "{}\t{}\t{}", row.id, row.name, row.available)?;
            }
            Ok(())
        },
        |rows, w| {
            for row in rows {
                let note = if row.available { "" } else { "  (No disponible)" };
                writeln!(w, "{:<12} {}{note}", row.id, row.name)?;
            }
            Ok(())
        },
    )
}
