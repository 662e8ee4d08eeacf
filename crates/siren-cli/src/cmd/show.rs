//! `siren show`: full detail of one incident, as the detail view shows it.

use crate::output::{
    CliError, OutputMode, fail, pretty_kv, pretty_rule, pretty_section, render_mode, when,
};
use clap::Args;
use siren_core::Store;
use siren_core::error::ErrorCode;
use siren_core::model::Incident;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Incident id.
    pub id: String,
}

pub fn run_show(args: &ShowArgs, store: &mut Store, output: OutputMode) -> anyhow::Result<()> {
    if !store.select_incident_by_id(&args.id) {
        return Err(not_found(output, &args.id));
    }
    let Some(incident) = store.state().selected_incident.as_ref() else {
        return Err(not_found(output, &args.id));
    };

    render_mode(output, incident, render_show_text, render_show_pretty)
}

pub fn not_found(output: OutputMode, id: &str) -> anyhow::Error {
    let mut err = CliError::with_code(
        format!("incident '{id}' not found"),
        ErrorCode::IncidentNotFound,
    );
    err.suggestion = Some("use `siren list` to see registered incidents".to_string());
    fail(output, err)
}

fn render_show_pretty(incident: &Incident, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Incidente {}", incident.id))?;
    pretty_kv(w, "tipo", incident.kind.label())?;
    pretty_kv(w, "estado", incident.status.label())?;
    pretty_kv(w, "ubicación", &incident.location)?;
    pretty_kv(w, "fecha", when(&incident.timestamp))?;
    pretty_kv(w, "operador", &incident.operator)?;
    if incident.resources.is_empty() {
        pretty_kv(w, "recursos", "Sin recursos asignados")?;
    } else {
        pretty_kv(w, "recursos", incident.resources.join(", "))?;
    }
    if let Some(coords) = incident.coordinates {
        pretty_kv(
            w,
            "coordenadas",
            format!("{:.4}, {:.4}", coords.latitude, coords.longitude),
        )?;
    }
    if incident.status.is_terminal() {
        writeln!(w, "Este incidente está resuelto y no admite cambios.")?;
    }

    if let Some(description) = &incident.description {
        writeln!(w)?;
        pretty_section(w, "Descripción")?;
        for line in description.lines() {
            writeln!(w, "{line}")?;
        }
    }

    if !incident.involved_parties.is_empty() {
        writeln!(w)?;
        pretty_section(w, &format!("Involucrados ({})", incident.involved_parties.len()))?;
        for party in &incident.involved_parties {
            writeln!(w, "{} · {} · {}", party.name, party.document_id, party.contact)?;
        }
    }

    writeln!(w)?;
    pretty_section(w, "Historial")?;
    if incident.history.is_empty() {
        writeln!(w, "Sin cambios registrados")?;
    }
    for entry in &incident.history {
        writeln!(w, "[{}] {}: {}", when(&entry.timestamp), entry.operator, entry.action)?;
    }
    pretty_rule(w)
}

fn render_show_text(incident: &Incident, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "id\t{}", incident.id)?;
    writeln!(w, "tipo\t{}", incident.kind)?;
    writeln!(w, "estado\t{}", incident.status)?;
    writeln!(w, "ubicacion\t{}", incident.location)?;
    writeln!(w, "fechaHora\t{}", incident.timestamp)?;
    writeln!(w, "operador\t{}", incident.operator)?;
    writeln!(w, "recursos\t{}", incident.resources.join(","))?;
    if let Some(description) = &incident.description {
        writeln!(w, "descripcion\t{description}")?;
    }
    for entry in &incident.history {
        writeln!(w, "historial\t{}\t{}\t{}", entry.timestamp, entry.operator, entry.action)?;
    }
    Ok(())
}
