//! `siren create`: the registration form.

use crate::output::{CliError, OutputMode, fail, pretty_kv, render_mode};
use clap::Args;
use siren_core::Store;
use siren_core::actions::{self, ActionError};
use siren_core::model::{Coordinates, Incident, IncidentDraft, IncidentKind, InvolvedParty};
use std::io::Write;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Incident type (e.g. `fire`, `accident`, "Emergencia Médica").
    #[arg(long = "type")]
    pub kind: IncidentKind,

    /// Address or landmark.
    #[arg(long)]
    pub location: String,

    /// What happened.
    #[arg(long, short = 'd')]
    pub description: String,

    /// Involved party as `name,document,contact` (repeatable).
    #[arg(long = "party", value_parser = parse_party)]
    pub parties: Vec<InvolvedParty>,

    /// Latitude; jittered around the map reference point when omitted.
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude; jittered around the map reference point when omitted.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Accept the processing of personal data.
    #[arg(long)]
    pub accept_terms: bool,
}

fn parse_party(raw: &str) -> Result<InvolvedParty, String> {
    let mut parts = raw.splitn(3, ',').map(str::trim);
    let (Some(name), Some(document_id), Some(contact)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected `name,document,contact`, got '{raw}'"));
    };
    Ok(InvolvedParty {
        name: name.to_string(),
        document_id: document_id.to_string(),
        contact: contact.to_string(),
    })
}

impl CreateArgs {
    fn draft(&self) -> IncidentDraft {
        let mut draft = IncidentDraft::new(self.kind, self.location.clone())
            .with_description(self.description.clone());
        for party in &self.parties {
            draft = draft.with_party(party.clone());
        }
        if let (Some(latitude), Some(longitude)) = (self.lat, self.lng) {
            draft = draft.with_coordinates(Coordinates {
                latitude,
                longitude,
            });
        }
        draft
    }
}

pub fn run_create(args: &CreateArgs, store: &mut Store, output: OutputMode) -> anyhow::Result<()> {
    let created = match actions::register(store, &args.draft(), args.accept_terms) {
        Ok(incident) => incident,
        Err(err) => return Err(action_failure(output, &err)),
    };

    render_mode(
        output,
        &created,
        |incident, w| writeln!(w, "{}", incident.id),
        |incident: &Incident, w| {
            writeln!(w, "✓ Incidente {} registrado", incident.id)?;
            pretty_kv(w, "tipo", incident.kind.label())?;
            pretty_kv(w, "ubicación", &incident.location)?;
            pretty_kv(w, "estado", incident.status.label())
        },
    )
}

/// Report a rejected action with its code.
pub fn action_failure(output: OutputMode, err: &ActionError) -> anyhow::Error {
    fail(output, CliError::with_code(err.to_string(), err.code()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_needs_three_fields() {
        let party = parse_party("Ana Ruiz, 1020, 3001234567").unwrap();
        assert_eq!(party.name, "Ana Ruiz");
        assert_eq!(party.contact, "3001234567");
        assert!(parse_party("Ana,1020").is_err());
    }

    #[test]
    fn party_contact_may_contain_commas() {
        let party = parse_party("Ana,1020,Calle 1, apto 2").unwrap();
        assert_eq!(party.contact, "Calle 1, apto 2");
    }
}
