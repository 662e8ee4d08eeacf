//! `siren status`: change the status of an open incident.

use crate::cmd::create::action_failure;
use crate::output::{OutputMode, render_mode};
use clap::Args;
use siren_core::Store;
use siren_core::actions;
use siren_core::model::{Incident, Status};
use std::io::Write;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Incident id.
    pub id: String,

    /// New status: `pending`, `in-progress`, `resolved` (or the Spanish label).
    pub status: Status,
}

pub fn run_status(args: &StatusArgs, store: &mut Store, output: OutputMode) -> anyhow::Result<()> {
    let updated = actions::change_status(store, &args.id, args.status)
        .map_err(|err| action_failure(output, &err))?;

    render_mode(
        output,
        &updated,
        |incident, w| writeln!(w, "{}\t{}", incident.id, incident.status),
        |incident: &Incident, w| {
            writeln!(
                w,
                "✓ Incidente {}: {}",
                incident.id,
                incident.status.label()
            )
        },
    )
}
