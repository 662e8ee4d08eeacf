//! `siren assign`: replace the resources dispatched to an open incident.

use crate::cmd::create::action_failure;
use crate::output::{OutputMode, render_mode};
use clap::Args;
use siren_core::Store;
use siren_core::actions;
use siren_core::model::Incident;
use std::io::Write;

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Incident id.
    pub id: String,

    /// Resource ids or names (`policia`, `Bomberos`, ...). None clears the assignment.
    pub resources: Vec<String>,
}

pub fn run_assign(args: &AssignArgs, store: &mut Store, output: OutputMode) -> anyhow::Result<()> {
    let updated = actions::assign_resources(store, &args.id, &args.resources)
        .map_err(|err| action_failure(output, &err))?;

    render_mode(
        output,
        &updated,
        |incident, w| {
            writeln!(
                w,
                "{}\t{}\t{}",
                incident.id,
                incident.status,
                incident.resources.join(",")
            )
        },
        |incident: &Incident, w| {
            if incident.resources.is_empty() {
                writeln!(w, "✓ Incidente {}: sin recursos asignados", incident.id)
            } else {
                writeln!(
                    w,
                    "✓ Incidente {} ({}): {}",
                    incident.id,
                    incident.status.label(),
                    incident.resources.join(", ")
                )
            }
        },
    )
}
