//! Interactive prompts.

use dialoguer::{Confirm, Input, Select};

use bridge_core::{BridgeError, ParticipantKey, SearchScope, SystemState};

use crate::error::CliResult;
use crate::output::{print_error, wristband};

/// Resolves `query` to one participant, asking the operator to pick when
/// several match. Returns `None` if the operator backs out.
pub fn pick_participant(
    state: &SystemState,
    query: &str,
    scope: SearchScope,
) -> CliResult<Option<ParticipantKey>> {
    match state.resolve(query, scope) {
        Ok(key) => Ok(Some(key)),
        Err(BridgeError::AmbiguousSearch { candidates, .. }) => {
            let labels: Vec<String> = candidates
                .iter()
                .filter_map(|key| state.participant(key))
                .map(|p| {
                    let email = p.email.as_deref().unwrap_or("no email");
                    format!("{} ({email}) {}", p.name, wristband(p))
                })
                .collect();
            let choice = Select::new()
                .with_prompt(format!("{} people match '{query}'", candidates.len()))
                .items(labels.as_slice())
                .default(0)
                .interact_opt()?;
            Ok(choice.and_then(|i| candidates.get(i).cloned()))
        }
        Err(other) => Err(other.into()),
    }
}

/// Plain yes/no confirmation, defaulting to no.
pub fn confirm(prompt: &str) -> CliResult<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Requires the operator to type `expected` exactly.
pub fn confirm_literal(prompt: &str, expected: &str) -> CliResult<bool> {
    let typed = Input::<String>::new()
        .with_prompt(format!("{prompt} (type '{expected}')"))
        .allow_empty(true)
        .interact_text()?;
    if typed.trim() == expected {
        Ok(true)
    } else {
        print_error("Confirmation did not match. Aborted.");
        Ok(false)
    }
}

/// Runs each literal confirmation in order, stopping at the first mismatch.
pub fn confirm_steps(steps: &[(&str, String)]) -> CliResult<bool> {
    for (prompt, expected) in steps {
        if !confirm_literal(prompt, expected)? {
            return Ok(false);
        }
    }
    Ok(true)
}
