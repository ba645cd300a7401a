use anyhow::{bail, Result};
use persona_adapters::CancellationFlag;
use persona_core::{ProfileError, Translator};

use super::confirm;
use crate::context::CommandContext;
use crate::runner::run_blocking;

type Outcome = (String, Result<bool, ProfileError>);

pub async fn execute(
    context: &CommandContext,
    names: Vec<String>,
    skip_confirmation: bool,
) -> Result<()> {
    let translator = context.translator();

    let prompt = translator.format(
        "delete.confirm",
        &[
            ("count", &names.len().to_string()),
            ("names", &names.join(", ")),
        ],
    );
    if !confirm(prompt, skip_confirmation)? {
        println!("{}", translator.get("delete.cancelled"));
        return Ok(());
    }

    let cancellation = CancellationFlag::new();
    let manager = context.manager(cancellation.clone());
    let outcomes = run_blocking(cancellation, translator, move || {
        Ok(names
            .into_iter()
            .map(|name| {
                let outcome = manager.delete(&name);
                (name, outcome)
            })
            .collect::<Vec<Outcome>>())
    })
    .await?;

    let failures = report(&outcomes, translator);
    if failures > 0 {
        bail!(
            "{}",
            translator.format("delete.partial", &[("count", &failures.to_string())])
        );
    }

    Ok(())
}

/// Prints one line per name and returns how many were not deleted.
fn report(outcomes: &[Outcome], translator: &Translator) -> usize {
    let mut failures = 0;

    for (name, outcome) in outcomes {
        match outcome {
            Ok(true) => println!("{}", translator.format("delete.success", &[("name", name)])),
            Ok(false) => {
                failures += 1;
                eprintln!("{}", translator.format("delete.not_found", &[("name", name)]));
            }
            Err(error) => {
                failures += 1;
                eprintln!(
                    "{}",
                    translator.format("command.error", &[("message", &error.to_string())])
                );
            }
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::{Language, ProfileName};

    #[test]
    fn each_name_is_reported_independently() {
        let outcomes = vec![
            ("work".to_string(), Ok(true)),
            ("ghost".to_string(), Ok(false)),
            (
                "../bad".to_string(),
                Err(ProfileError::invalid_name(
                    "../bad",
                    ProfileName::parse("../bad").unwrap_err(),
                )),
            ),
            ("home".to_string(), Ok(true)),
        ];

        let failures = report(&outcomes, &Translator::new(Language::En));

        assert_eq!(failures, 2);
    }
}
