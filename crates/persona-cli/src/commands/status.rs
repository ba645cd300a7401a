use anyhow::Result;
use persona_adapters::CancellationFlag;
use persona_core::{StatusReport, Translator};

use crate::context::CommandContext;

pub async fn execute(context: &CommandContext, json: bool) -> Result<()> {
    let report = context.manager(CancellationFlag::new()).status();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_report(&report, context.translator()) {
            println!("{}", line);
        }
    }

    Ok(())
}

fn format_report(report: &StatusReport, translator: &Translator) -> Vec<String> {
    let profile = report
        .current_profile
        .clone()
        .unwrap_or_else(|| translator.get("status.unmanaged"));

    vec![
        translator.get("status.header"),
        translator.format("status.profile", &[("name", &profile)]),
        translator.format("status.email", &[("email", &report.current_email)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::{Language, LiveState};

    #[test]
    fn unmanaged_status_is_explained() {
        let report = StatusReport::new(&LiveState::Unmanaged, None);

        let lines = format_report(&report, &Translator::new(Language::En));

        assert_eq!(lines[1], "  Active profile: unsaved (external settings)");
        assert_eq!(lines[2], "  Logged-in email: Unknown");
    }

    #[test]
    fn bound_status_names_profile() {
        let report = StatusReport {
            current_profile: Some("work".to_string()),
            current_email: "a@x.com".to_string(),
        };

        let lines = format_report(&report, &Translator::new(Language::En));

        assert_eq!(lines[1], "  Active profile: work");
        assert_eq!(lines[2], "  Logged-in email: a@x.com");
    }
}
