use anyhow::Result;
use persona_core::{ProfileSummary, Translator};

use crate::context::CommandContext;
use persona_adapters::CancellationFlag;

pub async fn execute(context: &CommandContext, json: bool) -> Result<()> {
    let profiles = context.manager(CancellationFlag::new()).list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
    } else {
        print_formatted(&profiles, context.translator());
    }

    Ok(())
}

fn print_formatted(profiles: &[ProfileSummary], translator: &Translator) {
    if profiles.is_empty() {
        println!("{}", translator.get("list.empty"));
        return;
    }

    println!("{}", translator.get("list.header"));
    let width = profiles
        .iter()
        .map(|profile| profile.name.chars().count())
        .max()
        .unwrap_or(0);
    for profile in profiles {
        println!("{}", format_line(profile, width));
    }
    println!("{}", translator.get("list.footer"));
}

fn format_line(profile: &ProfileSummary, width: usize) -> String {
    let marker = if profile.is_current { '*' } else { ' ' };
    let line = format!(
        "{} {:<width$}  {}  {}",
        marker,
        profile.name,
        profile.email,
        profile.last_active,
        width = width
    );
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, is_current: bool) -> ProfileSummary {
        ProfileSummary {
            name: name.to_string(),
            email: "a@x.com".to_string(),
            is_current,
            last_active: "2024-05-01 09:30:00".to_string(),
        }
    }

    #[test]
    fn current_profile_is_starred() {
        assert_eq!(
            format_line(&summary("work", true), 6),
            "* work    a@x.com  2024-05-01 09:30:00"
        );
        assert_eq!(
            format_line(&summary("home", false), 4),
            "  home  a@x.com  2024-05-01 09:30:00"
        );
    }

    #[test]
    fn json_lists_expected_fields() {
        let json = serde_json::to_value(vec![summary("work", true)]).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{
                "name": "work",
                "email": "a@x.com",
                "is_current": true,
                "last_active": "2024-05-01 09:30:00"
            }])
        );
    }
}
