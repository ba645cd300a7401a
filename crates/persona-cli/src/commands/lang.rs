use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use persona_core::{Config, Language, Translator};

use crate::context::CommandContext;

pub fn execute(context: &CommandContext, language: Option<String>) -> Result<()> {
    match language {
        Some(code) => set_language(&code, context.translator()),
        None => {
            display_current_language(context.config().general.language, context.translator());
            Ok(())
        }
    }
}

fn display_current_language(language: Language, translator: &Translator) {
    println!(
        "{}",
        translator.format(
            "lang.current",
            &[("name", language.display_name()), ("code", language.code())]
        )
    );
}

fn set_language(code: &str, translator: &Translator) -> Result<()> {
    let language: Language = code.parse().map_err(|_| {
        anyhow::anyhow!("{}", translator.format("lang.unsupported", &[("lang", code)]))
    })?;

    update_config_language(&Config::config_path(), language)?;

    let translator = Translator::new(language);
    println!(
        "{}",
        translator.format("lang.set", &[("name", language.display_name())])
    );
    Ok(())
}

fn update_config_language(config_path: &Path, language: Language) -> Result<()> {
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => String::new(),
        Err(error) => {
            return Err(error)
                .with_context(|| format!("cannot read {}", config_path.display()))
        }
    };

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }

    fs::write(config_path, update_language_in_toml(&content, language))
        .with_context(|| format!("cannot write {}", config_path.display()))
}

/// Rewrites only the `language` line of `[general]`, keeping every other
/// line, comments included.
fn update_language_in_toml(content: &str, language: Language) -> String {
    let language_line = format!("language = \"{}\"", language.code());
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    let mut in_general_section = false;
    let mut general_index = None;
    let mut language_updated = false;

    for (index, line) in lines.iter_mut().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') {
            in_general_section = trimmed == "[general]";
            if in_general_section {
                general_index = Some(index);
            }
            continue;
        }

        let is_language_key = trimmed
            .split('=')
            .next()
            .map(|key| key.trim() == "language")
            .unwrap_or(false);
        if in_general_section && is_language_key && trimmed.contains('=') {
            *line = language_line.clone();
            language_updated = true;
        }
    }

    match general_index {
        None => {
            let mut updated = vec!["[general]".to_string(), language_line];
            if !lines.is_empty() {
                updated.push(String::new());
                updated.extend(lines);
            }
            updated.push(String::new());
            updated.join("\n")
        }
        Some(index) => {
            if !language_updated {
                lines.insert(index + 1, language_line);
            }
            lines.push(String::new());
            lines.join("\n")
        }
    }
}
