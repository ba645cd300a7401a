use super::Language;
use std::collections::BTreeMap;

/// Flattened `section.key` messages of one catalog.
type Messages = BTreeMap<String, String>;

/// Looks messages up in the selected language, then in English, then
/// returns the key itself.
#[derive(Debug, Clone)]
pub struct Translator {
    language: Language,
    messages: Messages,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        let mut messages = load_catalog(Language::En).unwrap_or_default();
        if language != Language::En {
            messages.extend(load_catalog(language).unwrap_or_default());
        }

        Self { language, messages }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn get(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Substitutes `{name}` placeholders in one pass. Unknown placeholders
    /// are left as written.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        let template = self.get(key);
        let mut output = String::with_capacity(template.len());
        let mut rest = template.as_str();

        while let Some(open) = rest.find('{') {
            output.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let value = after.find('}').and_then(|close| {
                let name = &after[..close];
                args.iter()
                    .find(|(candidate, _)| *candidate == name)
                    .map(|(_, value)| (*value, close))
            });

            match value {
                Some((value, close)) => {
                    output.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    output.push('{');
                    rest = after;
                }
            }
        }

        output.push_str(rest);
        output
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

fn load_catalog(language: Language) -> Result<Messages, toml::de::Error> {
    let table: toml::Table = toml::from_str(language.catalog())?;
    let mut messages = Messages::new();
    flatten(&table, "", &mut messages);
    Ok(messages)
}

fn flatten(table: &toml::Table, prefix: &str, messages: &mut Messages) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            toml::Value::String(text) => {
                messages.insert(path, text.clone());
            }
            toml::Value::Table(nested) => flatten(nested, &path, messages),
            _ => {}
        }
    }
}
