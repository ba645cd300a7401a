use persona_core::Translator;

const USAGE_KEYS: [&str; 10] = [
    "usage.list",
    "usage.save",
    "usage.switch",
    "usage.status",
    "usage.reset",
    "usage.export",
    "usage.import",
    "usage.delete",
    "usage.rename",
    "usage.lang",
];

pub fn execute(translator: &Translator) {
    println!("{}", translator.get("usage.title"));
    for key in USAGE_KEYS {
        println!("{}", translator.get(key));
    }
}

pub fn unknown(command: &str, translator: &Translator) -> anyhow::Error {
    anyhow::anyhow!(
        "{}",
        translator.format("command.unknown", &[("command", command)])
    )
}
