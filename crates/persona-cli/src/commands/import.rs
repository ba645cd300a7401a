use std::path::PathBuf;

use anyhow::Result;
use persona_adapters::CancellationFlag;

use crate::context::CommandContext;
use crate::runner::run_blocking;

pub async fn execute(context: &CommandContext, path: PathBuf, overwrite: bool) -> Result<()> {
    let cancellation = CancellationFlag::new();
    let manager = context.manager(cancellation.clone());

    let archive = path.clone();
    let names = run_blocking(cancellation, context.translator(), move || {
        manager.import(&archive, overwrite)
    })
    .await?;

    println!(
        "{}",
        context
            .translator()
            .format("import.success", &[("path", &path.display().to_string())])
    );
    for name in names {
        println!("  - {}", name);
    }
    Ok(())
}
