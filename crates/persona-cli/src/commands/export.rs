use std::path::PathBuf;

use anyhow::Result;
use persona_adapters::CancellationFlag;

use crate::context::CommandContext;
use crate::runner::run_blocking;

pub async fn execute(context: &CommandContext, path: PathBuf) -> Result<()> {
    let cancellation = CancellationFlag::new();
    let manager = context.manager(cancellation.clone());

    let archive = path.clone();
    run_blocking(cancellation, context.translator(), move || {
        manager.export(&archive)
    })
    .await?;

    println!(
        "{}",
        context
            .translator()
            .format("export.success", &[("path", &path.display().to_string())])
    );
    Ok(())
}
