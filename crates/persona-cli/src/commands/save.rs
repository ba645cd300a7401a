use anyhow::Result;
use persona_adapters::CancellationFlag;

use crate::context::CommandContext;
use crate::runner::run_blocking;

pub async fn execute(context: &CommandContext, name: String) -> Result<()> {
    let cancellation = CancellationFlag::new();
    let manager = context.manager(cancellation.clone());

    let profile = name.clone();
    let email = run_blocking(cancellation, context.translator(), move || {
        manager.save(&profile)
    })
    .await?;

    println!(
        "{}",
        context
            .translator()
            .format("save.success", &[("name", &name), ("email", &email)])
    );
    Ok(())
}
