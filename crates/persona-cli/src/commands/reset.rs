use anyhow::Result;
use persona_adapters::CancellationFlag;

use super::confirm;
use crate::context::CommandContext;
use crate::runner::run_blocking;

pub async fn execute(context: &CommandContext, skip_confirmation: bool) -> Result<()> {
    let translator = context.translator();

    if !confirm(translator.get("reset.confirm"), skip_confirmation)? {
        println!("{}", translator.get("reset.cancelled"));
        return Ok(());
    }

    let cancellation = CancellationFlag::new();
    let manager = context.manager(cancellation.clone());
    run_blocking(cancellation, translator, move || manager.reset()).await?;

    println!("{}", translator.get("reset.success"));
    Ok(())
}
