use anyhow::Result;
use persona_adapters::CancellationFlag;

use crate::context::CommandContext;

pub async fn execute(context: &CommandContext, old: String, new: String) -> Result<()> {
    context.manager(CancellationFlag::new()).rename(&old, &new)?;

    println!(
        "{}",
        context
            .translator()
            .format("rename.success", &[("old", &old), ("new", &new)])
    );
    Ok(())
}
