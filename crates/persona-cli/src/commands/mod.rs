mod delete;
mod export;
mod import;
mod lang;
mod list;
mod rename;
mod reset;
mod save;
mod status;
mod switch;
mod usage;

use std::io::IsTerminal;

use anyhow::Result;
use dialoguer::Confirm;

pub use delete::execute as delete;
pub use export::execute as export;
pub use import::execute as import;
pub use lang::execute as lang;
pub use list::execute as list;
pub use rename::execute as rename;
pub use reset::execute as reset;
pub use save::execute as save;
pub use status::execute as status;
pub use switch::execute as switch;
pub use usage::{execute as usage, unknown};

/// Asks before a destructive command. Non-interactive runs and `--yes`
/// proceed without asking.
fn confirm(prompt: String, skip_confirmation: bool) -> Result<bool> {
    if skip_confirmation || !std::io::stdin().is_terminal() {
        return Ok(true);
    }

    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
