use anyhow::{Context, Result};
use persona_adapters::CancellationFlag;
use persona_core::{ProfileError, Translator};
use tracing::info;

/// Runs a blocking profile operation off the async runtime. Ctrl-C sets the
/// cancellation flag; the operation then stops at its next checkpoint and
/// its result, usually `Cancelled` or the step that failed, is returned.
pub async fn run_blocking<T, F>(
    cancellation: CancellationFlag,
    translator: &Translator,
    operation: F,
) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ProfileError> + Send + 'static,
{
    let mut task = tokio::task::spawn_blocking(operation);

    let finished = tokio::select! {
        joined = &mut task => Some(joined),
        Ok(()) = tokio::signal::ctrl_c() => None,
    };

    let joined = match finished {
        Some(joined) => joined,
        None => {
            info!("SIGINT received, cancelling after the current step");
            eprintln!("{}", translator.get("command.interrupt"));
            cancellation.cancel();
            task.await
        }
    };

    let outcome = joined.context("profile operation did not complete")?;
    Ok(outcome?)
}
