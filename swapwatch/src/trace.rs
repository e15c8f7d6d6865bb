use tracing::{info, subscriber, Level};
use tracing_subscriber::FmtSubscriber;

/// Installs a formatting subscriber with `level` as the global default.
///
/// Fails if a global subscriber has already been set.
pub fn init_tracing(level: impl Into<Level>) -> anyhow::Result<()> {
    let level = level.into();
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();

    subscriber::set_global_default(subscriber)?;
    info!("Initialized tracing with level: {}", level);

    Ok(())
}
