use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

/// Installs the global subscriber. Hosts embedding the switcher into a process
/// that already owns a subscriber should skip this.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let tree = HierarchicalLayer::new(2)
        .with_indent_lines(true)
        .with_targets(true)
        .with_bracketed_fields(true);

    if Registry::default().with(filter).with(tree).try_init().is_err() {
        tracing::debug!("logging already initialized");
    }
}
