use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
/// Returns false if a subscriber was already installed.
pub fn init_logging() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry().with(filter).with(tree_layer()).try_init().is_ok()
}

fn tree_layer() -> HierarchicalLayer {
    HierarchicalLayer::default()
        .with_indent_amount(2)
        .with_targets(true)
        .with_bracketed_fields(true)
}
