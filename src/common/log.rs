use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;
use tracing_tree::time::Uptime;

/// Installs the process-wide tracing subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Spans are rendered as
/// an indented tree so a reflow batch and the frame writes it caused read
/// together.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let tree = HierarchicalLayer::default()
        .with_indent_amount(2)
        .with_indent_lines(true)
        .with_targets(true)
        .with_timer(Uptime::default());

    // Ignore the error: a subscriber may already be installed (e.g. in tests).
    let _ = tracing_subscriber::registry().with(filter).with(tree).try_init();
}
