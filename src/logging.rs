//! Diagnostic logging on stderr.
//!
//! Reports go to stdout with `println!`; progress and diagnostics go through
//! `tracing` so they can be silenced or raised with `RUST_LOG` without
//! touching the report text.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init(verbose: bool) {
    let default = if verbose {
        "kaelion_lab=debug,info"
    } else {
        "kaelion_lab=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // `try_init` so tests or embedding callers that already installed a
    // subscriber are left alone.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
