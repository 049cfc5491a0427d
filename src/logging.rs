use env_logger::{Builder, Env};

/// Log target shared by every controller message.
pub const TARGET: &str = "staging";

/// Install env_logger. `RUST_LOG` wins over the configured filter.
pub fn init(default_filter: &str) {
    let env = Env::default().default_filter_or(default_filter);
    let _ = Builder::from_env(env)
        .format_timestamp_millis()
        .format_target(true)
        .try_init();
}
