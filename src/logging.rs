use log::LevelFilter;

/// Install the global logger. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::builder()
        .format_target(false)
        .format_timestamp_millis()
        .filter_level(level)
        .parse_default_env()
        .init()
}
