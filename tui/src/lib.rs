// Forbid accidental stdout/stderr writes in the *library* portion of the TUI.
// The `rapid-select` binary prints the accepted selection after the
// alternate screen has been left.
#![deny(clippy::print_stdout, clippy::print_stderr)]
use std::fs::OpenOptions;
use std::sync::Arc;

use app::App;
use rapid_select_backend_client::HttpTransport;
use rapid_select_core::ConfigOverrides;
use rapid_select_core::SelectConfig;
use rapid_select_core::config::log_dir;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod app;
mod cli;
mod key_map;
mod select_view;
mod tui;
mod util {
    pub mod list_window;
}

pub use app::AppExit;
pub use cli::Cli;
pub use key_map::KeyIntent;
pub use key_map::map_key;
pub use select_view::SelectView;

pub async fn run_main(cli: Cli) -> anyhow::Result<AppExit> {
    let _guard = init_logging(cli.debug)?;

    let cli_overrides = cli
        .config_overrides
        .to_table()
        .map_err(|e| anyhow::anyhow!("error parsing -c overrides: {e}"))?;
    let overrides = ConfigOverrides {
        endpoint: cli.endpoint.clone(),
        multi: cli.multi.then_some(true),
        placeholder: cli.placeholder.clone(),
        quiet_millis: None,
        cache: None,
    };
    let config = SelectConfig::load_with_overrides(
        cli.config_file.as_deref(),
        Some(cli_overrides),
        overrides,
    )?;
    tracing::info!(endpoint = %config.endpoint, multi = config.multi, "starting");

    let mut transport = HttpTransport::new()?.with_timeout(config.request_timeout());
    if let Some(base_url) = &cli.base_url {
        transport = transport.with_base_url(base_url.clone());
    }

    let app = App::new(config, Arc::new(transport));
    let mut terminal = tui::init()?;
    let result = app.run(&mut terminal).await;
    let restored = tui::restore();
    let exit = result?;
    restored?;
    Ok(exit)
}

fn init_logging(debug: bool) -> anyhow::Result<WorkerGuard> {
    let log_dir = log_dir()?;
    std::fs::create_dir_all(&log_dir)?;
    // Open (or create) the log file, appending to it.
    let mut log_file_opts = OpenOptions::new();
    log_file_opts.create(true).append(true);

    // Ensure the file is only readable and writable by the current user.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        log_file_opts.mode(0o600);
    }

    let log_file = log_file_opts.open(log_dir.join("rapid-select.log"))?;
    let (non_blocking, guard) = non_blocking(log_file);

    let default_filter = if debug {
        "rapid_select_core=info,rapid_select_tui=info,rapid_select_backend_client=info"
    } else {
        "rapid_select_core=warn,rapid_select_tui=warn,rapid_select_backend_client=warn"
    };

    // use RUST_LOG env var, defaulting based on debug flag.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(false)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(file_layer).try_init();
    Ok(guard)
}
