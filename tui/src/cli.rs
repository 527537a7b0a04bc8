use clap::Parser;
use rapid_select_common::CliConfigOverrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Search endpoint; the url-encoded query text is appended to it.
    /// Overrides `endpoint` from the config file.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Keep every chosen option instead of replacing the selection.
    #[arg(long, default_value_t = false)]
    pub multi: bool,

    /// Hint shown in the empty input while nothing is selected.
    #[arg(long, value_name = "TEXT")]
    pub placeholder: Option<String>,

    /// Resolve endpoints without a scheme against this url.
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Read the config from this file instead of `~/.rapid-select/config.toml`.
    #[arg(long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log at info level instead of warn.
    #[clap(long = "debug", short = 'd', default_value_t = false)]
    pub debug: bool,

    #[clap(skip)]
    pub config_overrides: CliConfigOverrides,
}
