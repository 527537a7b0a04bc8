use clap::Parser;
use rapid_select_common::CliConfigOverrides;
use rapid_select_tui::AppExit;
use rapid_select_tui::Cli;
use rapid_select_tui::run_main;

/// Exit status when the user aborts with Ctrl+C.
const ABORTED_EXIT_CODE: i32 = 130;

#[derive(Parser, Debug)]
struct TopCli {
    #[clap(flatten)]
    config_overrides: CliConfigOverrides,

    #[clap(flatten)]
    inner: Cli,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let top_cli = TopCli::parse();
    let mut inner = top_cli.inner;
    inner
        .config_overrides
        .raw_overrides
        .splice(0..0, top_cli.config_overrides.raw_overrides);

    match run_main(inner).await? {
        AppExit::Accepted(selection) => {
            println!("{}", serde_json::to_string(&selection)?);
            Ok(())
        }
        AppExit::Aborted => std::process::exit(ABORTED_EXIT_CODE),
    }
}
