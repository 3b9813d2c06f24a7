// Entrypoint for the CLI application.
// - Keeps `main` small: read config, build the API client and hand it to
//   the session loop together with a terminal console.
// - Startup problems (bad config, client build) are returned as
//   `anyhow` errors; everything after that is reported by the session.

use anyhow::Context;
use dressy_cli::{api::ApiClient, config::Config, logging, session::App, ui::TerminalConsole};

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::from_env()?;
    tracing::info!(api_url = %config.api_url, "starting");
    let api = ApiClient::new(&config).context("Failed to build HTTP client")?;

    // Blocks until the user exits or the session is aborted.
    let mut app = App::new(api, TerminalConsole::new(), config.jwt_secret);
    app.run();
    Ok(())
}
