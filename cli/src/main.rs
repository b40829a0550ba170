mod commands;
mod terminal;

use std::sync::Arc;

use commands::{CommandLine, Commands, catalog, dashboard, login, scan, serve};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet);
    print::banner(commands.quiet);

    let cfg = Arc::new(commands.config());
    let proxy_url = commands.proxy_url.as_deref();

    match commands.command {
        Commands::Serve { bind } => {
            print::header("starting proxy", cfg.quiet);
            serve::serve(bind, cfg).await
        }
        Commands::Scan { kind, target, set } => {
            print::header(&format!("{kind} scan"), cfg.quiet);
            scan::scan(kind, target, &set, &cfg, proxy_url).await
        }
        Commands::Dashboard { watch } => {
            print::header("dashboard", cfg.quiet);
            dashboard::dashboard(watch, &cfg, proxy_url).await
        }
        Commands::Catalog => {
            print::header("scan catalog", cfg.quiet);
            catalog::catalog(&cfg);
            Ok(())
        }
        Commands::Login { username, password } => {
            print::header("sign in", cfg.quiet);
            login::login(&username, &password, &cfg)
        }
    }
}
