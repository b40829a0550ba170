use colored::*;
use kalium_common::config::Config;
use kalium_core::auth::{AuthView, LoginGate};

use crate::terminal::{colors, print};

pub fn login(username: &str, password: &str, cfg: &Config) -> anyhow::Result<()> {
    let gate = LoginGate::new(cfg.credentials.clone());

    match AuthView::default().submit(&gate, username, password) {
        AuthView::Authenticated(session) => {
            let at = session.signed_in_at.format("%H:%M:%S").to_string();
            print::aligned_line("User", 6, session.username.color(colors::SUCCESS));
            print::aligned_line("Since", 6, at);
            Ok(())
        }
        AuthView::Login { error } => {
            let error = error.unwrap_or_else(|| "Invalid credentials".to_string());
            anyhow::bail!(error)
        }
    }
}
