//! Headless session runner: signs in an account stored under the data
//! directory, refreshes it and reports where the app would go next.
//!
//! Usage: `okeiko-sitter <account-id>`

use anyhow::{bail, Result};
use log::{info, warn};

use okeiko_backend::config::AppConfig;
use okeiko_backend::domain::{RefreshOutcome, RewardService};
use okeiko_backend::io::Notice;
use okeiko_backend::Backend;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let Some(account_id) = std::env::args().nth(1) else {
        bail!("usage: okeiko-sitter <account-id>");
    };

    let backend = Backend::new(&config)?;
    backend.member_service.sign_in(&account_id);

    let outcome = match backend.member_service.refresh().await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(notice) = Notice::from_error(&e) {
                warn!("{}: {}", notice.title, notice.message);
            }
            return Err(e.into());
        }
    };

    match outcome {
        RefreshOutcome::Ready(member) => {
            let progress = member.goal_progress();
            info!(
                "Current member '{}': {}/{} points, reward visible: {}",
                member.user_name,
                progress.current_point,
                progress.goal_point,
                RewardService::hidden_place_visible(&member)
            );
        }
        RefreshOutcome::NeedsMemberSelection => {
            let names: Vec<String> = backend
                .session
                .members()
                .into_iter()
                .map(|m| m.user_name)
                .collect();
            info!("No member selected; members: {}", names.join(", "));
        }
        RefreshOutcome::NeedsRegistration => info!("No members registered yet"),
    }

    let loaded = backend.member_service.load_profile_images().await?;
    info!("Loaded {} profile images", loaded);
    Ok(())
}
