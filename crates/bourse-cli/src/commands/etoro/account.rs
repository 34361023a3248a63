//! Account commands.

use anyhow::{Context, Result, bail};
use colored::Colorize;

use bourse_etoro::EtoroClient;

use crate::output;

pub async fn check(client: &EtoroClient) -> Result<()> {
    eprintln!("{}", "Checking keys...".dimmed());

    let accepted = client
        .validate_credentials()
        .await
        .context("Failed to reach eToro")?;
    if !accepted {
        output::error("eToro rejected the API key or user key");
        bail!("Credentials rejected");
    }

    output::success("Credentials accepted");
    output::field("Account type", &client.account_type().to_string());
    Ok(())
}

pub async fn info(client: &EtoroClient, pretty: bool) -> Result<()> {
    let info = client
        .account_info()
        .await
        .context("Failed to fetch account info")?;
    output::response(&info, pretty)
}

pub async fn portfolio(client: &EtoroClient, pretty: bool) -> Result<()> {
    let summary = client
        .portfolio_summary()
        .await
        .context("Failed to fetch portfolio summary")?;
    output::response(&summary, pretty)
}
