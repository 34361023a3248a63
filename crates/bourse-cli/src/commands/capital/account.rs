//! Session, account and utility commands.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bourse_capital::CapitalClient;

use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {}

#[derive(Args, Debug)]
pub struct SwitchAccountArgs {
    /// Account to make active
    pub account_id: String,
}

#[derive(Args, Debug)]
pub struct ConfirmArgs {
    /// Deal reference returned when the order was placed
    pub deal_reference: String,
}

pub async fn login(client: &CapitalClient, _args: LoginArgs) -> Result<()> {
    eprintln!("{}", "Logging in...".dimmed());

    let credentials = client.login().await.context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Account", credentials.account().unwrap_or("-"));
    output::field("Generation", &credentials.generation().to_string());
    output::field("Issued", &credentials.issued_at().to_rfc3339());

    Ok(())
}

pub async fn session(client: &CapitalClient, pretty: bool) -> Result<()> {
    let details = client
        .session_details()
        .await
        .context("Failed to fetch session")?;
    output::response(&details, pretty)
}

pub async fn accounts(client: &CapitalClient, pretty: bool) -> Result<()> {
    let accounts = client.accounts().await.context("Failed to list accounts")?;
    output::response(&accounts, pretty)
}

pub async fn preferences(client: &CapitalClient, pretty: bool) -> Result<()> {
    let preferences = client
        .account_preferences()
        .await
        .context("Failed to fetch account preferences")?;
    output::response(&preferences, pretty)
}

pub async fn switch_account(
    client: &CapitalClient,
    args: SwitchAccountArgs,
    pretty: bool,
) -> Result<()> {
    let result = client
        .switch_account(&args.account_id)
        .await
        .context("Failed to switch account")?;
    output::response(&result, pretty)
}

pub async fn confirm(client: &CapitalClient, args: ConfirmArgs, pretty: bool) -> Result<()> {
    let confirmation = client
        .confirm(&args.deal_reference)
        .await
        .context("Failed to fetch deal confirmation")?;
    output::response(&confirmation, pretty)
}

pub async fn time(client: &CapitalClient, pretty: bool) -> Result<()> {
    let time = client
        .server_time()
        .await
        .context("Failed to fetch server time")?;
    output::response(&time, pretty)
}

pub async fn ping(client: &CapitalClient, pretty: bool) -> Result<()> {
    let pong = client.ping().await.context("Failed to ping")?;
    output::response(&pong, pretty)
}
