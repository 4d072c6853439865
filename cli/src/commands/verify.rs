//! Verify command

use anyhow::{anyhow, Result};
use bountyhub_core::{extract_token_address, TokenFamily};
use colored::Colorize;

use crate::config::Context;
use crate::output::OutputFormat;

pub async fn handle(
    family: TokenFamily,
    link: &str,
    address: Option<&str>,
    ctx: &Context,
    format: OutputFormat,
) -> Result<()> {
    let user = ctx.wallet_address(address)?;
    let token = extract_token_address(link)
        .ok_or_else(|| anyhow!("Invalid link format. Please check the link and try again."))?;

    let verified = ctx
        .verifiers()?
        .verify(family, &token, user)
        .await
        .map_err(|e| anyhow!("{} ({})", e, e.kind()))?;

    eprintln!("{} {} token verified", "✓".green(), family);
    format.print(&verified)
}
