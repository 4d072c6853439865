//! Create command
//!
//! Walks the wizard non-interactively: select the family, verify the link,
//! then submit the details.

use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};
use bountyhub_core::{CampaignForm, ChainWriter, KeywordSet, Wizard};
use chrono::Utc;
use colored::Colorize;

use super::parse_date;
use crate::config::Context;
use crate::output::{CampaignDetail, OutputFormat};
use crate::CreateArgs;

pub async fn handle(args: CreateArgs, ctx: &Context, format: OutputFormat) -> Result<()> {
    let signer = ctx
        .signer()?
        .context("Wallet not connected: set BOUNTYHUB_PRIVATE_KEY or pass --private-key")?;
    let creator = signer.account();

    let form = CampaignForm {
        title: args.title,
        description: args.description,
        start_date: Some(parse_date(&args.start)?),
        end_date: Some(parse_date(&args.end)?),
        budget_percentage: args.budget,
        keywords: args.keywords.iter().collect::<KeywordSet>(),
    };

    let wizard = Wizard::new().select(args.family);
    let details = wizard
        .verify(&args.link, creator, &ctx.verifiers()?)
        .await
        .map_err(|(_, e)| anyhow!("{} ({})", e, e.kind()))?;
    eprintln!("{} {} token verified", "✓".green(), details.family());

    let writer: Arc<dyn ChainWriter> = signer;
    let submitter = ctx.submitter(Some(writer))?;
    let campaign = details.submit(&submitter, creator, form).await?;

    eprintln!("{} Campaign {} created", "✓".green(), campaign.id.bold());
    format.print(&CampaignDetail::new(campaign, Utc::now()))
}
