//! Campaign commands

use anyhow::{anyhow, Result};
use bountyhub_core::dashboard::{partition, search_and_sort};
use chrono::Utc;
use ethers::utils::to_checksum;

use crate::config::Context;
use crate::output::{CampaignDetail, CampaignList, OutputFormat};
use crate::CampaignCommands;

pub async fn handle(action: CampaignCommands, ctx: &Context, format: OutputFormat) -> Result<()> {
    let backend = ctx.backend()?;
    let now = Utc::now();

    match action {
        CampaignCommands::List { search, sort, status } => {
            let all = backend.all().await?;
            let listed = search_and_sort(&all, search.as_deref().unwrap_or(""), sort);
            let listed = match status {
                Some(status) => partition(listed, now).get(status).to_vec(),
                None => listed,
            };
            format.print(&CampaignList::new(listed, now))?;
        }
        CampaignCommands::Get { id } => {
            let campaign = backend
                .by_id(&id)
                .await?
                .ok_or_else(|| anyhow!("campaign {} not found", id))?;
            format.print(&CampaignDetail::new(campaign, now))?;
        }
        CampaignCommands::Mine { address } => {
            let address = ctx.wallet_address(address.as_deref())?;
            let campaigns = backend.by_address(&to_checksum(&address, None)).await?;
            format.print(&CampaignList::new(campaigns, now))?;
        }
    }
    Ok(())
}
