//! Output formatting

use std::str::FromStr;

use anyhow::Result;
use bountyhub_core::dashboard::truncate_description;
use bountyhub_core::{Campaign, CampaignStatus, VerifiedToken};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use ethers::utils::to_checksum;
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

/// Data that knows how to draw itself as a table
pub trait Render: Serialize {
    fn table(&self) -> String;
}

impl OutputFormat {
    pub fn print<T: Render>(&self, data: &T) -> Result<()> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(data)?),
            OutputFormat::Table => println!("{}", data.table()),
        }
        Ok(())
    }
}

pub fn colored_status(status: CampaignStatus) -> String {
    match status {
        CampaignStatus::Active => status.as_str().green().to_string(),
        CampaignStatus::Upcoming => status.as_str().yellow().to_string(),
        CampaignStatus::Completed => status.as_str().dimmed().to_string(),
    }
}

#[derive(Tabled)]
struct CampaignRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    family: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Budget")]
    budget: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Dates")]
    dates: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl CampaignRow {
    fn new(campaign: &Campaign, now: DateTime<Utc>) -> Self {
        Self {
            id: campaign.id.clone(),
            title: campaign.title.clone(),
            family: campaign.family().label().to_string(),
            status: colored_status(campaign.status_at(now)),
            budget: format!("{}%", campaign.budget_percentage),
            progress: format!("{}%", campaign.progress_at(now)),
            dates: campaign.days_info(now),
            description: truncate_description(&campaign.description, 100),
        }
    }
}

/// Campaign rows evaluated at a fixed instant
#[derive(Serialize)]
#[serde(transparent)]
pub struct CampaignList {
    campaigns: Vec<Campaign>,
    #[serde(skip)]
    now: DateTime<Utc>,
}

impl CampaignList {
    pub fn new(campaigns: Vec<Campaign>, now: DateTime<Utc>) -> Self {
        Self { campaigns, now }
    }
}

impl Render for CampaignList {
    fn table(&self) -> String {
        if self.campaigns.is_empty() {
            return "No campaigns found".dimmed().to_string();
        }
        let rows = self.campaigns.iter().map(|c| CampaignRow::new(c, self.now));
        Table::new(rows).with(Style::rounded()).to_string()
    }
}

#[derive(Tabled)]
struct Field {
    #[tabled(rename = "Field")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn field(name: &'static str, value: impl Into<String>) -> Field {
    Field {
        name,
        value: value.into(),
    }
}

fn fields_table(fields: Vec<Field>) -> String {
    Table::new(fields).with(Style::rounded()).to_string()
}

fn date(d: DateTime<Utc>) -> String {
    d.format("%b %-d, %Y").to_string()
}

/// One campaign with its derived state
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDetail {
    #[serde(flatten)]
    campaign: Campaign,
    status: CampaignStatus,
    progress: u8,
    days_info: String,
}

impl CampaignDetail {
    pub fn new(campaign: Campaign, now: DateTime<Utc>) -> Self {
        Self {
            status: campaign.status_at(now),
            progress: campaign.progress_at(now),
            days_info: campaign.days_info(now),
            campaign,
        }
    }
}

impl Render for CampaignDetail {
    fn table(&self) -> String {
        let c = &self.campaign;
        let mut fields = vec![
            field("ID", c.id.clone()),
            field("Title", c.title.clone()),
            field("Description", c.description.clone()),
            field("Type", c.family().label()),
            field("Status", colored_status(self.status)),
            field("Progress", format!("{}%", self.progress)),
            field("Dates", format!("{} - {}", date(c.campaign_start_date), date(c.campaign_end_date))),
            field("Timeline", self.days_info.clone()),
            field("Budget", format!("{}%", c.budget_percentage)),
            field("Token", c.link.clone()),
        ];
        if let Some(token_id) = &c.token_id {
            fields.push(field("Token ID", token_id.clone()));
        }
        fields.push(field("Split", c.split_address.clone()));
        fields.push(field("Creator", c.creator_address.clone()));
        fields.push(field("Keywords", c.keywords.join(", ")));
        fields_table(fields)
    }
}

impl Render for VerifiedToken {
    fn table(&self) -> String {
        let mut fields = vec![
            field("Type", self.family().label()),
            field("Address", self.token_address()),
        ];
        match self {
            VerifiedToken::Clanker(details) => {
                fields.push(field("Token ID", details.token_id.clone()));
                fields.push(field("LP locker", to_checksum(&details.lp_locker_address, None)));
            }
            VerifiedToken::Zora(coin) => {
                fields.push(field("Name", coin.name.clone()));
                fields.push(field("Symbol", coin.symbol.clone()));
                fields.push(field("Total supply", coin.total_supply.clone()));
                fields.push(field("Holders", coin.unique_holders.to_string()));
                if let Some(cap) = &coin.market_cap {
                    fields.push(field("Market cap", cap.clone()));
                }
                if let Some(volume) = &coin.volume24h {
                    fields.push(field("24h volume", volume.clone()));
                }
            }
        }
        fields_table(fields)
    }
}

/// Result of `link`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResult {
    pub input: String,
    pub token_address: Option<String>,
    pub family: Option<bountyhub_core::TokenFamily>,
}

impl Render for LinkResult {
    fn table(&self) -> String {
        fields_table(vec![
            field("Input", self.input.clone()),
            field(
                "Token address",
                self.token_address.clone().unwrap_or_else(|| "(not recognised)".into()),
            ),
            field(
                "Type",
                self.family.map(|f| f.label().to_string()).unwrap_or_else(|| "-".into()),
            ),
        ])
    }
}

/// Config keys and values, in display order
pub struct Settings(pub Vec<(String, Option<String>)>);

impl Serialize for Settings {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Render for Settings {
    fn table(&self) -> String {
        #[derive(Tabled)]
        struct Row {
            #[tabled(rename = "Key")]
            key: String,
            #[tabled(rename = "Value")]
            value: String,
        }
        let rows = self.0.iter().map(|(key, value)| Row {
            key: key.clone(),
            value: value.clone().unwrap_or_else(|| "(not set)".dimmed().to_string()),
        });
        Table::new(rows).with(Style::rounded()).to_string()
    }
}
