//! Campaign records and derived state

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Token family a campaign is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenFamily {
    /// Clanker ERC-20 with an LP locker
    Clanker,
    /// Zora coin
    Zora,
}

impl TokenFamily {
    /// Display name
    pub fn label(&self) -> &'static str {
        match self {
            TokenFamily::Clanker => "Clanker",
            TokenFamily::Zora => "Zora",
        }
    }

    /// Family flag as stored by the backend
    pub fn is_zora(&self) -> bool {
        matches!(self, TokenFamily::Zora)
    }
}

impl fmt::Display for TokenFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TokenFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clanker" => Ok(TokenFamily::Clanker),
            "zora" => Ok(TokenFamily::Zora),
            other => Err(format!("unknown token family: {}", other)),
        }
    }
}

/// Campaign as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    /// Link target hash (Clanker campaigns)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub creator_address: String,
    #[serde(default)]
    pub token_id: Option<String>,
    pub link: String,
    pub is_zora: bool,
    /// Protocol share of the split, 0-100
    #[serde(deserialize_with = "de_percentage")]
    pub budget_percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_keyword: Option<String>,
    pub split_address: String,
    pub campaign_start_date: DateTime<Utc>,
    pub campaign_end_date: DateTime<Utc>,
    #[serde(default)]
    pub is_finalized: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Campaign {
    /// Token family of this campaign
    pub fn family(&self) -> TokenFamily {
        if self.is_zora {
            TokenFamily::Zora
        } else {
            TokenFamily::Clanker
        }
    }

    /// Status at `now`
    pub fn status_at(&self, now: DateTime<Utc>) -> CampaignStatus {
        CampaignStatus::derive(
            now,
            self.campaign_start_date,
            self.campaign_end_date,
            self.is_finalized,
        )
    }

    /// Elapsed share of the campaign window, 0-100
    pub fn progress_at(&self, now: DateTime<Utc>) -> u8 {
        progress(
            self.status_at(now),
            now,
            self.campaign_start_date,
            self.campaign_end_date,
        )
    }

    /// "Starts in 3 days", "1 day remaining", "Ended 2 days ago"
    pub fn days_info(&self, now: DateTime<Utc>) -> String {
        match self.status_at(now) {
            CampaignStatus::Upcoming => {
                let n = ceil_days(self.campaign_start_date - now);
                format!("Starts in {} day{}", n, plural(n))
            }
            CampaignStatus::Active => {
                let n = ceil_days(self.campaign_end_date - now);
                format!("{} day{} remaining", n, plural(n))
            }
            CampaignStatus::Completed => {
                let n = ceil_days(now - self.campaign_end_date);
                format!("Ended {} day{} ago", n, plural(n))
            }
        }
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn ceil_days(delta: chrono::Duration) -> i64 {
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    let ms = delta.num_milliseconds();
    ms.div_euclid(DAY_MS) + i64::from(ms.rem_euclid(DAY_MS) != 0)
}

/// Accepts `"50"` or `50`
fn de_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Float(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Num(n) => n,
        Raw::Float(f) if f >= 0.0 => f.trunc() as u64,
        Raw::Float(f) => {
            return Err(serde::de::Error::custom(format!("negative percentage: {}", f)))
        }
        Raw::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid percentage {:?}: {}", s, e)))?,
    };
    if value > 100 {
        return Err(serde::de::Error::custom(format!(
            "percentage out of range: {}",
            value
        )));
    }
    Ok(value as u8)
}

/// Body of `POST /create/bounty`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    /// EIP-55 checksummed
    pub creator_address: String,
    /// `None` for Zora campaigns
    pub token_id: Option<String>,
    pub link: String,
    pub is_zora: bool,
    pub split_address: String,
    pub budget_percentage: u8,
    pub campaign_start_date: DateTime<Utc>,
    pub campaign_end_date: DateTime<Utc>,
    pub keywords: Vec<String>,
}

/// Derived campaign status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Before the start date
    Upcoming,
    /// Inside the campaign window
    Active,
    /// Past the end date, or finalized
    Completed,
}

impl CampaignStatus {
    /// Status as a pure function of the clock, the window and the finalized flag.
    ///
    /// Finalized campaigns are completed regardless of dates. The window is
    /// inclusive at both ends.
    pub fn derive(
        now: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        finalized: bool,
    ) -> Self {
        if finalized {
            CampaignStatus::Completed
        } else if now < start {
            CampaignStatus::Upcoming
        } else if now <= end {
            CampaignStatus::Active
        } else {
            CampaignStatus::Completed
        }
    }

    /// Lowercase name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Upcoming => "upcoming",
            CampaignStatus::Active => "active",
            CampaignStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upcoming" => Ok(CampaignStatus::Upcoming),
            "active" => Ok(CampaignStatus::Active),
            "completed" => Ok(CampaignStatus::Completed),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// Progress percentage for a campaign in `status`.
///
/// Only active campaigns make progress: `floor(elapsed / total * 100)`
/// clamped to 0..=100. A zero-length window counts as done.
pub fn progress(
    status: CampaignStatus,
    now: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> u8 {
    if status != CampaignStatus::Active {
        return 0;
    }
    let total = (end - start).num_milliseconds();
    if total <= 0 {
        return 100;
    }
    let elapsed = (now - start).num_milliseconds();
    let pct = (elapsed as i128 * 100).div_euclid(total as i128);
    pct.clamp(0, 100) as u8
}
