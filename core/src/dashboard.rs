//! Campaign list views: search, sort and status buckets

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::campaign::{Campaign, CampaignStatus};

/// List ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest start date first
    #[default]
    DateDesc,
    DateAsc,
    /// Largest budget first
    BudgetDesc,
    BudgetAsc,
    /// Alphabetical, case-insensitive
    TitleAsc,
    TitleDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::DateDesc,
        SortOrder::DateAsc,
        SortOrder::BudgetDesc,
        SortOrder::BudgetAsc,
        SortOrder::TitleAsc,
        SortOrder::TitleDesc,
    ];

    /// Name accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::DateDesc => "date-desc",
            SortOrder::DateAsc => "date-asc",
            SortOrder::BudgetDesc => "budget-desc",
            SortOrder::BudgetAsc => "budget-asc",
            SortOrder::TitleAsc => "title-asc",
            SortOrder::TitleDesc => "title-desc",
        }
    }

    fn compare(&self, a: &Campaign, b: &Campaign) -> Ordering {
        match self {
            SortOrder::DateDesc => b.campaign_start_date.cmp(&a.campaign_start_date),
            SortOrder::DateAsc => a.campaign_start_date.cmp(&b.campaign_start_date),
            SortOrder::BudgetDesc => b.budget_percentage.cmp(&a.budget_percentage),
            SortOrder::BudgetAsc => a.budget_percentage.cmp(&b.budget_percentage),
            SortOrder::TitleAsc => title_cmp(a, b),
            SortOrder::TitleDesc => title_cmp(b, a),
        }
    }
}

fn title_cmp(a: &Campaign, b: &Campaign) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .iter()
            .copied()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| format!("unknown sort order: {}", s))
    }
}

/// Case-insensitive match on title, description or any keyword.
/// An empty query matches everything.
pub fn matches_query(campaign: &Campaign, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    campaign.title.to_lowercase().contains(&query)
        || campaign.description.to_lowercase().contains(&query)
        || campaign
            .keywords
            .iter()
            .any(|k| k.to_lowercase().contains(&query))
}

/// Filter by `query`, then sort (stable)
pub fn search_and_sort(campaigns: &[Campaign], query: &str, order: SortOrder) -> Vec<Campaign> {
    let mut list: Vec<Campaign> = campaigns
        .iter()
        .filter(|c| matches_query(c, query))
        .cloned()
        .collect();
    list.sort_by(|a, b| order.compare(a, b));
    list
}

/// Campaigns bucketed by derived status
#[derive(Debug, Clone, Default, Serialize)]
pub struct Partitioned {
    pub active: Vec<Campaign>,
    pub upcoming: Vec<Campaign>,
    pub completed: Vec<Campaign>,
}

impl Partitioned {
    /// Bucket for `status`
    pub fn get(&self, status: CampaignStatus) -> &[Campaign] {
        match status {
            CampaignStatus::Active => &self.active,
            CampaignStatus::Upcoming => &self.upcoming,
            CampaignStatus::Completed => &self.completed,
        }
    }

    pub fn total(&self) -> usize {
        self.active.len() + self.upcoming.len() + self.completed.len()
    }
}

/// Split campaigns by status at `now`. Each campaign lands in exactly one bucket.
pub fn partition(campaigns: Vec<Campaign>, now: DateTime<Utc>) -> Partitioned {
    let mut out = Partitioned::default();
    for campaign in campaigns {
        match campaign.status_at(now) {
            CampaignStatus::Active => out.active.push(campaign),
            CampaignStatus::Upcoming => out.upcoming.push(campaign),
            CampaignStatus::Completed => out.completed.push(campaign),
        }
    }
    out
}

/// Shorten `text` to `max_len` characters, appending `...` when cut
pub fn truncate_description(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_len).collect();
    out.push_str("...");
    out
}
