use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::analytics::{AnalyticsCounters, CampaignAnalytics};
use crate::domain::campaign::Campaign;
use crate::domain::types::{CampaignId, CampaignName, CampaignStatus};

/// Delivery rates derived from a set of counters.
#[derive(Debug, Serialize, PartialEq)]
pub struct Rates {
    pub open_rate: f64,
    pub click_rate: f64,
    pub bounce_rate: f64,
    pub unsubscribe_rate: f64,
}

impl From<&AnalyticsCounters> for Rates {
    fn from(counters: &AnalyticsCounters) -> Self {
        Self {
            open_rate: counters.open_rate(),
            click_rate: counters.click_rate(),
            bounce_rate: counters.bounce_rate(),
            unsubscribe_rate: counters.unsubscribe_rate(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CampaignAnalyticsView {
    pub campaign_id: CampaignId,
    #[serde(flatten)]
    pub counters: AnalyticsCounters,
    #[serde(flatten)]
    pub rates: Rates,
    pub updated_at: NaiveDateTime,
}

impl From<CampaignAnalytics> for CampaignAnalyticsView {
    fn from(analytics: CampaignAnalytics) -> Self {
        Self {
            campaign_id: analytics.campaign_id,
            rates: Rates::from(&analytics.counters),
            counters: analytics.counters,
            updated_at: analytics.updated_at,
        }
    }
}

/// One campaign row of the client dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardCampaign {
    pub id: CampaignId,
    pub name: CampaignName,
    pub status: CampaignStatus,
    pub sent_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub counters: AnalyticsCounters,
    #[serde(flatten)]
    pub rates: Rates,
}

impl From<(Campaign, CampaignAnalytics)> for DashboardCampaign {
    fn from((campaign, analytics): (Campaign, CampaignAnalytics)) -> Self {
        Self {
            id: campaign.id,
            name: campaign.name,
            status: campaign.status,
            sent_at: campaign.sent_at,
            rates: Rates::from(&analytics.counters),
            counters: analytics.counters,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
    /// Campaigns that finished sending.
    pub campaigns_sent: usize,
    pub totals: AnalyticsCounters,
    pub rates: Rates,
    pub campaigns: Vec<DashboardCampaign>,
}
