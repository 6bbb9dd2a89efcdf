//! Diesel models for per-campaign delivery counters.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::analytics::{AnalyticsCounters, CampaignAnalytics as DomainCampaignAnalytics};
use crate::domain::types::{CampaignId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::campaign_analytics)]
#[diesel(primary_key(campaign_id))]
pub struct CampaignAnalytics {
    pub campaign_id: i32,
    pub total_recipients: i32,
    pub delivered: i32,
    pub opened: i32,
    pub clicked: i32,
    pub bounced: i32,
    pub complained: i32,
    pub unsubscribed: i32,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::campaign_analytics)]
pub struct NewCampaignAnalytics {
    pub campaign_id: i32,
    pub total_recipients: i32,
}

impl TryFrom<CampaignAnalytics> for DomainCampaignAnalytics {
    type Error = TypeConstraintError;

    fn try_from(row: CampaignAnalytics) -> Result<Self, Self::Error> {
        Ok(Self {
            campaign_id: CampaignId::try_from(row.campaign_id)?,
            counters: AnalyticsCounters {
                total_recipients: row.total_recipients,
                delivered: row.delivered,
                opened: row.opened,
                clicked: row.clicked,
                bounced: row.bounced,
                complained: row.complained,
                unsubscribed: row.unsubscribed,
            },
            updated_at: row.updated_at,
        })
    }
}
