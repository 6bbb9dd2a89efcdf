use serde::{Deserialize, Serialize};

use crate::domain::campaign::Campaign;
use crate::domain::contact::Contact;
use crate::domain::types::CampaignStatus;
use crate::dto::analytics::CampaignAnalyticsView;
use crate::pagination::Paginated;

#[derive(Debug, Default, Deserialize)]
pub struct CampaignsQuery {
    pub status: Option<CampaignStatus>,
    pub page: Option<usize>,
}

/// Resolved recipients of a campaign.
#[derive(Debug, Serialize)]
pub struct AudiencePreview {
    /// Number of active contacts the campaign would reach.
    pub count: usize,
    pub contacts: Paginated<Contact>,
}

/// Campaign with its delivery numbers, if it was sent.
#[derive(Debug, Serialize)]
pub struct CampaignReport {
    pub campaign: Campaign,
    pub analytics: Option<CampaignAnalyticsView>,
    /// Active contacts the campaign would reach; absent once it was sent.
    pub audience_size: Option<usize>,
}
