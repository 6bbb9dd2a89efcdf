use serde::{Deserialize, Serialize};

use crate::domain::types::{CampaignId, ContactId};

#[derive(Debug, Deserialize)]
pub struct UnsubscribeQuery {
    pub token: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UnsubscribeOutcome {
    pub contact_id: ContactId,
    pub campaign_id: Option<CampaignId>,
    /// False when the contact had already unsubscribed.
    pub changed: bool,
}
