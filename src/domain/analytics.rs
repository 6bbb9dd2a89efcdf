//! Delivery counters collected per campaign.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::CampaignId;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyticsCounters {
    pub total_recipients: i32,
    pub delivered: i32,
    pub opened: i32,
    pub clicked: i32,
    pub bounced: i32,
    pub complained: i32,
    pub unsubscribed: i32,
}

impl AnalyticsCounters {
    fn rate(part: i32, whole: i32) -> f64 {
        if whole <= 0 {
            0.0
        } else {
            f64::from(part) / f64::from(whole)
        }
    }

    pub fn open_rate(&self) -> f64 {
        Self::rate(self.opened, self.delivered)
    }

    pub fn click_rate(&self) -> f64 {
        Self::rate(self.clicked, self.delivered)
    }

    pub fn bounce_rate(&self) -> f64 {
        Self::rate(self.bounced, self.total_recipients)
    }

    pub fn unsubscribe_rate(&self) -> f64 {
        Self::rate(self.unsubscribed, self.delivered)
    }

    /// Adds another campaign's counters to this total.
    pub fn accumulate(&mut self, other: &AnalyticsCounters) {
        self.total_recipients += other.total_recipients;
        self.delivered += other.delivered;
        self.opened += other.opened;
        self.clicked += other.clicked;
        self.bounced += other.bounced;
        self.complained += other.complained;
        self.unsubscribed += other.unsubscribed;
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CampaignAnalytics {
    pub campaign_id: CampaignId,
    pub counters: AnalyticsCounters,
    pub updated_at: NaiveDateTime,
}

/// Counter bumped by a single delivery event.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsMetric {
    Delivered,
    Opened,
    Clicked,
    Bounced,
    Complained,
    Unsubscribed,
}
