use chrono::Utc;

use crate::domain::analytics::{AnalyticsCounters, CampaignAnalytics};
use crate::domain::types::{CampaignId, CampaignStatus, ClientId};
use crate::dto::analytics::{CampaignAnalyticsView, DashboardCampaign, DashboardData, Rates};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{AnalyticsReader, CampaignReader, UserReader};
use crate::services::access::require_client_access;
use crate::services::{ServiceError, ServiceResult};

/// Counters of one campaign; zero until the campaign is sent.
pub fn campaign_analytics<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
) -> ServiceResult<CampaignAnalyticsView>
where
    R: UserReader + CampaignReader + AnalyticsReader + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    let campaign = repo
        .get_campaign(campaign_id, client_id)?
        .ok_or(ServiceError::NotFound)?;

    let analytics = repo
        .get_campaign_analytics(campaign.id)?
        .unwrap_or_else(|| CampaignAnalytics {
            campaign_id: campaign.id,
            counters: AnalyticsCounters::default(),
            updated_at: Utc::now().naive_utc(),
        });
    Ok(CampaignAnalyticsView::from(analytics))
}

/// Totals and per-campaign rates across every sent campaign of the client.
pub fn dashboard<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
) -> ServiceResult<DashboardData>
where
    R: UserReader + AnalyticsReader + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    let rows = repo.list_client_analytics(client_id)?;

    let mut totals = AnalyticsCounters::default();
    let mut campaigns_sent = 0;
    for (campaign, analytics) in &rows {
        totals.accumulate(&analytics.counters);
        if campaign.status == CampaignStatus::Sent {
            campaigns_sent += 1;
        }
    }

    Ok(DashboardData {
        campaigns_sent,
        rates: Rates::from(&totals),
        totals,
        campaigns: rows.into_iter().map(DashboardCampaign::from).collect(),
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::services::access::test_support::*;
    use crate::services::dispatch::tests::campaign;

    fn analytics(id: i32, delivered: i32, opened: i32) -> CampaignAnalytics {
        CampaignAnalytics {
            campaign_id: CampaignId::new(id).unwrap(),
            counters: AnalyticsCounters {
                total_recipients: delivered,
                delivered,
                opened,
                ..AnalyticsCounters::default()
            },
            updated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn dashboard_sums_counters_and_rates() {
        let mut repo = repo_with_users();
        repo.expect_list_client_analytics().returning(|_| {
            Ok(vec![
                (campaign(1, CampaignStatus::Sent), analytics(1, 100, 40)),
                (campaign(2, CampaignStatus::Sending), analytics(2, 100, 10)),
            ])
        });

        let data = dashboard(&repo, &auth("agent"), ClientId::new(1).unwrap()).unwrap();
        assert_eq!(data.campaigns_sent, 1);
        assert_eq!(data.totals.delivered, 200);
        assert_eq!(data.rates.open_rate, 0.25);
        assert_eq!(data.campaigns.len(), 2);
    }

    #[test]
    fn other_clients_dashboards_are_forbidden() {
        let repo = repo_with_users();
        assert!(matches!(
            dashboard(&repo, &auth("agent"), ClientId::new(2).unwrap()),
            Err(ServiceError::Forbidden)
        ));
    }

    #[test]
    fn unsent_campaign_reports_zeroes() {
        let mut repo = repo_with_users();
        repo.expect_get_campaign()
            .returning(|id, _| Ok(Some(campaign(id.get(), CampaignStatus::Draft))));
        repo.expect_get_campaign_analytics().returning(|_| Ok(None));

        let view = campaign_analytics(
            &repo,
            &auth("admin"),
            ClientId::new(1).unwrap(),
            CampaignId::new(4).unwrap(),
        )
        .unwrap();
        assert_eq!(view.counters, AnalyticsCounters::default());
        assert_eq!(view.rates.open_rate, 0.0);
    }
}
