use diesel::prelude::*;

use crate::domain::analytics::{AnalyticsMetric, CampaignAnalytics};
use crate::domain::campaign::Campaign;
use crate::domain::types::{CampaignId, ClientId};
use crate::models::analytics::{
    CampaignAnalytics as DbCampaignAnalytics, NewCampaignAnalytics as DbNewCampaignAnalytics,
};
use crate::models::campaign::Campaign as DbCampaign;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AnalyticsReader, AnalyticsWriter, DieselRepository};
use crate::schema::{campaign_analytics, campaigns};

macro_rules! bump {
    ($conn:expr, $campaign_id:expr, $column:ident) => {
        diesel::update(campaign_analytics::table.find($campaign_id))
            .set((
                campaign_analytics::$column.eq(campaign_analytics::$column + 1),
                campaign_analytics::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute($conn)
    };
}

impl AnalyticsReader for DieselRepository {
    fn get_campaign_analytics(
        &self,
        campaign_id: CampaignId,
    ) -> RepositoryResult<Option<CampaignAnalytics>> {
        let mut conn = self.conn()?;
        let row = campaign_analytics::table
            .find(campaign_id.get())
            .first::<DbCampaignAnalytics>(&mut conn)
            .optional()?;

        Ok(row.map(CampaignAnalytics::try_from).transpose()?)
    }

    fn list_client_analytics(
        &self,
        client_id: ClientId,
    ) -> RepositoryResult<Vec<(Campaign, CampaignAnalytics)>> {
        let mut conn = self.conn()?;
        let rows = campaigns::table
            .inner_join(campaign_analytics::table)
            .filter(campaigns::client_id.eq(client_id.get()))
            .order((campaigns::created_at.desc(), campaigns::id.desc()))
            .select((DbCampaign::as_select(), DbCampaignAnalytics::as_select()))
            .load::<(DbCampaign, DbCampaignAnalytics)>(&mut conn)?;

        rows.into_iter()
            .map(|(campaign, analytics)| -> RepositoryResult<_> {
                Ok((
                    Campaign::try_from(campaign)?,
                    CampaignAnalytics::try_from(analytics)?,
                ))
            })
            .collect()
    }
}

impl AnalyticsWriter for DieselRepository {
    fn start_campaign_analytics(
        &self,
        campaign_id: CampaignId,
        total_recipients: i32,
    ) -> RepositoryResult<CampaignAnalytics> {
        let mut conn = self.conn()?;
        let new_row = DbNewCampaignAnalytics {
            campaign_id: campaign_id.get(),
            total_recipients,
        };
        let row = diesel::insert_into(campaign_analytics::table)
            .values(&new_row)
            .on_conflict(campaign_analytics::campaign_id)
            .do_update()
            .set((
                campaign_analytics::total_recipients.eq(total_recipients),
                campaign_analytics::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result::<DbCampaignAnalytics>(&mut conn)?;

        Ok(CampaignAnalytics::try_from(row)?)
    }

    fn increment_metric(
        &self,
        campaign_id: CampaignId,
        metric: AnalyticsMetric,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let id = campaign_id.get();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            // Events can outrun the send bookkeeping; make sure a row exists.
            diesel::insert_or_ignore_into(campaign_analytics::table)
                .values(&DbNewCampaignAnalytics {
                    campaign_id: id,
                    total_recipients: 0,
                })
                .execute(conn)?;

            let bumped = match metric {
                AnalyticsMetric::Delivered => bump!(conn, id, delivered),
                AnalyticsMetric::Opened => bump!(conn, id, opened),
                AnalyticsMetric::Clicked => bump!(conn, id, clicked),
                AnalyticsMetric::Bounced => bump!(conn, id, bounced),
                AnalyticsMetric::Complained => bump!(conn, id, complained),
                AnalyticsMetric::Unsubscribed => bump!(conn, id, unsubscribed),
            };
            bumped?;
            Ok(())
        })
    }
}
