use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::campaign::{Campaign, CampaignDraft, CampaignStatusChange, NewCampaign};
use crate::domain::types::{CampaignId, CampaignStatus, ClientId, ContactListId};
use crate::models::campaign::{
    Campaign as DbCampaign, CampaignDraftColumns, NewCampaign as DbNewCampaign,
    UpdateCampaignStatus,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CampaignListQuery, CampaignReader, CampaignWriter, DieselRepository};
use crate::schema::campaigns;

/// Statuses after which a campaign no longer needs its audience.
const CLOSED_STATUSES: [CampaignStatus; 3] = [
    CampaignStatus::Sent,
    CampaignStatus::Failed,
    CampaignStatus::Cancelled,
];

fn campaigns_query(query: &CampaignListQuery) -> campaigns::BoxedQuery<'static, Sqlite> {
    let mut items = campaigns::table
        .filter(campaigns::client_id.eq(query.client_id.get()))
        .into_boxed();
    if let Some(status) = query.status {
        items = items.filter(campaigns::status.eq(status.as_str()));
    }
    items
}

fn into_domain(rows: Vec<DbCampaign>) -> RepositoryResult<Vec<Campaign>> {
    Ok(rows
        .into_iter()
        .map(Campaign::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

impl CampaignReader for DieselRepository {
    fn get_campaign(
        &self,
        id: CampaignId,
        client_id: ClientId,
    ) -> RepositoryResult<Option<Campaign>> {
        let mut conn = self.conn()?;
        let campaign = campaigns::table
            .filter(campaigns::id.eq(id.get()))
            .filter(campaigns::client_id.eq(client_id.get()))
            .first::<DbCampaign>(&mut conn)
            .optional()?;

        Ok(campaign.map(Campaign::try_from).transpose()?)
    }

    fn get_campaign_by_id(&self, id: CampaignId) -> RepositoryResult<Option<Campaign>> {
        let mut conn = self.conn()?;
        let campaign = campaigns::table
            .find(id.get())
            .first::<DbCampaign>(&mut conn)
            .optional()?;

        Ok(campaign.map(Campaign::try_from).transpose()?)
    }

    fn list_campaigns(
        &self,
        query: CampaignListQuery,
    ) -> RepositoryResult<(usize, Vec<Campaign>)> {
        let mut conn = self.conn()?;

        let total = campaigns_query(&query).count().get_result::<i64>(&mut conn)?;

        let mut items = campaigns_query(&query)
            .order((campaigns::created_at.desc(), campaigns::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let items = into_domain(items.load::<DbCampaign>(&mut conn)?)?;

        Ok((total as usize, items))
    }

    fn list_due_campaigns(&self, now: NaiveDateTime) -> RepositoryResult<Vec<Campaign>> {
        let mut conn = self.conn()?;
        let rows = campaigns::table
            .filter(campaigns::status.eq(CampaignStatus::Scheduled.as_str()))
            .filter(campaigns::scheduled_at.le(now))
            .order(campaigns::scheduled_at.asc())
            .load::<DbCampaign>(&mut conn)?;

        into_domain(rows)
    }

    fn count_open_campaigns_for_list(&self, list_id: ContactListId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let closed: Vec<&str> = CLOSED_STATUSES.iter().map(|s| s.as_str()).collect();
        let total = campaigns::table
            .filter(campaigns::contact_list_id.eq(list_id.get()))
            .filter(campaigns::status.ne_all(closed))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total as usize)
    }
}

impl CampaignWriter for DieselRepository {
    fn create_campaign(&self, new_campaign: &NewCampaign) -> RepositoryResult<Campaign> {
        let mut conn = self.conn()?;
        let insertable = DbNewCampaign::from(new_campaign);
        let created = diesel::insert_into(campaigns::table)
            .values(&insertable)
            .get_result::<DbCampaign>(&mut conn)?;

        Ok(Campaign::try_from(created)?)
    }

    fn update_campaign_draft(
        &self,
        id: CampaignId,
        draft: &CampaignDraft,
    ) -> RepositoryResult<Campaign> {
        let mut conn = self.conn()?;
        let columns = CampaignDraftColumns::from(draft);
        let updated = diesel::update(campaigns::table.find(id.get()))
            .set((
                &columns,
                campaigns::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result::<DbCampaign>(&mut conn)?;

        Ok(Campaign::try_from(updated)?)
    }

    fn transition_campaign(
        &self,
        id: CampaignId,
        from: CampaignStatus,
        change: &CampaignStatusChange,
    ) -> RepositoryResult<Option<Campaign>> {
        let mut conn = self.conn()?;
        let changes = UpdateCampaignStatus::from(change);
        let updated = diesel::update(
            campaigns::table
                .filter(campaigns::id.eq(id.get()))
                .filter(campaigns::status.eq(from.as_str())),
        )
        .set(&changes)
        .get_result::<DbCampaign>(&mut conn)
        .optional()?;

        Ok(updated.map(Campaign::try_from).transpose()?)
    }

    fn delete_campaign(&self, id: CampaignId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(campaigns::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
