use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::activity_log::{ActivityLog, NewActivityLog};
use crate::models::activity_log::{
    ActivityLog as DbActivityLog, NewActivityLog as DbNewActivityLog,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{ActivityLogQuery, ActivityLogReader, ActivityLogWriter, DieselRepository};
use crate::schema::activity_logs;

fn activity_query(query: &ActivityLogQuery) -> activity_logs::BoxedQuery<'static, Sqlite> {
    activity_logs::table
        .filter(activity_logs::client_id.eq(query.client_id.get()))
        .into_boxed()
}

impl ActivityLogReader for DieselRepository {
    fn list_activity(
        &self,
        query: ActivityLogQuery,
    ) -> RepositoryResult<(usize, Vec<ActivityLog>)> {
        let mut conn = self.conn()?;

        let total = activity_query(&query).count().get_result::<i64>(&mut conn)?;

        let mut items = activity_query(&query)
            .order((activity_logs::created_at.desc(), activity_logs::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let items = items
            .load::<DbActivityLog>(&mut conn)?
            .into_iter()
            .map(ActivityLog::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, items))
    }
}

impl ActivityLogWriter for DieselRepository {
    fn create_activity_log(&self, entry: &NewActivityLog) -> RepositoryResult<ActivityLog> {
        let mut conn = self.conn()?;
        let insertable = DbNewActivityLog::from(entry);
        let created = diesel::insert_into(activity_logs::table)
            .values(&insertable)
            .get_result::<DbActivityLog>(&mut conn)?;

        Ok(ActivityLog::try_from(created)?)
    }
}
