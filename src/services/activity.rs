use crate::domain::activity_log::ActivityLog;
use crate::domain::types::ClientId;
use crate::dto::PageQuery;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{ActivityLogQuery, ActivityLogReader, UserReader};
use crate::services::ServiceResult;
use crate::services::access::{page_or_first, require_admin};

/// Audit trail of a client, newest first. Admins only.
pub fn list_activity<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    params: PageQuery,
) -> ServiceResult<Paginated<ActivityLog>>
where
    R: UserReader + ActivityLogReader + ?Sized,
{
    require_admin(repo, auth)?;
    let page = page_or_first(params.page);

    let query = ActivityLogQuery::new(client_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    let (total, entries) = repo.list_activity(query)?;

    Ok(Paginated::new(entries, total, page, DEFAULT_ITEMS_PER_PAGE))
}
