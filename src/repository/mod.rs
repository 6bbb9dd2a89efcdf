//! Persistence traits and their Diesel implementation.
//!
//! Services depend on the narrow `*Reader`/`*Writer` traits so they can be
//! exercised against [`mock::MockRepository`] in tests, while production code
//! uses [`DieselRepository`].

use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::activity_log::{ActivityLog, NewActivityLog};
use crate::domain::analytics::{AnalyticsMetric, CampaignAnalytics};
use crate::domain::campaign::{Campaign, CampaignDraft, CampaignStatusChange, NewCampaign};
use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::contact::{Contact, NewContact, UpdateContact};
use crate::domain::contact_list::{ContactList, NewContactList, UpdateContactList};
use crate::domain::filter::FilterCriteria;
use crate::domain::template::{NewTemplate, Template, UpdateTemplate};
use crate::domain::types::{
    CampaignId, CampaignStatus, ClientId, ContactId, ContactListId, ContactStatus, EmailAddress,
    TemplateId, UserId,
};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::RepositoryResult;

pub mod activity_log;
pub mod analytics;
pub mod campaign;
pub mod client;
pub mod contact;
pub mod contact_list;
pub mod errors;
pub mod filter;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod template;
pub mod user;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        ((self.page.max(1) - 1) * self.per_page) as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientListQuery {
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl ClientListQuery {
    pub fn new() -> Self {
        Self {
            search: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

impl Default for ClientListQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Query over the contacts of one client.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactQuery {
    pub client_id: ClientId,
    pub search: Option<String>,
    pub status: Option<ContactStatus>,
    pub criteria: Option<FilterCriteria>,
    pub contact_ids: Option<Vec<ContactId>>,
    pub pagination: Option<Pagination>,
}

impl ContactQuery {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            search: None,
            status: None,
            criteria: None,
            contact_ids: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: ContactStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the result to contacts matched by a segment.
    pub fn criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    /// Restricts the result to an explicit set of contacts.
    pub fn contact_ids(mut self, ids: Vec<ContactId>) -> Self {
        self.contact_ids = Some(ids);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignListQuery {
    pub client_id: ClientId,
    pub status: Option<CampaignStatus>,
    pub pagination: Option<Pagination>,
}

impl CampaignListQuery {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            status: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: CampaignStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLogQuery {
    pub client_id: ClientId,
    pub pagination: Option<Pagination>,
}

impl ActivityLogQuery {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            pagination: None,
        }
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait ClientReader {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client>;
    fn delete_client(&self, id: ClientId) -> RepositoryResult<()>;
}

pub trait ContactReader {
    fn get_contact_by_id(
        &self,
        id: ContactId,
        client_id: ClientId,
    ) -> RepositoryResult<Option<Contact>>;
    fn get_contact_by_email(
        &self,
        email: &EmailAddress,
        client_id: ClientId,
    ) -> RepositoryResult<Option<Contact>>;
    fn list_contacts(&self, query: ContactQuery) -> RepositoryResult<(usize, Vec<Contact>)>;
    fn count_contacts(&self, query: ContactQuery) -> RepositoryResult<usize>;
}

pub trait ContactWriter {
    fn create_contact(&self, new_contact: &NewContact) -> RepositoryResult<Contact>;
    /// Inserts contacts, silently skipping emails the client already has.
    fn import_contacts(&self, new_contacts: &[NewContact]) -> RepositoryResult<usize>;
    fn update_contact(
        &self,
        id: ContactId,
        client_id: ClientId,
        updates: &UpdateContact,
    ) -> RepositoryResult<Contact>;
    fn set_contact_status(
        &self,
        id: ContactId,
        status: ContactStatus,
        at: NaiveDateTime,
    ) -> RepositoryResult<Contact>;
    fn delete_contact(&self, id: ContactId, client_id: ClientId) -> RepositoryResult<()>;
}

pub trait ContactListReader {
    fn get_contact_list(
        &self,
        id: ContactListId,
        client_id: ClientId,
    ) -> RepositoryResult<Option<ContactList>>;
    fn list_contact_lists(&self, client_id: ClientId) -> RepositoryResult<Vec<ContactList>>;
}

pub trait ContactListWriter {
    fn create_contact_list(&self, new_list: &NewContactList) -> RepositoryResult<ContactList>;
    fn update_contact_list(
        &self,
        id: ContactListId,
        updates: &UpdateContactList,
    ) -> RepositoryResult<ContactList>;
    fn delete_contact_list(&self, id: ContactListId) -> RepositoryResult<()>;
}

pub trait TemplateReader {
    fn get_template(&self, id: TemplateId) -> RepositoryResult<Option<Template>>;
    /// Shared templates plus those of `client_id`; every template when `None`.
    fn list_templates(&self, client_id: Option<ClientId>) -> RepositoryResult<Vec<Template>>;
}

pub trait TemplateWriter {
    fn create_template(&self, new_template: &NewTemplate) -> RepositoryResult<Template>;
    fn update_template(
        &self,
        id: TemplateId,
        updates: &UpdateTemplate,
    ) -> RepositoryResult<Template>;
    fn delete_template(&self, id: TemplateId) -> RepositoryResult<()>;
}

pub trait CampaignReader {
    fn get_campaign(
        &self,
        id: CampaignId,
        client_id: ClientId,
    ) -> RepositoryResult<Option<Campaign>>;
    fn get_campaign_by_id(&self, id: CampaignId) -> RepositoryResult<Option<Campaign>>;
    fn list_campaigns(&self, query: CampaignListQuery)
    -> RepositoryResult<(usize, Vec<Campaign>)>;
    /// Scheduled campaigns whose send time is at or before `now`.
    fn list_due_campaigns(&self, now: NaiveDateTime) -> RepositoryResult<Vec<Campaign>>;
    /// Number of not yet finished campaigns targeting the list.
    fn count_open_campaigns_for_list(&self, list_id: ContactListId) -> RepositoryResult<usize>;
}

pub trait CampaignWriter {
    fn create_campaign(&self, new_campaign: &NewCampaign) -> RepositoryResult<Campaign>;
    fn update_campaign_draft(
        &self,
        id: CampaignId,
        draft: &CampaignDraft,
    ) -> RepositoryResult<Campaign>;
    /// Applies `change` only while the campaign is still in `from`.
    ///
    /// Returns `None` when the status moved concurrently.
    fn transition_campaign(
        &self,
        id: CampaignId,
        from: CampaignStatus,
        change: &CampaignStatusChange,
    ) -> RepositoryResult<Option<Campaign>>;
    fn delete_campaign(&self, id: CampaignId) -> RepositoryResult<()>;
}

pub trait AnalyticsReader {
    fn get_campaign_analytics(
        &self,
        campaign_id: CampaignId,
    ) -> RepositoryResult<Option<CampaignAnalytics>>;
    /// Campaigns of the client that have analytics, newest first.
    fn list_client_analytics(
        &self,
        client_id: ClientId,
    ) -> RepositoryResult<Vec<(Campaign, CampaignAnalytics)>>;
}

pub trait AnalyticsWriter {
    /// Creates (or resets) the counters for a campaign about to be sent.
    fn start_campaign_analytics(
        &self,
        campaign_id: CampaignId,
        total_recipients: i32,
    ) -> RepositoryResult<CampaignAnalytics>;
    fn increment_metric(
        &self,
        campaign_id: CampaignId,
        metric: AnalyticsMetric,
    ) -> RepositoryResult<()>;
}

pub trait ActivityLogReader {
    fn list_activity(&self, query: ActivityLogQuery)
    -> RepositoryResult<(usize, Vec<ActivityLog>)>;
}

pub trait ActivityLogWriter {
    fn create_activity_log(&self, entry: &NewActivityLog) -> RepositoryResult<ActivityLog>;
}

pub trait UserReader {
    fn get_user(&self, id: &UserId) -> RepositoryResult<Option<User>>;
}

pub trait UserWriter {
    fn upsert_user(&self, user: &NewUser) -> RepositoryResult<User>;
    fn delete_user(&self, id: &UserId) -> RepositoryResult<()>;
}

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}
