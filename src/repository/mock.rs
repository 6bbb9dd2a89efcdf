//! Mock repository implementations for isolating services in tests.

use chrono::NaiveDateTime;
use mockall::mock;

use crate::domain::activity_log::{ActivityLog, NewActivityLog};
use crate::domain::analytics::{AnalyticsMetric, CampaignAnalytics};
use crate::domain::campaign::{Campaign, CampaignDraft, CampaignStatusChange, NewCampaign};
use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::contact::{Contact, NewContact, UpdateContact};
use crate::domain::contact_list::{ContactList, NewContactList, UpdateContactList};
use crate::domain::template::{NewTemplate, Template, UpdateTemplate};
use crate::domain::types::{
    CampaignId, CampaignStatus, ClientId, ContactId, ContactListId, ContactStatus, EmailAddress,
    TemplateId, UserId,
};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ActivityLogQuery, ActivityLogReader, ActivityLogWriter, AnalyticsReader, AnalyticsWriter,
    CampaignListQuery, CampaignReader, CampaignWriter, ClientListQuery, ClientReader, ClientWriter,
    ContactListReader, ContactListWriter, ContactQuery, ContactReader, ContactWriter,
    TemplateReader, TemplateWriter, UserReader, UserWriter,
};

mock! {
    pub Repository {}

    impl ClientReader for Repository {
        fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
        fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
    }

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
        fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client>;
        fn delete_client(&self, id: ClientId) -> RepositoryResult<()>;
    }

    impl ContactReader for Repository {
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

    impl ContactWriter for Repository {
        fn create_contact(&self, new_contact: &NewContact) -> RepositoryResult<Contact>;
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

    impl ContactListReader for Repository {
        fn get_contact_list(
            &self,
            id: ContactListId,
            client_id: ClientId,
        ) -> RepositoryResult<Option<ContactList>>;
        fn list_contact_lists(&self, client_id: ClientId) -> RepositoryResult<Vec<ContactList>>;
    }

    impl ContactListWriter for Repository {
        fn create_contact_list(&self, new_list: &NewContactList) -> RepositoryResult<ContactList>;
        fn update_contact_list(
            &self,
            id: ContactListId,
            updates: &UpdateContactList,
        ) -> RepositoryResult<ContactList>;
        fn delete_contact_list(&self, id: ContactListId) -> RepositoryResult<()>;
    }

    impl TemplateReader for Repository {
        fn get_template(&self, id: TemplateId) -> RepositoryResult<Option<Template>>;
        fn list_templates(&self, client_id: Option<ClientId>) -> RepositoryResult<Vec<Template>>;
    }

    impl TemplateWriter for Repository {
        fn create_template(&self, new_template: &NewTemplate) -> RepositoryResult<Template>;
        fn update_template(
            &self,
            id: TemplateId,
            updates: &UpdateTemplate,
        ) -> RepositoryResult<Template>;
        fn delete_template(&self, id: TemplateId) -> RepositoryResult<()>;
    }

    impl CampaignReader for Repository {
        fn get_campaign(
            &self,
            id: CampaignId,
            client_id: ClientId,
        ) -> RepositoryResult<Option<Campaign>>;
        fn get_campaign_by_id(&self, id: CampaignId) -> RepositoryResult<Option<Campaign>>;
        fn list_campaigns(
            &self,
            query: CampaignListQuery,
        ) -> RepositoryResult<(usize, Vec<Campaign>)>;
        fn list_due_campaigns(&self, now: NaiveDateTime) -> RepositoryResult<Vec<Campaign>>;
        fn count_open_campaigns_for_list(&self, list_id: ContactListId) -> RepositoryResult<usize>;
    }

    impl CampaignWriter for Repository {
        fn create_campaign(&self, new_campaign: &NewCampaign) -> RepositoryResult<Campaign>;
        fn update_campaign_draft(
            &self,
            id: CampaignId,
            draft: &CampaignDraft,
        ) -> RepositoryResult<Campaign>;
        fn transition_campaign(
            &self,
            id: CampaignId,
            from: CampaignStatus,
            change: &CampaignStatusChange,
        ) -> RepositoryResult<Option<Campaign>>;
        fn delete_campaign(&self, id: CampaignId) -> RepositoryResult<()>;
    }

    impl AnalyticsReader for Repository {
        fn get_campaign_analytics(
            &self,
            campaign_id: CampaignId,
        ) -> RepositoryResult<Option<CampaignAnalytics>>;
        fn list_client_analytics(
            &self,
            client_id: ClientId,
        ) -> RepositoryResult<Vec<(Campaign, CampaignAnalytics)>>;
    }

    impl AnalyticsWriter for Repository {
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

    impl ActivityLogReader for Repository {
        fn list_activity(
            &self,
            query: ActivityLogQuery,
        ) -> RepositoryResult<(usize, Vec<ActivityLog>)>;
    }

    impl ActivityLogWriter for Repository {
        fn create_activity_log(&self, entry: &NewActivityLog) -> RepositoryResult<ActivityLog>;
    }

    impl UserReader for Repository {
        fn get_user(&self, id: &UserId) -> RepositoryResult<Option<User>>;
    }

    impl UserWriter for Repository {
        fn upsert_user(&self, user: &NewUser) -> RepositoryResult<User>;
        fn delete_user(&self, id: &UserId) -> RepositoryResult<()>;
    }
}
