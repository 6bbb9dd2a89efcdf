use chrono::{Duration, Utc};
use realty_mailer::domain::analytics::AnalyticsMetric;
use realty_mailer::domain::campaign::{Audience, CampaignDraft, CampaignStatusChange, NewCampaign};
use realty_mailer::domain::client::{Client, NewClient, UpdateClient};
use realty_mailer::domain::contact::{ContactDetails, NewContact, UpdateContact};
use realty_mailer::domain::contact_list::NewContactList;
use realty_mailer::domain::filter::{FilterCondition, FilterCriteria, FilterField, FilterLogic, FilterOperator};
use realty_mailer::domain::types::{
    CampaignName, CampaignStatus, ClientId, ClientName, ContactStatus, EmailAddress, ListName,
    SenderName, Tags, UserId,
};
use realty_mailer::repository::errors::RepositoryError;
use realty_mailer::repository::{
    AnalyticsReader, AnalyticsWriter, CampaignReader, CampaignWriter, ClientListQuery,
    ClientReader, ClientWriter, ContactListWriter, ContactQuery, ContactReader, ContactWriter,
    DieselRepository,
};

mod common;

fn create_client(repo: &DieselRepository, name: &str, email: &str) -> Client {
    repo.create_client(&NewClient::new(
        ClientName::new(name).unwrap(),
        EmailAddress::new(email).unwrap(),
        None,
        None,
    ))
    .unwrap()
}

fn new_contact(client_id: ClientId, email: &str, city: &str, tags: &str) -> NewContact {
    NewContact::new(
        client_id,
        EmailAddress::new(email).unwrap(),
        ContactDetails::new("", "", None, city, "", Tags::parse(tags), ""),
    )
}

fn draft(audience: Audience) -> CampaignDraft {
    CampaignDraft {
        template_id: None,
        name: CampaignName::new("Spring listings").unwrap(),
        subject: "New homes".into(),
        preview_text: String::new(),
        from_name: SenderName::new("Realty").unwrap(),
        from_email: EmailAddress::new("agent@realty.test").unwrap(),
        reply_to: None,
        html_content: "<p>Hello</p>".into(),
        design_json: None,
        audience,
    }
}

#[test]
fn test_client_repository_crud() {
    let test_db = common::TestDb::new("test_client_repository_crud.db");
    let repo = DieselRepository::new(test_db.pool());

    let alice = create_client(&repo, "Alice Homes", "alice@example.com");
    let bob = create_client(&repo, "Bob Realty", "bob@example.com");

    let (total, items) = repo.list_clients(ClientListQuery::new()).unwrap();
    assert_eq!(total, 2);
    assert_eq!(items.len(), 2);

    let (search_total, search_items) = repo
        .list_clients(ClientListQuery::new().search("Bob"))
        .unwrap();
    assert_eq!(search_total, 1);
    assert_eq!(search_items[0].id, bob.id);

    let updates = UpdateClient {
        name: ClientName::new("Bobby Realty").unwrap(),
        email: bob.email.clone(),
        phone: None,
        company: Some("Bobby LLC".into()),
    };
    let updated = repo.update_client(bob.id, &updates).unwrap();
    assert_eq!(updated.name.as_str(), "Bobby Realty");
    assert_eq!(updated.company.as_deref(), Some("Bobby LLC"));

    repo.delete_client(alice.id).unwrap();
    assert!(repo.get_client_by_id(alice.id).unwrap().is_none());
    assert!(matches!(
        repo.delete_client(alice.id),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_contact_email_is_unique_per_client() {
    let test_db = common::TestDb::new("test_contact_email_is_unique_per_client.db");
    let repo = DieselRepository::new(test_db.pool());
    let first = create_client(&repo, "First", "first@example.com");
    let second = create_client(&repo, "Second", "second@example.com");

    repo.create_contact(&new_contact(first.id, "buyer@example.com", "Austin", ""))
        .unwrap();
    let duplicate = repo.create_contact(&new_contact(first.id, "buyer@example.com", "Dallas", ""));
    assert!(matches!(
        duplicate,
        Err(RepositoryError::ConstraintViolation(_))
    ));

    // The same address may belong to another client.
    repo.create_contact(&new_contact(second.id, "buyer@example.com", "Austin", ""))
        .unwrap();

    let found = repo
        .get_contact_by_email(&EmailAddress::new("BUYER@example.com").unwrap(), first.id)
        .unwrap()
        .unwrap();
    assert_eq!(found.client_id, first.id);
    assert_eq!(found.status, ContactStatus::Active);
}

#[test]
fn test_import_skips_existing_emails() {
    let test_db = common::TestDb::new("test_import_skips_existing_emails.db");
    let repo = DieselRepository::new(test_db.pool());
    let client = create_client(&repo, "Importer", "importer@example.com");

    repo.create_contact(&new_contact(client.id, "old@example.com", "Austin", ""))
        .unwrap();

    let inserted = repo
        .import_contacts(&[
            new_contact(client.id, "old@example.com", "Austin", ""),
            new_contact(client.id, "new1@example.com", "Austin", ""),
            new_contact(client.id, "new2@example.com", "Austin", ""),
        ])
        .unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(repo.count_contacts(ContactQuery::new(client.id)).unwrap(), 3);
}

#[test]
fn test_contact_segments_only_match_active_contacts_of_the_client() {
    let test_db = common::TestDb::new("test_contact_segments.db");
    let repo = DieselRepository::new(test_db.pool());
    let client = create_client(&repo, "Segments", "segments@example.com");
    let other = create_client(&repo, "Other", "other@example.com");

    let buyer = repo
        .create_contact(&new_contact(client.id, "buyer@example.com", "Austin", "buyer,luxury"))
        .unwrap();
    let seller = repo
        .create_contact(&new_contact(client.id, "seller@example.com", "Austin", "seller"))
        .unwrap();
    repo.create_contact(&new_contact(client.id, "dallas@example.com", "Dallas", "buyer"))
        .unwrap();
    repo.create_contact(&new_contact(other.id, "foreign@example.com", "Austin", "buyer"))
        .unwrap();

    repo.set_contact_status(seller.id, ContactStatus::Unsubscribed, Utc::now().naive_utc())
        .unwrap();

    let criteria = FilterCriteria::new(
        FilterLogic::And,
        vec![FilterCondition::new(FilterField::City, FilterOperator::Equals, "Austin")],
    );
    let (total, items) = repo
        .list_contacts(
            ContactQuery::new(client.id)
                .status(ContactStatus::Active)
                .criteria(criteria),
        )
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, buyer.id);

    let tagged = FilterCriteria::new(
        FilterLogic::Or,
        vec![FilterCondition::new(FilterField::Tags, FilterOperator::Contains, "luxury")],
    );
    let (total, _) = repo
        .list_contacts(ContactQuery::new(client.id).criteria(tagged))
        .unwrap();
    assert_eq!(total, 1);

    let unsubscribed = repo.get_contact_by_id(seller.id, client.id).unwrap().unwrap();
    assert_eq!(unsubscribed.status, ContactStatus::Unsubscribed);
    assert!(unsubscribed.unsubscribed_at.is_some());

    let reactivated = repo
        .update_contact(
            seller.id,
            client.id,
            &UpdateContact {
                email: seller.email.clone(),
                details: ContactDetails::default(),
                status: ContactStatus::Active,
            },
        )
        .unwrap();
    assert_eq!(reactivated.status, ContactStatus::Active);
}

#[test]
fn test_search_treats_wildcards_literally() {
    let test_db = common::TestDb::new("test_search_treats_wildcards_literally.db");
    let repo = DieselRepository::new(test_db.pool());
    let client = create_client(&repo, "Search", "search@example.com");

    repo.create_contact(&new_contact(client.id, "a@example.com", "Austin", ""))
        .unwrap();
    repo.create_contact(&new_contact(client.id, "b@example.com", "100% Town", ""))
        .unwrap();

    let (total, items) = repo
        .list_contacts(ContactQuery::new(client.id).search("%"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].city, "100% Town");
}

#[test]
fn test_campaign_transition_is_compare_and_set() {
    let test_db = common::TestDb::new("test_campaign_transition.db");
    let repo = DieselRepository::new(test_db.pool());
    let client = create_client(&repo, "Campaigns", "campaigns@example.com");

    let campaign = repo
        .create_campaign(&NewCampaign {
            client_id: client.id,
            created_by: UserId::new("auth0|admin").unwrap(),
            draft: draft(Audience::All),
        })
        .unwrap();
    assert_eq!(campaign.status, CampaignStatus::Draft);

    let change = CampaignStatusChange::from_campaign(&campaign, CampaignStatus::PendingApproval);
    let submitted = repo
        .transition_campaign(campaign.id, CampaignStatus::Draft, &change)
        .unwrap()
        .unwrap();
    assert_eq!(submitted.status, CampaignStatus::PendingApproval);

    // A second writer still expecting a draft loses the race.
    let stale = repo
        .transition_campaign(campaign.id, CampaignStatus::Draft, &change)
        .unwrap();
    assert!(stale.is_none());

    let now = Utc::now().naive_utc();
    let mut schedule = CampaignStatusChange::from_campaign(&submitted, CampaignStatus::Scheduled);
    schedule.scheduled_at = Some(now - Duration::minutes(5));
    repo.transition_campaign(campaign.id, CampaignStatus::PendingApproval, &schedule)
        .unwrap()
        .unwrap();

    let due = repo.list_due_campaigns(now).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, campaign.id);
    assert!(repo.list_due_campaigns(now - Duration::hours(1)).unwrap().is_empty());
}

#[test]
fn test_open_campaigns_block_list_usage() {
    let test_db = common::TestDb::new("test_open_campaigns_block_list_usage.db");
    let repo = DieselRepository::new(test_db.pool());
    let client = create_client(&repo, "Lists", "lists@example.com");

    let list = repo
        .create_contact_list(&NewContactList::new(
            client.id,
            ListName::new("Austin buyers").unwrap(),
            "",
            FilterCriteria::default(),
        ))
        .unwrap();

    let campaign = repo
        .create_campaign(&NewCampaign {
            client_id: client.id,
            created_by: UserId::new("auth0|admin").unwrap(),
            draft: draft(Audience::List { list_id: list.id }),
        })
        .unwrap();
    assert_eq!(campaign.audience, Audience::List { list_id: list.id });
    assert_eq!(repo.count_open_campaigns_for_list(list.id).unwrap(), 1);

    let cancel = CampaignStatusChange::from_campaign(&campaign, CampaignStatus::Cancelled);
    repo.transition_campaign(campaign.id, CampaignStatus::Draft, &cancel)
        .unwrap()
        .unwrap();
    assert_eq!(repo.count_open_campaigns_for_list(list.id).unwrap(), 0);

    repo.delete_contact_list(list.id).unwrap();
    let orphaned = repo.get_campaign_by_id(campaign.id).unwrap().unwrap();
    assert!(orphaned.audience.list_id().is_none());
}

#[test]
fn test_analytics_counters() {
    let test_db = common::TestDb::new("test_analytics_counters.db");
    let repo = DieselRepository::new(test_db.pool());
    let client = create_client(&repo, "Analytics", "analytics@example.com");

    let campaign = repo
        .create_campaign(&NewCampaign {
            client_id: client.id,
            created_by: UserId::new("auth0|admin").unwrap(),
            draft: draft(Audience::All),
        })
        .unwrap();

    assert!(repo.get_campaign_analytics(campaign.id).unwrap().is_none());
    repo.start_campaign_analytics(campaign.id, 3).unwrap();

    repo.increment_metric(campaign.id, AnalyticsMetric::Delivered)
        .unwrap();
    repo.increment_metric(campaign.id, AnalyticsMetric::Delivered)
        .unwrap();
    repo.increment_metric(campaign.id, AnalyticsMetric::Opened)
        .unwrap();

    let analytics = repo.get_campaign_analytics(campaign.id).unwrap().unwrap();
    assert_eq!(analytics.counters.total_recipients, 3);
    assert_eq!(analytics.counters.delivered, 2);
    assert_eq!(analytics.counters.opened, 1);
    assert_eq!(analytics.counters.open_rate(), 0.5);

    let by_client = repo.list_client_analytics(client.id).unwrap();
    assert_eq!(by_client.len(), 1);
    assert_eq!(by_client[0].0.id, campaign.id);
}
