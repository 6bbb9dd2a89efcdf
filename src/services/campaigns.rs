//! Campaign drafting, review and lifecycle actions.
//!
//! Every status change goes through [`CampaignStatus::transition`] and is
//! persisted with a compare-and-set on the previous status, so two
//! concurrent actions on the same campaign cannot both succeed.

use chrono::{NaiveDateTime, Utc};
use serde_json::{Value, json};
use validator::Validate;

use crate::domain::activity_log::EntityType;
use crate::domain::campaign::{
    Audience, Campaign, CampaignAction, CampaignDraft, CampaignStatusChange, NewCampaign,
};
use crate::domain::types::{CampaignId, CampaignStatus, ClientId};
use crate::domain::user::User;
use crate::dto::analytics::CampaignAnalyticsView;
use crate::dto::campaigns::{AudiencePreview, CampaignReport, CampaignsQuery};
use crate::forms::FormError;
use crate::forms::campaigns::{CampaignForm, ReviewForm, ScheduleForm};
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ActivityLogWriter, AnalyticsReader, AnalyticsWriter, CampaignListQuery, CampaignReader,
    CampaignWriter, ContactListReader, ContactReader, TemplateReader, UserReader,
};
use crate::services::access::{
    page_or_first, record_activity, require_admin, require_client_access,
};
use crate::services::audience::{audience_count, audience_query, preview_audience};
use crate::services::dispatch::{EmailDispatcher, send_campaign as dispatch_campaign};
use crate::services::unsubscribe::UnsubscribeTokens;
use crate::services::{ServiceError, ServiceResult};

fn find_campaign<R>(repo: &R, client_id: ClientId, campaign_id: CampaignId) -> ServiceResult<Campaign>
where
    R: CampaignReader + ?Sized,
{
    repo.get_campaign(campaign_id, client_id)?
        .ok_or(ServiceError::NotFound)
}

fn log_campaign<R>(repo: &R, user: &User, campaign: &Campaign, action: &str, details: Value)
where
    R: ActivityLogWriter + ?Sized,
{
    record_activity(
        repo,
        Some(user),
        Some(campaign.client_id),
        action,
        (EntityType::Campaign, Some(campaign.id.get())),
        details,
    );
}

/// Checks the template and list references of a draft and fills empty
/// content from the template.
fn prepare_draft<R>(repo: &R, client_id: ClientId, mut draft: CampaignDraft) -> ServiceResult<CampaignDraft>
where
    R: TemplateReader + ContactListReader + ?Sized,
{
    if let Some(template_id) = draft.template_id {
        let template = repo
            .get_template(template_id)?
            .filter(|t| t.is_available_to(client_id))
            .ok_or_else(|| {
                ServiceError::Form(format!("template {template_id} is not available"))
            })?;
        if draft.subject.is_empty() {
            draft.subject = template.subject;
        }
        if draft.html_content.trim().is_empty() {
            draft.html_content = template.html_content;
            if draft.design_json.is_none() {
                draft.design_json = template.design_json;
            }
        }
    }

    if let Audience::List { list_id } = draft.audience
        && repo.get_contact_list(list_id, client_id)?.is_none()
    {
        return Err(ServiceError::Form(format!(
            "contact list {list_id} does not exist"
        )));
    }
    Ok(draft)
}

/// Applies `action` and persists the resulting status.
///
/// `stamp` adjusts the timestamps carried by the change.
fn apply_action<R>(
    repo: &R,
    campaign: &Campaign,
    action: CampaignAction,
    stamp: impl FnOnce(&mut CampaignStatusChange),
) -> ServiceResult<Campaign>
where
    R: CampaignWriter + ?Sized,
{
    let next = campaign.status.transition(action)?;
    let mut change = CampaignStatusChange::from_campaign(campaign, next);
    stamp(&mut change);

    repo.transition_campaign(campaign.id, campaign.status, &change)?
        .ok_or_else(|| {
            log::warn!("Campaign {} changed status during `{action}`", campaign.id);
            ServiceError::Conflict(format!(
                "campaign changed while trying to {action}, reload and retry"
            ))
        })
}

pub fn list_campaigns<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    params: CampaignsQuery,
) -> ServiceResult<Paginated<Campaign>>
where
    R: UserReader + CampaignReader + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    let page = page_or_first(params.page);

    let mut query = CampaignListQuery::new(client_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(status) = params.status {
        query = query.status(status);
    }
    let (total, campaigns) = repo.list_campaigns(query)?;

    Ok(Paginated::new(campaigns, total, page, DEFAULT_ITEMS_PER_PAGE))
}

pub fn get_campaign<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
) -> ServiceResult<CampaignReport>
where
    R: UserReader
        + CampaignReader
        + AnalyticsReader
        + ContactListReader
        + ContactReader
        + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    let campaign = find_campaign(repo, client_id, campaign_id)?;
    let analytics = repo
        .get_campaign_analytics(campaign_id)?
        .map(CampaignAnalyticsView::from);

    let audience_size = if analytics.is_some() {
        None
    } else {
        match audience_count(repo, client_id, &campaign.audience) {
            Ok(count) => Some(count),
            // The list was deleted or moved; the draft must be fixed first.
            Err(ServiceError::Conflict(_)) => None,
            Err(err) => return Err(err),
        }
    };

    Ok(CampaignReport {
        campaign,
        analytics,
        audience_size,
    })
}

pub fn create_campaign<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    form: &CampaignForm,
) -> ServiceResult<Campaign>
where
    R: UserReader
        + TemplateReader
        + ContactListReader
        + CampaignWriter
        + ActivityLogWriter
        + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let draft = prepare_draft(repo, client_id, form.to_draft()?)?;

    let new_campaign = NewCampaign {
        client_id,
        created_by: user.id.clone(),
        draft,
    };
    let campaign = repo.create_campaign(&new_campaign).map_err(|err| {
        log::error!("Failed to create campaign: {err}");
        err
    })?;

    log_campaign(
        repo,
        &user,
        &campaign,
        "campaign.created",
        json!({ "name": campaign.name, "audience": campaign.audience }),
    );
    Ok(campaign)
}

/// Replaces content and audience of a draft.
pub fn update_campaign<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
    form: &CampaignForm,
) -> ServiceResult<Campaign>
where
    R: UserReader
        + TemplateReader
        + ContactListReader
        + CampaignReader
        + CampaignWriter
        + ActivityLogWriter
        + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let existing = find_campaign(repo, client_id, campaign_id)?;
    if !existing.status.is_editable() {
        return Err(ServiceError::Conflict(format!(
            "only draft campaigns can be edited, this one is {}",
            existing.status
        )));
    }
    let draft = prepare_draft(repo, client_id, form.to_draft()?)?;

    let campaign = repo.update_campaign_draft(campaign_id, &draft)?;

    log_campaign(
        repo,
        &user,
        &campaign,
        "campaign.updated",
        json!({ "name": campaign.name }),
    );
    Ok(campaign)
}

pub fn delete_campaign<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
) -> ServiceResult<()>
where
    R: UserReader + CampaignReader + CampaignWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let campaign = find_campaign(repo, client_id, campaign_id)?;
    if !campaign.status.is_deletable() {
        return Err(ServiceError::Conflict(format!(
            "a {} campaign cannot be deleted",
            campaign.status
        )));
    }

    repo.delete_campaign(campaign_id)?;

    log_campaign(
        repo,
        &user,
        &campaign,
        "campaign.deleted",
        json!({ "name": campaign.name, "status": campaign.status }),
    );
    Ok(())
}

/// Sends a complete draft to the client for approval.
pub fn submit_campaign<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
) -> ServiceResult<Campaign>
where
    R: UserReader
        + CampaignReader
        + CampaignWriter
        + ContactListReader
        + ActivityLogWriter
        + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let campaign = find_campaign(repo, client_id, campaign_id)?;
    campaign.status.transition(CampaignAction::Submit)?;

    let problems = campaign.submission_problems();
    if !problems.is_empty() {
        return Err(ServiceError::Form(problems.join("; ")));
    }
    // A list audience must still point at a list of this client.
    audience_query(repo, client_id, &campaign.audience)?;

    let submitted = apply_action(repo, &campaign, CampaignAction::Submit, |_| {})?;
    log_campaign(repo, &user, &submitted, "campaign.submitted", json!({}));
    Ok(submitted)
}

fn review<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
    form: &ReviewForm,
    action: CampaignAction,
) -> ServiceResult<Campaign>
where
    R: UserReader + CampaignReader + CampaignWriter + ActivityLogWriter + ?Sized,
{
    let user = require_client_access(repo, auth, client_id)?;
    form.validate().map_err(FormError::from)?;
    let campaign = find_campaign(repo, client_id, campaign_id)?;

    let now = Utc::now().naive_utc();
    let reviewed = apply_action(repo, &campaign, action, |change| {
        change.approved_at = match action {
            CampaignAction::Approve => Some(now),
            _ => None,
        };
    })?;

    let activity = match action {
        CampaignAction::Approve => "campaign.approved",
        _ => "campaign.rejected",
    };
    log_campaign(
        repo,
        &user,
        &reviewed,
        activity,
        json!({ "comment": form.comment }),
    );
    Ok(reviewed)
}

/// Approval by an admin or by the client the campaign belongs to.
pub fn approve_campaign<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
    form: &ReviewForm,
) -> ServiceResult<Campaign>
where
    R: UserReader + CampaignReader + CampaignWriter + ActivityLogWriter + ?Sized,
{
    review(repo, auth, client_id, campaign_id, form, CampaignAction::Approve)
}

/// Sends the campaign back to draft with an optional comment.
pub fn reject_campaign<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
    form: &ReviewForm,
) -> ServiceResult<Campaign>
where
    R: UserReader + CampaignReader + CampaignWriter + ActivityLogWriter + ?Sized,
{
    review(repo, auth, client_id, campaign_id, form, CampaignAction::Reject)
}

pub fn schedule_campaign<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
    form: &ScheduleForm,
) -> ServiceResult<Campaign>
where
    R: UserReader + CampaignReader + CampaignWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let campaign = find_campaign(repo, client_id, campaign_id)?;

    let scheduled_at: NaiveDateTime = form.scheduled_at.naive_utc();
    if scheduled_at <= Utc::now().naive_utc() {
        return Err(ServiceError::Form(
            "scheduled time must be in the future".to_string(),
        ));
    }

    let scheduled = apply_action(repo, &campaign, CampaignAction::Schedule, |change| {
        change.scheduled_at = Some(scheduled_at);
    })?;
    log_campaign(
        repo,
        &user,
        &scheduled,
        "campaign.scheduled",
        json!({ "scheduled_at": scheduled_at }),
    );
    Ok(scheduled)
}

/// Runs a plain lifecycle action that only needs admin rights.
fn admin_action<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
    action: CampaignAction,
    activity: &str,
) -> ServiceResult<Campaign>
where
    R: UserReader + CampaignReader + CampaignWriter + ActivityLogWriter + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let campaign = find_campaign(repo, client_id, campaign_id)?;

    let updated = apply_action(repo, &campaign, action, |change| match action {
        CampaignAction::Unschedule => change.scheduled_at = None,
        CampaignAction::Reopen => {
            change.scheduled_at = None;
            change.approved_at = None;
        }
        _ => {}
    })?;
    log_campaign(
        repo,
        &user,
        &updated,
        activity,
        json!({ "from": campaign.status }),
    );
    Ok(updated)
}

pub fn unschedule_campaign<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
) -> ServiceResult<Campaign>
where
    R: UserReader + CampaignReader + CampaignWriter + ActivityLogWriter + ?Sized,
{
    admin_action(
        repo,
        auth,
        client_id,
        campaign_id,
        CampaignAction::Unschedule,
        "campaign.unscheduled",
    )
}

pub fn cancel_campaign<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
) -> ServiceResult<Campaign>
where
    R: UserReader + CampaignReader + CampaignWriter + ActivityLogWriter + ?Sized,
{
    admin_action(
        repo,
        auth,
        client_id,
        campaign_id,
        CampaignAction::Cancel,
        "campaign.cancelled",
    )
}

/// Returns a failed or cancelled campaign to draft.
pub fn reopen_campaign<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
) -> ServiceResult<Campaign>
where
    R: UserReader + CampaignReader + CampaignWriter + ActivityLogWriter + ?Sized,
{
    admin_action(
        repo,
        auth,
        client_id,
        campaign_id,
        CampaignAction::Reopen,
        "campaign.reopened",
    )
}

/// Sends an approved or scheduled campaign right away.
pub fn send_campaign<R, D>(
    repo: &R,
    dispatcher: &D,
    tokens: &UnsubscribeTokens,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
) -> ServiceResult<Campaign>
where
    R: UserReader
        + CampaignReader
        + CampaignWriter
        + ContactReader
        + ContactListReader
        + AnalyticsWriter
        + ActivityLogWriter
        + ?Sized,
    D: EmailDispatcher + ?Sized,
{
    let user = require_admin(repo, auth)?;
    let campaign = find_campaign(repo, client_id, campaign_id)?;

    let sending = dispatch_campaign(repo, dispatcher, tokens, &campaign, Utc::now().naive_utc())?;
    log_campaign(repo, &user, &sending, "campaign.sent", json!({}));
    Ok(sending)
}

/// Recipients the campaign would currently reach.
pub fn campaign_audience<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    client_id: ClientId,
    campaign_id: CampaignId,
    page: Option<usize>,
) -> ServiceResult<AudiencePreview>
where
    R: UserReader + CampaignReader + ContactReader + ContactListReader + ?Sized,
{
    require_client_access(repo, auth, client_id)?;
    let campaign = find_campaign(repo, client_id, campaign_id)?;
    preview_audience(repo, client_id, &campaign.audience, page_or_first(page))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::{TemplateId, TemplateName};
    use crate::domain::template::Template;
    use crate::services::access::test_support::*;
    use crate::services::dispatch::tests::campaign;
    use chrono::Duration;

    fn client_one() -> ClientId {
        ClientId::new(1).unwrap()
    }

    fn id(value: i32) -> CampaignId {
        CampaignId::new(value).unwrap()
    }

    fn form(json: &str) -> CampaignForm {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn unsent_campaign_report_includes_audience_size() {
        let mut repo = repo_with_users();
        repo.expect_get_campaign()
            .returning(|id, _| Ok(Some(campaign(id.get(), CampaignStatus::Approved))));
        repo.expect_get_campaign_analytics().returning(|_| Ok(None));
        repo.expect_count_contacts()
            .withf(|q| q.status == Some(crate::domain::types::ContactStatus::Active))
            .times(1)
            .returning(|_| Ok(42));

        let report = get_campaign(&repo, &auth("agent"), client_one(), id(3)).unwrap();
        assert_eq!(report.audience_size, Some(42));
        assert!(report.analytics.is_none());
    }

    #[test]
    fn sent_campaigns_cannot_be_deleted() {
        let mut repo = repo_with_users();
        repo.expect_get_campaign()
            .returning(|id, _| Ok(Some(campaign(id.get(), CampaignStatus::Sent))));
        repo.expect_delete_campaign().never();

        let result = delete_campaign(&repo, &auth("admin"), client_one(), id(3));
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn only_drafts_are_editable() {
        let mut repo = repo_with_users();
        repo.expect_get_campaign()
            .returning(|id, _| Ok(Some(campaign(id.get(), CampaignStatus::Approved))));
        repo.expect_update_campaign_draft().never();

        let form = form(r#"{"name":"n","from_name":"f","from_email":"a@b.com"}"#);
        let result = update_campaign(&repo, &auth("admin"), client_one(), id(3), &form);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn empty_content_is_filled_from_the_template() {
        let mut repo = repo_with_users();
        repo.expect_get_template().returning(|id| {
            let now = Utc::now().naive_utc();
            Ok(Some(Template {
                id,
                client_id: None,
                name: TemplateName::new("Monthly").unwrap(),
                subject: "Market update".into(),
                html_content: "<h1>Update</h1>".into(),
                design_json: Some(json!({"rows": []})),
                created_at: now,
                updated_at: now,
            }))
        });
        repo.expect_create_campaign()
            .withf(|new| {
                new.draft.subject == "Market update"
                    && new.draft.html_content == "<h1>Update</h1>"
                    && new.draft.template_id == Some(TemplateId::new(2).unwrap())
            })
            .times(1)
            .returning(|_| Ok(campaign(1, CampaignStatus::Draft)));

        let form = form(
            r#"{"template_id":2,"name":"n","from_name":"f","from_email":"a@b.com"}"#,
        );
        create_campaign(&repo, &auth("admin"), client_one(), &form).unwrap();
    }

    #[test]
    fn unknown_list_is_rejected_on_create() {
        let mut repo = repo_with_users();
        repo.expect_get_contact_list().returning(|_, _| Ok(None));
        repo.expect_create_campaign().never();

        let form = form(
            r#"{"name":"n","from_name":"f","from_email":"a@b.com",
                "audience":{"type":"list","list_id":4}}"#,
        );
        let result = create_campaign(&repo, &auth("admin"), client_one(), &form);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn incomplete_draft_cannot_be_submitted() {
        let mut repo = repo_with_users();
        repo.expect_get_campaign().returning(|id, _| {
            let mut draft = campaign(id.get(), CampaignStatus::Draft);
            draft.html_content = "  ".into();
            Ok(Some(draft))
        });
        repo.expect_transition_campaign().never();

        let result = submit_campaign(&repo, &auth("admin"), client_one(), id(3));
        assert!(matches!(result, Err(ServiceError::Form(msg)) if msg.contains("content")));
    }

    #[test]
    fn client_user_approves_own_campaign() {
        let mut repo = repo_with_users();
        repo.expect_get_campaign()
            .returning(|id, _| Ok(Some(campaign(id.get(), CampaignStatus::PendingApproval))));
        repo.expect_transition_campaign()
            .withf(|_, from, change| {
                *from == CampaignStatus::PendingApproval
                    && change.status == CampaignStatus::Approved
                    && change.approved_at.is_some()
            })
            .times(1)
            .returning(|id, _, change| Ok(Some(campaign(id.get(), change.status))));

        let approved = approve_campaign(
            &repo,
            &auth("agent"),
            client_one(),
            id(3),
            &ReviewForm::default(),
        )
        .unwrap();
        assert_eq!(approved.status, CampaignStatus::Approved);
    }

    #[test]
    fn client_user_cannot_send_or_cancel() {
        let repo = repo_with_users();
        assert!(matches!(
            cancel_campaign(&repo, &auth("agent"), client_one(), id(3)),
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            submit_campaign(&repo, &auth("agent"), client_one(), id(3)),
            Err(ServiceError::Forbidden)
        ));
    }

    #[test]
    fn concurrent_status_change_is_a_conflict() {
        let mut repo = repo_with_users();
        repo.expect_get_campaign()
            .returning(|id, _| Ok(Some(campaign(id.get(), CampaignStatus::Approved))));
        repo.expect_transition_campaign()
            .returning(|_, _, _| Ok(None));

        let result = cancel_campaign(&repo, &auth("admin"), client_one(), id(3));
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn schedule_requires_a_future_time() {
        let mut repo = repo_with_users();
        repo.expect_get_campaign()
            .returning(|id, _| Ok(Some(campaign(id.get(), CampaignStatus::Approved))));
        repo.expect_transition_campaign()
            .withf(|_, _, change| change.scheduled_at.is_some())
            .times(1)
            .returning(|id, _, change| {
                let mut c = campaign(id.get(), change.status);
                c.scheduled_at = change.scheduled_at;
                Ok(Some(c))
            });

        let past = ScheduleForm {
            scheduled_at: Utc::now() - Duration::hours(1),
        };
        assert!(matches!(
            schedule_campaign(&repo, &auth("admin"), client_one(), id(3), &past),
            Err(ServiceError::Form(_))
        ));

        let future = ScheduleForm {
            scheduled_at: Utc::now() + Duration::days(2),
        };
        let scheduled =
            schedule_campaign(&repo, &auth("admin"), client_one(), id(3), &future).unwrap();
        assert_eq!(scheduled.status, CampaignStatus::Scheduled);
    }

    #[test]
    fn reopen_clears_review_timestamps() {
        let mut repo = repo_with_users();
        repo.expect_get_campaign()
            .returning(|id, _| Ok(Some(campaign(id.get(), CampaignStatus::Failed))));
        repo.expect_transition_campaign()
            .withf(|_, _, change| {
                change.status == CampaignStatus::Draft && change.approved_at.is_none()
            })
            .times(1)
            .returning(|id, _, change| Ok(Some(campaign(id.get(), change.status))));

        reopen_campaign(&repo, &auth("admin"), client_one(), id(3)).unwrap();
    }
}
