use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::contact::{Contact, NewContact, UpdateContact};
use crate::domain::types::{ClientId, ContactId, ContactStatus, EmailAddress};
use crate::models::contact::{
    Contact as DbContact, NewContact as DbNewContact, UpdateContact as DbUpdateContact,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::filter::{ESCAPE, compile, escape_like};
use crate::repository::{ContactQuery, ContactReader, ContactWriter, DieselRepository};
use crate::schema::contacts;

/// Base query for `query`; the filter predicate is rebuilt per call because
/// boxed expressions cannot be cloned.
fn contacts_query(query: &ContactQuery) -> contacts::BoxedQuery<'static, Sqlite> {
    let mut items = contacts::table
        .filter(contacts::client_id.eq(query.client_id.get()))
        .into_boxed();

    if let Some(status) = query.status {
        items = items.filter(contacts::status.eq(status.as_str()));
    }

    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{}%", escape_like(term));
        items = items.filter(
            contacts::email
                .like(pattern.clone())
                .escape(ESCAPE)
                .or(contacts::first_name.like(pattern.clone()).escape(ESCAPE))
                .or(contacts::last_name.like(pattern.clone()).escape(ESCAPE))
                .or(contacts::city.like(pattern).escape(ESCAPE)),
        );
    }

    if let Some(ids) = &query.contact_ids {
        let ids: Vec<i32> = ids.iter().map(|id| id.get()).collect();
        items = items.filter(contacts::id.eq_any(ids));
    }

    if let Some(predicate) = query.criteria.as_ref().and_then(compile) {
        items = items.filter(predicate);
    }

    items
}

fn into_domain(rows: Vec<DbContact>) -> RepositoryResult<Vec<Contact>> {
    Ok(rows
        .into_iter()
        .map(Contact::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

impl ContactReader for DieselRepository {
    fn get_contact_by_id(
        &self,
        id: ContactId,
        client_id: ClientId,
    ) -> RepositoryResult<Option<Contact>> {
        let mut conn = self.conn()?;
        let contact = contacts::table
            .filter(contacts::id.eq(id.get()))
            .filter(contacts::client_id.eq(client_id.get()))
            .first::<DbContact>(&mut conn)
            .optional()?;

        Ok(contact.map(Contact::try_from).transpose()?)
    }

    fn get_contact_by_email(
        &self,
        email: &EmailAddress,
        client_id: ClientId,
    ) -> RepositoryResult<Option<Contact>> {
        let mut conn = self.conn()?;
        let contact = contacts::table
            .filter(contacts::email.eq(email.as_str()))
            .filter(contacts::client_id.eq(client_id.get()))
            .first::<DbContact>(&mut conn)
            .optional()?;

        Ok(contact.map(Contact::try_from).transpose()?)
    }

    fn list_contacts(&self, query: ContactQuery) -> RepositoryResult<(usize, Vec<Contact>)> {
        let mut conn = self.conn()?;

        let total = contacts_query(&query).count().get_result::<i64>(&mut conn)?;

        let mut items = contacts_query(&query).order(contacts::id.asc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let items = into_domain(items.load::<DbContact>(&mut conn)?)?;

        Ok((total as usize, items))
    }

    fn count_contacts(&self, query: ContactQuery) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let total = contacts_query(&query).count().get_result::<i64>(&mut conn)?;
        Ok(total as usize)
    }
}

impl ContactWriter for DieselRepository {
    fn create_contact(&self, new_contact: &NewContact) -> RepositoryResult<Contact> {
        let mut conn = self.conn()?;
        let insertable = DbNewContact::from(new_contact);
        let created = diesel::insert_into(contacts::table)
            .values(&insertable)
            .get_result::<DbContact>(&mut conn)?;

        Ok(Contact::try_from(created)?)
    }

    fn import_contacts(&self, new_contacts: &[NewContact]) -> RepositoryResult<usize> {
        if new_contacts.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn()?;
        let insertables: Vec<DbNewContact> = new_contacts.iter().map(Into::into).collect();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let mut inserted = 0;
            for row in &insertables {
                inserted += diesel::insert_or_ignore_into(contacts::table)
                    .values(row)
                    .execute(conn)?;
            }
            Ok(inserted)
        })
    }

    fn update_contact(
        &self,
        id: ContactId,
        client_id: ClientId,
        updates: &UpdateContact,
    ) -> RepositoryResult<Contact> {
        let mut conn = self.conn()?;
        let changes = DbUpdateContact::from(updates);
        let target = contacts::table
            .filter(contacts::id.eq(id.get()))
            .filter(contacts::client_id.eq(client_id.get()));
        let updated = diesel::update(target)
            .set(&changes)
            .get_result::<DbContact>(&mut conn)?;

        Ok(Contact::try_from(updated)?)
    }

    fn set_contact_status(
        &self,
        id: ContactId,
        status: ContactStatus,
        at: NaiveDateTime,
    ) -> RepositoryResult<Contact> {
        let mut conn = self.conn()?;
        let target = contacts::table.find(id.get());
        let updated = if status == ContactStatus::Unsubscribed {
            diesel::update(target)
                .set((
                    contacts::status.eq(status.as_str()),
                    contacts::unsubscribed_at.eq(Some(at)),
                    contacts::updated_at.eq(at),
                ))
                .get_result::<DbContact>(&mut conn)?
        } else {
            diesel::update(target)
                .set((
                    contacts::status.eq(status.as_str()),
                    contacts::updated_at.eq(at),
                ))
                .get_result::<DbContact>(&mut conn)?
        };

        Ok(Contact::try_from(updated)?)
    }

    fn delete_contact(&self, id: ContactId, client_id: ClientId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            contacts::table
                .filter(contacts::id.eq(id.get()))
                .filter(contacts::client_id.eq(client_id.get())),
        )
        .execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
