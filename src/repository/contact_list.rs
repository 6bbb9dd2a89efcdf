use diesel::prelude::*;

use crate::domain::contact_list::{ContactList, NewContactList, UpdateContactList};
use crate::domain::types::{ClientId, ContactListId};
use crate::models::contact_list::{
    ContactList as DbContactList, NewContactList as DbNewContactList,
    UpdateContactList as DbUpdateContactList,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ContactListReader, ContactListWriter, DieselRepository};
use crate::schema::contact_lists;

impl ContactListReader for DieselRepository {
    fn get_contact_list(
        &self,
        id: ContactListId,
        client_id: ClientId,
    ) -> RepositoryResult<Option<ContactList>> {
        let mut conn = self.conn()?;
        let list = contact_lists::table
            .filter(contact_lists::id.eq(id.get()))
            .filter(contact_lists::client_id.eq(client_id.get()))
            .first::<DbContactList>(&mut conn)
            .optional()?;

        Ok(list.map(ContactList::try_from).transpose()?)
    }

    fn list_contact_lists(&self, client_id: ClientId) -> RepositoryResult<Vec<ContactList>> {
        let mut conn = self.conn()?;
        let lists = contact_lists::table
            .filter(contact_lists::client_id.eq(client_id.get()))
            .order(contact_lists::name.asc())
            .load::<DbContactList>(&mut conn)?;

        Ok(lists
            .into_iter()
            .map(ContactList::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl ContactListWriter for DieselRepository {
    fn create_contact_list(&self, new_list: &NewContactList) -> RepositoryResult<ContactList> {
        let mut conn = self.conn()?;
        let insertable = DbNewContactList::from(new_list);
        let created = diesel::insert_into(contact_lists::table)
            .values(&insertable)
            .get_result::<DbContactList>(&mut conn)?;

        Ok(ContactList::try_from(created)?)
    }

    fn update_contact_list(
        &self,
        id: ContactListId,
        updates: &UpdateContactList,
    ) -> RepositoryResult<ContactList> {
        let mut conn = self.conn()?;
        let changes = DbUpdateContactList::from(updates);
        let updated = diesel::update(contact_lists::table.find(id.get()))
            .set(&changes)
            .get_result::<DbContactList>(&mut conn)?;

        Ok(ContactList::try_from(updated)?)
    }

    fn delete_contact_list(&self, id: ContactListId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(contact_lists::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
