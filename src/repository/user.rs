use diesel::prelude::*;

use crate::domain::types::UserId;
use crate::domain::user::{NewUser, User};
use crate::models::user::{NewUser as DbNewUser, User as DbUser};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, UserReader, UserWriter};
use crate::schema::users;

impl UserReader for DieselRepository {
    fn get_user(&self, id: &UserId) -> RepositoryResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .find(id.as_str())
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(User::try_from).transpose()?)
    }
}

impl UserWriter for DieselRepository {
    fn upsert_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let mut conn = self.conn()?;
        let row = DbNewUser::from(user);
        let stored = diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_update()
            .set(&row)
            .get_result::<DbUser>(&mut conn)?;

        Ok(User::try_from(stored)?)
    }

    /// Removing an unknown user is not an error.
    fn delete_user(&self, id: &UserId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        diesel::delete(users::table.find(id.as_str())).execute(&mut conn)?;
        Ok(())
    }
}
