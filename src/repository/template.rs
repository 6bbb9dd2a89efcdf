use diesel::prelude::*;

use crate::domain::template::{NewTemplate, Template, UpdateTemplate};
use crate::domain::types::{ClientId, TemplateId};
use crate::models::template::{
    NewTemplate as DbNewTemplate, Template as DbTemplate, UpdateTemplate as DbUpdateTemplate,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, TemplateReader, TemplateWriter};
use crate::schema::templates;

impl TemplateReader for DieselRepository {
    fn get_template(&self, id: TemplateId) -> RepositoryResult<Option<Template>> {
        let mut conn = self.conn()?;
        let template = templates::table
            .find(id.get())
            .first::<DbTemplate>(&mut conn)
            .optional()?;

        Ok(template.map(Template::try_from).transpose()?)
    }

    fn list_templates(&self, client_id: Option<ClientId>) -> RepositoryResult<Vec<Template>> {
        let mut conn = self.conn()?;
        let mut query = templates::table.into_boxed();
        if let Some(client_id) = client_id {
            query = query.filter(
                templates::client_id
                    .is_null()
                    .or(templates::client_id.eq(client_id.get())),
            );
        }
        let rows = query
            .order(templates::name.asc())
            .load::<DbTemplate>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(Template::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl TemplateWriter for DieselRepository {
    fn create_template(&self, new_template: &NewTemplate) -> RepositoryResult<Template> {
        let mut conn = self.conn()?;
        let insertable = DbNewTemplate::from(new_template);
        let created = diesel::insert_into(templates::table)
            .values(&insertable)
            .get_result::<DbTemplate>(&mut conn)?;

        Ok(Template::try_from(created)?)
    }

    fn update_template(
        &self,
        id: TemplateId,
        updates: &UpdateTemplate,
    ) -> RepositoryResult<Template> {
        let mut conn = self.conn()?;
        let changes = DbUpdateTemplate::from(updates);
        let updated = diesel::update(templates::table.find(id.get()))
            .set(&changes)
            .get_result::<DbTemplate>(&mut conn)?;

        Ok(Template::try_from(updated)?)
    }

    fn delete_template(&self, id: TemplateId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(templates::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
