use serde::Deserialize;
use validator::Validate;

use crate::domain::contact_list::{NewContactList, UpdateContactList};
use crate::domain::filter::FilterCriteria;
use crate::domain::types::{ClientId, ListName};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
/// Payload for creating or replacing a saved contact list.
pub struct ContactListForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
    #[serde(default)]
    pub criteria: FilterCriteria,
}

impl ContactListForm {
    pub fn to_new_list(&self, client_id: ClientId) -> Result<NewContactList, FormError> {
        self.validate()?;
        self.criteria.validate()?;
        Ok(NewContactList::new(
            client_id,
            ListName::new(self.name.as_str())?,
            &self.description,
            self.criteria.clone(),
        ))
    }

    pub fn to_update_list(&self, client_id: ClientId) -> Result<UpdateContactList, FormError> {
        self.to_new_list(client_id).map(UpdateContactList::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_is_validated() {
        let form: ContactListForm = serde_json::from_str(
            r#"{"name":"Buyers","criteria":{"logic":"and","conditions":[
                {"field":"status","operator":"contains","value":"active"}
            ]}}"#,
        )
        .unwrap();
        assert!(matches!(
            form.to_new_list(ClientId::new(1).unwrap()),
            Err(FormError::TypeConstraint(_))
        ));
    }

    #[test]
    fn unknown_fields_fail_to_parse() {
        let parsed = serde_json::from_str::<ContactListForm>(
            r#"{"name":"x","criteria":{"conditions":[
                {"field":"salary","operator":"equals","value":"1"}
            ]}}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_criteria_matches_everyone() {
        let form: ContactListForm = serde_json::from_str(r#"{"name":" Everyone "}"#).unwrap();
        let list = form.to_new_list(ClientId::new(1).unwrap()).unwrap();
        assert!(list.criteria.matches_all());
        assert_eq!(list.name.as_str(), "Everyone");
    }
}
