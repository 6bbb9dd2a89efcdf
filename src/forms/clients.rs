use serde::Deserialize;
use validator::Validate;

use crate::domain::client::{NewClient, UpdateClient};
use crate::domain::types::{ClientName, EmailAddress, PhoneNumber};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
/// Payload for creating or replacing a client account.
pub struct ClientForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

impl ClientForm {
    pub fn to_new_client(&self) -> Result<NewClient, FormError> {
        self.validate()?;
        Ok(NewClient::new(
            ClientName::new(self.name.as_str())?,
            EmailAddress::new(self.email.as_str())?,
            non_blank(self.phone.as_deref())
                .map(PhoneNumber::new)
                .transpose()?,
            self.company.clone(),
        ))
    }

    pub fn to_update_client(&self) -> Result<UpdateClient, FormError> {
        self.to_new_client().map(UpdateClient::from)
    }
}
