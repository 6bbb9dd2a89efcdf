//! Filter criteria describing a dynamic contact segment.
//!
//! A criteria is a flat list of `{field, operator, value}` conditions joined
//! by a single logical operator. The criteria is stored as JSON on the
//! contact list and compiled into a query predicate by
//! [`crate::repository::filter`].

use serde::{Deserialize, Serialize};

use crate::domain::types::{ContactStatus, PhoneNumber, TypeConstraintError};

/// Upper bound on conditions accepted in a single criteria.
pub const MAX_CONDITIONS: usize = 20;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterLogic {
    #[default]
    And,
    Or,
}

/// Contact attribute a condition applies to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Email,
    FirstName,
    LastName,
    Phone,
    City,
    Source,
    Tags,
    Status,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
}

impl FilterOperator {
    /// Operators that only make sense with a non-empty operand.
    pub fn requires_value(self) -> bool {
        !matches!(self, FilterOperator::Equals | FilterOperator::NotEquals)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterCondition {
    pub field: FilterField,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: String,
}

impl FilterCondition {
    pub fn new(field: FilterField, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }

    /// Value as it should be compared against the stored column.
    pub fn normalized_value(&self) -> String {
        let trimmed = self.value.trim();
        match self.field {
            FilterField::Email | FilterField::Tags | FilterField::Source => trimmed.to_lowercase(),
            // Stored phones are E.164; exact matches need the same form.
            FilterField::Phone if !self.operator.requires_value() => PhoneNumber::new(trimmed)
                .map(PhoneNumber::into_inner)
                .unwrap_or_else(|_| trimmed.to_string()),
            _ => trimmed.to_string(),
        }
    }

    fn validate(&self) -> Result<(), TypeConstraintError> {
        let value = self.normalized_value();
        if self.operator.requires_value() && value.is_empty() {
            return Err(TypeConstraintError::InvalidValue(format!(
                "{:?} condition on {:?} needs a value",
                self.operator, self.field
            )));
        }
        if self.field == FilterField::Status {
            if self.operator.requires_value() {
                return Err(TypeConstraintError::InvalidValue(
                    "status only supports equals and not_equals".to_string(),
                ));
            }
            value.parse::<ContactStatus>()?;
        }
        if self.field == FilterField::Tags && value.contains(',') {
            return Err(TypeConstraintError::InvalidValue(
                "tag conditions match a single tag".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterCriteria {
    #[serde(default)]
    pub logic: FilterLogic,
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
}

impl FilterCriteria {
    pub fn new(logic: FilterLogic, conditions: Vec<FilterCondition>) -> Self {
        Self { logic, conditions }
    }

    /// Criteria without conditions selects every contact.
    pub fn matches_all(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn validate(&self) -> Result<(), TypeConstraintError> {
        if self.conditions.len() > MAX_CONDITIONS {
            return Err(TypeConstraintError::InvalidValue(format!(
                "at most {MAX_CONDITIONS} conditions are allowed"
            )));
        }
        self.conditions.iter().try_for_each(FilterCondition::validate)
    }

    /// Parses stored criteria JSON and validates it.
    pub fn from_json(raw: &str) -> Result<Self, TypeConstraintError> {
        let criteria: FilterCriteria = serde_json::from_str(raw)
            .map_err(|e| TypeConstraintError::InvalidValue(format!("filter criteria: {e}")))?;
        criteria.validate()?;
        Ok(criteria)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
