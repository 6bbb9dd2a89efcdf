//! Compiles [`FilterCriteria`] into a boxed Diesel predicate over `contacts`.
//!
//! Operands are always bound as parameters. Pattern operators escape `%`,
//! `_` and `\` so user input is matched literally.

use diesel::expression_methods::EscapeExpressionMethods;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;

use crate::domain::filter::{FilterCondition, FilterCriteria, FilterField, FilterLogic, FilterOperator};
use crate::schema::contacts;

pub type ContactPredicate = Box<dyn BoxableExpression<contacts::table, Sqlite, SqlType = Bool>>;

pub const ESCAPE: char = '\\';

/// Escapes LIKE wildcards in `value`.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

macro_rules! text_predicate {
    ($column:expr, $operator:expr, $value:expr) => {{
        let value: String = $value;
        let pattern = escape_like(&value);
        let predicate: ContactPredicate = match $operator {
            FilterOperator::Equals => Box::new($column.eq(value)),
            FilterOperator::NotEquals => Box::new($column.ne(value)),
            FilterOperator::Contains => {
                Box::new($column.like(format!("%{pattern}%")).escape(ESCAPE))
            }
            FilterOperator::NotContains => {
                Box::new($column.not_like(format!("%{pattern}%")).escape(ESCAPE))
            }
            FilterOperator::StartsWith => {
                Box::new($column.like(format!("{pattern}%")).escape(ESCAPE))
            }
            FilterOperator::EndsWith => {
                Box::new($column.like(format!("%{pattern}")).escape(ESCAPE))
            }
        };
        predicate
    }};
}

/// Tags are stored as a comma separated list, so tag operators work on
/// whole entries rather than on the raw column text.
fn tag_predicate(operator: FilterOperator, value: String) -> ContactPredicate {
    use contacts::tags;

    let pattern = escape_like(&value);
    let has_tag = tags
        .eq(value.clone())
        .or(tags.like(format!("{pattern},%")).escape(ESCAPE))
        .or(tags.like(format!("%,{pattern}")).escape(ESCAPE))
        .or(tags.like(format!("%,{pattern},%")).escape(ESCAPE));

    match operator {
        FilterOperator::Contains => Box::new(has_tag),
        FilterOperator::NotContains => Box::new(diesel::dsl::not(has_tag)),
        FilterOperator::Equals => Box::new(tags.eq(value)),
        FilterOperator::NotEquals => Box::new(tags.ne(value)),
        FilterOperator::StartsWith => Box::new(
            tags.like(format!("{pattern}%"))
                .escape(ESCAPE)
                .or(tags.like(format!("%,{pattern}%")).escape(ESCAPE)),
        ),
        FilterOperator::EndsWith => Box::new(
            tags.like(format!("%{pattern}"))
                .escape(ESCAPE)
                .or(tags.like(format!("%{pattern},%")).escape(ESCAPE)),
        ),
    }
}

fn condition_predicate(condition: &FilterCondition) -> ContactPredicate {
    let value = condition.normalized_value();
    let operator = condition.operator;
    match condition.field {
        FilterField::Email => text_predicate!(contacts::email, operator, value),
        FilterField::FirstName => text_predicate!(contacts::first_name, operator, value),
        FilterField::LastName => text_predicate!(contacts::last_name, operator, value),
        FilterField::Phone => text_predicate!(contacts::phone, operator, value),
        FilterField::City => text_predicate!(contacts::city, operator, value),
        FilterField::Source => text_predicate!(contacts::source, operator, value),
        FilterField::Status => text_predicate!(contacts::status, operator, value),
        FilterField::Tags => tag_predicate(operator, value),
    }
}

/// Builds the predicate for `criteria`.
///
/// Returns `None` for criteria without conditions, which select every
/// contact.
pub fn compile(criteria: &FilterCriteria) -> Option<ContactPredicate> {
    let mut predicates = criteria.conditions.iter().map(condition_predicate);
    let first = predicates.next()?;
    Some(predicates.fold(first, |acc, next| -> ContactPredicate {
        match criteria.logic {
            FilterLogic::And => Box::new(acc.and(next)),
            FilterLogic::Or => Box::new(acc.or(next)),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;

    fn sql_for(criteria: &FilterCriteria) -> String {
        let predicate = compile(criteria).expect("criteria has conditions");
        debug_query::<Sqlite, _>(&contacts::table.filter(predicate).select(contacts::id)).to_string()
    }

    #[test]
    fn escapes_wildcards() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn empty_criteria_compiles_to_nothing() {
        assert!(compile(&FilterCriteria::default()).is_none());
    }

    #[test]
    fn joins_conditions_with_logic() {
        let conditions = vec![
            FilterCondition::new(FilterField::City, FilterOperator::Equals, "Austin"),
            FilterCondition::new(FilterField::Source, FilterOperator::StartsWith, "zil"),
        ];

        let and_sql = sql_for(&FilterCriteria::new(FilterLogic::And, conditions.clone()));
        assert!(and_sql.contains(" AND "));
        assert!(and_sql.contains("ESCAPE"));

        let or_sql = sql_for(&FilterCriteria::new(FilterLogic::Or, conditions));
        assert!(or_sql.contains(" OR "));
    }

    #[test]
    fn values_are_bound_not_inlined() {
        let sql = sql_for(&FilterCriteria::new(
            FilterLogic::And,
            vec![FilterCondition::new(
                FilterField::LastName,
                FilterOperator::Equals,
                "O'Brien",
            )],
        ));
        assert!(sql.contains("`contacts`.`last_name` = ?"));
    }

    #[test]
    fn not_contains_tag_is_negated() {
        let sql = sql_for(&FilterCriteria::new(
            FilterLogic::And,
            vec![FilterCondition::new(
                FilterField::Tags,
                FilterOperator::NotContains,
                "vip",
            )],
        ));
        assert!(sql.contains("NOT "));
    }
}
