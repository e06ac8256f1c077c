//! Rewriting comparisons on partial dates into day-range predicates.

use crate::model::{FilterCondition, FilterGroup, FilterNode, FilterOperator, QueryFilters};

use super::partial_date::{
    next_boundary, parse_partial_date, partial_date_range, previous_boundary,
};

/// Expand a comparison against a year or year-month value.
///
/// | operator | becomes |
/// |---|---|
/// | `=`  | `>= start AND <= end` |
/// | `!=` | `< start OR > end` |
/// | `>`  | `>= next boundary` |
/// | `>=` | `>= start` |
/// | `<`  | `<= previous boundary` |
/// | `<=` | `<= end` |
///
/// Returns `None` when the value is not a text partial date, is a full date,
/// or the operator is not a comparison; the condition is then used as-is.
pub fn expand_date_condition(condition: &FilterCondition) -> Option<FilterNode> {
    let value = condition.value.as_str()?;
    let parsed = parse_partial_date(value)?;
    if parsed.day.is_some() {
        return None;
    }
    let range = partial_date_range(value)?;
    let column = condition.column.as_str();

    let node = match condition.operator {
        FilterOperator::Eq => FilterGroup::and(vec![
            FilterCondition::new(column, FilterOperator::GtEq, range.start).into(),
            FilterCondition::new(column, FilterOperator::LtEq, range.end).into(),
        ])
        .into(),
        FilterOperator::NotEq => FilterGroup::or(vec![
            FilterCondition::new(column, FilterOperator::Lt, range.start).into(),
            FilterCondition::new(column, FilterOperator::Gt, range.end).into(),
        ])
        .into(),
        FilterOperator::Gt => {
            FilterCondition::new(column, FilterOperator::GtEq, next_boundary(value)?).into()
        }
        FilterOperator::GtEq => {
            FilterCondition::new(column, FilterOperator::GtEq, range.start).into()
        }
        FilterOperator::Lt => {
            FilterCondition::new(column, FilterOperator::LtEq, previous_boundary(value)?).into()
        }
        FilterOperator::LtEq => {
            FilterCondition::new(column, FilterOperator::LtEq, range.end).into()
        }
        _ => return None,
    };
    Some(node)
}

fn expand_or_keep(condition: &FilterCondition) -> FilterNode {
    expand_date_condition(condition).unwrap_or_else(|| condition.clone().into())
}

/// Expand every partial-date comparison in a tree.
pub fn expand_date_filters(group: &FilterGroup) -> FilterGroup {
    group.flat_map_conditions(&expand_or_keep)
}

/// Expand partial-date comparisons in either filter form.
///
/// A flat list with nothing to expand is returned unchanged; otherwise it is
/// promoted to an AND group, which is what the flat list meant.
pub fn expand_query_date_filters(filters: &QueryFilters) -> QueryFilters {
    match filters {
        QueryFilters::Group(group) => QueryFilters::Group(expand_date_filters(group)),
        QueryFilters::List(list) => {
            if list.iter().all(|c| expand_date_condition(c).is_none()) {
                return filters.clone();
            }
            QueryFilters::Group(FilterGroup::and(list.iter().map(expand_or_keep).collect()))
        }
    }
}
