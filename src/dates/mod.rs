//! Partial-date parsing and range expansion for date filters.

mod conditions;
mod partial_date;

pub use conditions::{expand_date_condition, expand_date_filters, expand_query_date_filters};
pub use partial_date::{
    format_partial_date_for_display, is_partial_date, is_valid_partial_date, next_boundary,
    parse_partial_date, partial_date_range, previous_boundary, DatePrecision, DateRange,
    ParsedPartialDate, MAX_YEAR, MIN_YEAR,
};
