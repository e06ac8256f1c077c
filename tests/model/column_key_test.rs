use opengov_query::model::{column_key, AggregateFunction, ColumnSpec};

const AGGREGATES: [Option<AggregateFunction>; 6] = [
    None,
    Some(AggregateFunction::Sum),
    Some(AggregateFunction::Avg),
    Some(AggregateFunction::Count),
    Some(AggregateFunction::Min),
    Some(AggregateFunction::Max),
];

#[test]
fn test_alias_always_wins() {
    for column in ["DOT_latest", "q.year_quarter", "total spend", ""] {
        for aggregate in AGGREGATES {
            for alias in ["quarter", "Total (DOT)", "a.b c"] {
                let spec = ColumnSpec {
                    column: column.to_string(),
                    alias: Some(alias.to_string()),
                    aggregate_function: aggregate,
                };
                assert_eq!(column_key(&spec), alias);
            }
        }
    }
}

#[test]
fn test_aggregate_key_sanitizes_column() {
    let cases = [
        (AggregateFunction::Sum, "DOT_latest", "sum_DOT_latest"),
        (AggregateFunction::Avg, "s.amount", "avg_s_amount"),
        (AggregateFunction::Count, "id", "count_id"),
        (AggregateFunction::Max, "total spend", "max_total_spend"),
        (AggregateFunction::Min, "a.b\tc", "min_a_b_c"),
    ];
    for (aggregate, column, expected) in cases {
        let spec = ColumnSpec::new(column).with_aggregate(aggregate);
        assert_eq!(spec.column_key(), expected, "column {:?}", column);
    }
}

#[test]
fn test_plain_column_unchanged() {
    // No sanitizing without an aggregate.
    assert_eq!(column_key(&ColumnSpec::new("c.category")), "c.category");
    assert_eq!(column_key(&ColumnSpec::new("status")), "status");
}

#[test]
fn test_column_spec_json() {
    let spec: ColumnSpec = serde_json::from_str(
        r#"{"column": "DOT_latest", "aggregateFunction": "SUM"}"#,
    )
    .unwrap();
    assert_eq!(spec.aggregate_function, Some(AggregateFunction::Sum));
    assert_eq!(spec.alias, None);
    assert_eq!(spec.column_key(), "sum_DOT_latest");
}
