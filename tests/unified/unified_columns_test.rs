use opengov_query::model::{AggregateFunction, ColumnSpec, ExpressionColumn, QueryConfig};
use opengov_query::unified::{from_unified_columns, to_unified_columns, UnifiedColumn};
use serde_json::json;

fn columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("year_quarter").with_alias("quarter"),
        ColumnSpec::new("c.category"),
        ColumnSpec::new("DOT_latest").with_aggregate(AggregateFunction::Sum),
    ]
}

fn expressions() -> Vec<ExpressionColumn> {
    vec![
        ExpressionColumn::new("SUM(DOT_latest) * 7.5", "usd_estimate"),
        ExpressionColumn::new("COUNT(*)", "spend_count"),
    ]
}

fn ids(order: &[&str]) -> Vec<String> {
    order.iter().map(|s| s.to_string()).collect()
}

fn assert_round_trip(
    columns: &[ColumnSpec],
    expressions: &[ExpressionColumn],
    order: &[String],
) {
    let unified = to_unified_columns(columns, expressions, Some(order));
    let back = from_unified_columns(&unified);
    assert_eq!(back.columns, columns, "order {:?}", order);
    assert_eq!(back.expression_columns, expressions, "order {:?}", order);
    assert_eq!(back.column_order, order, "order {:?}", order);
}

#[test]
fn test_round_trip_for_every_interleaving() {
    let all_ids = ids(&[
        "col:year_quarter",
        "col:c.category",
        "col:DOT_latest",
        "expr:usd_estimate",
        "expr:spend_count",
    ]);

    // Every permutation of five ids.
    let mut permutations = vec![vec![]];
    for _ in 0..all_ids.len() {
        permutations = permutations
            .into_iter()
            .flat_map(|prefix: Vec<String>| {
                all_ids
                    .iter()
                    .filter(|id| !prefix.contains(id))
                    .map(|id| {
                        let mut next = prefix.clone();
                        next.push(id.clone());
                        next
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
    }
    assert_eq!(permutations.len(), 120);

    for order in &permutations {
        let unified = to_unified_columns(&columns(), &expressions(), Some(order));
        let unified_ids: Vec<_> = unified.iter().map(UnifiedColumn::id).collect();
        assert_eq!(&unified_ids, order);

        let back = from_unified_columns(&unified);
        let mut regular_in_order: Vec<ColumnSpec> = Vec::new();
        let mut expressions_in_order: Vec<ExpressionColumn> = Vec::new();
        for column in &unified {
            match column {
                UnifiedColumn::Regular(spec) => regular_in_order.push(spec.clone()),
                UnifiedColumn::Expression(expr) => expressions_in_order.push(expr.clone()),
            }
        }
        assert_eq!(back.columns, regular_in_order);
        assert_eq!(back.expression_columns, expressions_in_order);
        assert_eq!(&back.column_order, order);

        // Stored form written by the editor reads back identically.
        assert_round_trip(&back.columns, &back.expression_columns, &back.column_order);
    }
}

#[test]
fn test_round_trip_empty() {
    assert!(to_unified_columns(&[], &[], None).is_empty());
    assert_round_trip(&[], &[], &[]);

    let back = from_unified_columns(&[]);
    assert!(back.columns.is_empty());
    assert!(back.expression_columns.is_empty());
    assert!(back.column_order.is_empty());
}

#[test]
fn test_round_trip_duplicate_column() {
    let columns = vec![
        ColumnSpec::new("DOT_latest").with_aggregate(AggregateFunction::Sum),
        ColumnSpec::new("DOT_latest").with_aggregate(AggregateFunction::Avg),
    ];
    let expressions = vec![ExpressionColumn::new("1", "one")];
    let order = ids(&["col:DOT_latest", "expr:one", "col:DOT_latest"]);

    assert_round_trip(&columns, &expressions, &order);
}

#[test]
fn test_order_without_new_columns() {
    // Saved before usd_estimate and spend_count were added.
    let order = ids(&["col:DOT_latest", "col:year_quarter"]);
    let unified = to_unified_columns(&columns(), &expressions(), Some(&order));
    let unified_ids: Vec<_> = unified.iter().map(UnifiedColumn::id).collect();
    assert_eq!(
        unified_ids,
        vec![
            "col:DOT_latest",
            "col:year_quarter",
            "col:c.category",
            "expr:usd_estimate",
            "expr:spend_count",
        ]
    );
}

#[test]
fn test_stale_ids_ignored() {
    let order = ids(&["expr:removed", "col:c.category"]);
    let unified = to_unified_columns(&columns(), &[], Some(&order));
    assert_eq!(unified.len(), 3);
    assert_eq!(unified[0].id(), "col:c.category");
}

#[test]
fn test_query_config_column_order_wire_form() {
    let config: QueryConfig = serde_json::from_value(json!({
        "sourceTable": "all_spending",
        "columns": [{"column": "year_quarter", "alias": "quarter"}],
        "expressionColumns": [{"expression": "COUNT(*)", "alias": "spend_count"}],
        "columnOrder": ["expr:spend_count", "col:year_quarter"]
    }))
    .unwrap();

    let unified = config.unified_columns();
    let keys: Vec<_> = unified.iter().map(UnifiedColumn::result_key).collect();
    assert_eq!(keys, vec!["spend_count", "quarter"]);

    let reordered: Vec<_> = unified.into_iter().rev().collect();
    let saved = config.clone().with_unified_columns(&reordered);
    assert_eq!(
        serde_json::to_value(&saved).unwrap()["columnOrder"],
        json!(["col:year_quarter", "expr:spend_count"])
    );
}
