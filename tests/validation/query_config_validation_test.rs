use insta::assert_snapshot;
use opengov_query::api::{SchemaColumn, TableSchema};
use opengov_query::model::{
    AggregateFunction, ColumnSpec, ExpressionColumn, FilterCondition, FilterGroup, FilterOperator,
    FilterValue, JoinConfig, OrderBy, QueryConfig, QueryFilters,
};
use opengov_query::validation::{
    find_schema_drift, has_invalid_query_config, malformed_conditions, prepare_for_save,
    strip_invalid_references, validate_query_config,
};
use serde_json::json;

#[test]
fn test_alias_scenario() {
    let config = QueryConfig::new("all_spending")
        .with_column(ColumnSpec::new("q.year_quarter").with_alias("quarter"))
        .with_group_by("quarter")
        .with_group_by("bogus");

    let validation = validate_query_config(&config);
    assert_eq!(validation.invalid_group_by, vec!["bogus"]);
    assert!(validation.invalid_order_by.is_empty());
    assert!(has_invalid_query_config(&validation));
    assert_snapshot!(validation.to_string(), @"GROUP BY references unselected columns: bogus");
}

#[test]
fn test_save_strips_unselected_group_by() {
    let config: QueryConfig = serde_json::from_value(json!({
        "sourceTable": "all_spending",
        "columns": [
            {"column": "all_spending.year_quarter"},
            {"column": "DOT_latest", "aggregateFunction": "SUM"}
        ],
        "groupBy": ["year_quarter", "category", "all_spending.year_quarter"]
    }))
    .unwrap();

    let saved = prepare_for_save(&config);
    assert_eq!(saved.group_by, vec!["all_spending.year_quarter"]);
    assert_eq!(saved.columns, config.columns);
    assert_eq!(saved.limit, 1000);
}

#[test]
fn test_valid_identifiers_are_columns_aliases_and_expressions() {
    let config = QueryConfig::new("treasury_spends")
        .with_column(ColumnSpec::new("c.category").with_alias("category"))
        .with_column(ColumnSpec::new("DOT_latest").with_aggregate(AggregateFunction::Sum))
        .with_expression(ExpressionColumn::new("DOT_latest * 7.5", "usd_estimate"))
        .with_group_by("c.category")
        .with_group_by("category")
        .with_group_by("usd_estimate")
        .with_group_by("sum_DOT_latest")
        .with_order_by(OrderBy::desc("DOT_latest"))
        .with_order_by(OrderBy::asc("usd_estimate"))
        .with_order_by(OrderBy::desc("status"));

    let validation = validate_query_config(&config);

    // The result key of an aggregate is not itself a selectable identifier.
    assert_eq!(validation.invalid_group_by, vec!["sum_DOT_latest"]);
    assert_eq!(validation.invalid_order_by, vec![OrderBy::desc("status")]);
    assert_snapshot!(
        validation.to_string(),
        @"GROUP BY references unselected columns: sum_DOT_latest; ORDER BY references unselected columns: status"
    );

    let repaired = strip_invalid_references(&config, &validation);
    assert_eq!(
        repaired.group_by,
        vec!["c.category", "category", "usd_estimate"]
    );
    assert_eq!(
        repaired.order_by,
        vec![OrderBy::desc("DOT_latest"), OrderBy::asc("usd_estimate")]
    );
    assert!(!validate_query_config(&repaired).has_invalid());
}

#[test]
fn test_valid_config_saved_unchanged() {
    let config = QueryConfig::new("referenda")
        .with_column(ColumnSpec::new("status"))
        .with_group_by("status")
        .with_order_by(OrderBy::asc("status"));

    let validation = validate_query_config(&config);
    assert!(!validation.has_invalid());
    assert_eq!(validation.to_string(), "Query configuration is valid");
    assert_eq!(prepare_for_save(&config), config);
}

#[test]
fn test_malformed_conditions() {
    let filters = QueryFilters::Group(FilterGroup::and(vec![
        FilterCondition::new("status", FilterOperator::In, vec!["Executed"]).into(),
        FilterCondition::new("status", FilterOperator::In, "Executed").into(),
        FilterCondition::is_null("beneficiary").into(),
        FilterCondition::new("DOT_latest", FilterOperator::Gt, FilterValue::Null).into(),
    ]));

    let malformed = malformed_conditions(&filters);
    assert_eq!(malformed.len(), 2);
    assert_eq!(malformed[0].value, FilterValue::from("Executed"));
    assert_eq!(malformed[1].column, "DOT_latest");
}

#[test]
fn test_schema_drift_through_join_alias() {
    let schema: Vec<TableSchema> = serde_json::from_value(json!([
        {"name": "treasury_spends", "columns": [
            {"name": "id", "type": "INTEGER"},
            {"name": "category_id", "type": "INTEGER"},
            {"name": "DOT_latest", "type": "REAL", "nullable": true}
        ]},
        {"name": "categories", "columns": [
            {"name": "id", "type": "INTEGER"},
            {"name": "category", "type": "TEXT"}
        ]}
    ]))
    .unwrap();
    assert_eq!(
        schema[1].columns[1],
        SchemaColumn {
            name: "category".into(),
            data_type: "TEXT".into(),
            nullable: false,
        }
    );

    let config = QueryConfig::new("treasury_spends")
        .with_join(JoinConfig::left("categories", "c", "category_id", "c.id"))
        .with_column(ColumnSpec::new("c.category"))
        .with_column(ColumnSpec::new("c.subcategory"))
        .with_column(ColumnSpec::new("DOT_latest"));

    let drift = find_schema_drift(&config, &schema);
    assert_eq!(drift.len(), 1);
    assert_snapshot!(
        drift[0].to_string(),
        @"column 'c.subcategory' references unknown column of 'categories'"
    );
}
