use opengov_query::convert::{
    apply_view_state, build_facet_query_config, convert_filters_to_query_config,
    filter_state_to_query_filters, resolve_filter_group_aliases, sorting_state_to_order_by,
    ColumnRefMap, FacetQueryInput,
};
use opengov_query::model::{
    ColumnSpec, FilterCondition, FilterGroup, FilterOperator, FilterValue, JoinConfig,
    LogicalOperator, OrderBy, QueryConfig, QueryFilters,
};
use opengov_query::view::{ColumnFilter, SortingEntry, ViewState};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Counts WARN events seen while installed.
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_warnings(f: impl FnOnce()) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&count)));
    tracing::subscriber::with_default(subscriber, f);
    count.load(Ordering::SeqCst)
}

fn category_map() -> ColumnRefMap {
    ColumnRefMap::from([
        ("category".to_string(), "c.category".to_string()),
        ("subcategory".to_string(), "c.subcategory".to_string()),
    ])
}

#[test]
fn test_in_filter_scenario() {
    let filters = filter_state_to_query_filters(&[ColumnFilter::new(
        "status",
        json!(["Active", "Pending"]),
    )]);
    assert_eq!(
        serde_json::to_value(&filters).unwrap(),
        json!([{"column": "status", "operator": "IN", "value": ["Active", "Pending"]}])
    );
}

#[test]
fn test_filter_value_types() {
    let filters = filter_state_to_query_filters(&[
        ColumnFilter::new("title", "treasury"),
        ColumnFilter::new("title", ""),
        ColumnFilter::new("track", json!([])),
        ColumnFilter::new("beneficiary", json!(null)),
        ColumnFilter::new("id", 42),
        ColumnFilter::new("executed", true),
    ]);

    let operators: Vec<_> = filters.iter().map(|f| f.operator).collect();
    assert_eq!(
        operators,
        vec![
            FilterOperator::Like,
            FilterOperator::Like,
            FilterOperator::In,
            FilterOperator::IsNull,
            FilterOperator::Eq,
            FilterOperator::Eq,
        ]
    );
    assert_eq!(filters[0].value, FilterValue::from("%treasury%"));
    assert_eq!(filters[1].value, FilterValue::from("%%"));
    assert_eq!(filters[2].value, FilterValue::List(vec![]));
    assert!(filters[3].value.is_null());
    assert_eq!(filters[4].value, FilterValue::from(42));
    assert_eq!(filters[5].value, FilterValue::Bool(true));
}

#[test]
fn test_sort_mapping_scenario() {
    let order_by =
        sorting_state_to_order_by(&[SortingEntry::asc("category")], None, Some(&category_map()));
    assert_eq!(
        serde_json::to_value(&order_by).unwrap(),
        json!([{"column": "c.category", "direction": "ASC"}])
    );
}

#[test]
fn test_sort_resolution_order() {
    let config = QueryConfig::new("all_spending")
        .with_column(ColumnSpec::new("q.year_quarter").with_alias("quarter"))
        .with_column(ColumnSpec::new("c.category").with_alias("category"));
    let map = ColumnRefMap::from([("category".to_string(), "cat.name".to_string())]);

    let order_by = sorting_state_to_order_by(
        &[
            SortingEntry::desc("category"),
            SortingEntry::asc("quarter"),
            SortingEntry::desc("DOT_latest"),
        ],
        Some(&config),
        Some(&map),
    );

    // Map beats alias lookup, alias lookup beats the raw id; priority order kept.
    assert_eq!(
        order_by,
        vec![
            OrderBy::desc("cat.name"),
            OrderBy::asc("q.year_quarter"),
            OrderBy::desc("DOT_latest"),
        ]
    );
}

#[test]
fn test_alias_resolution_keeps_tree_and_input() {
    let group = FilterGroup::and(vec![
        FilterCondition::new("category", FilterOperator::Eq, "Development").into(),
        FilterGroup::or(vec![
            FilterCondition::new("subcategory", FilterOperator::Eq, "Tooling").into(),
            FilterCondition::is_null("subcategory").into(),
        ])
        .into(),
        FilterCondition::new("DOT_latest", FilterOperator::Gt, 1000).into(),
    ]);
    let before = group.clone();

    let resolved = resolve_filter_group_aliases(&group, &category_map());

    assert_eq!(group, before);
    assert_eq!(
        serde_json::to_value(&resolved).unwrap(),
        json!({
            "operator": "AND",
            "conditions": [
                {"column": "c.category", "operator": "=", "value": "Development"},
                {
                    "operator": "OR",
                    "conditions": [
                        {"column": "c.subcategory", "operator": "=", "value": "Tooling"},
                        {"column": "c.subcategory", "operator": "IS NULL", "value": null}
                    ]
                },
                {"column": "DOT_latest", "operator": ">", "value": 1000}
            ]
        })
    );
}

#[test]
fn test_filter_group_always_wins() {
    let legacy_sets = [
        vec![],
        vec![ColumnFilter::new("status", "Executed")],
        vec![
            ColumnFilter::new("status", json!(["Executed", "Rejected"])),
            ColumnFilter::new("track", 33),
        ],
    ];
    let groups = [
        FilterGroup::and(vec![
            FilterCondition::new("category", FilterOperator::Eq, "Outreach").into(),
        ]),
        FilterGroup::or(vec![
            FilterCondition::is_not_null("beneficiary").into(),
            FilterGroup::and(vec![
                FilterCondition::new("track", FilterOperator::Eq, 0).into(),
            ])
            .into(),
        ]),
    ];

    for legacy in &legacy_sets {
        for group in &groups {
            let result = convert_filters_to_query_config(legacy, Some(group), None);
            assert_eq!(result, QueryFilters::Group(group.clone()));

            let mapped =
                convert_filters_to_query_config(legacy, Some(group), Some(&category_map()));
            assert_eq!(
                mapped,
                QueryFilters::Group(resolve_filter_group_aliases(group, &category_map()))
            );
        }
    }
}

#[test]
fn test_empty_group_falls_back_to_legacy() {
    let legacy = vec![ColumnFilter::new("status", "Exec")];
    let empty = FilterGroup::new(LogicalOperator::And);

    let result = convert_filters_to_query_config(&legacy, Some(&empty), None);
    assert_eq!(result, QueryFilters::List(filter_state_to_query_filters(&legacy)));

    let nothing = convert_filters_to_query_config(&[], Some(&empty), None);
    assert_eq!(nothing, QueryFilters::List(vec![]));
    assert_eq!(serde_json::to_value(&nothing).unwrap(), json!([]));
}

#[test]
#[allow(deprecated)]
fn test_group_to_filters_flattens_nested_groups() {
    use opengov_query::convert::group_to_filters;

    let group = FilterGroup::or(vec![
        FilterCondition::new("status", FilterOperator::Eq, "Executed").into(),
        FilterGroup::and(vec![
            FilterCondition::new("track", FilterOperator::Eq, 2).into(),
            FilterGroup::or(vec![FilterCondition::is_null("beneficiary").into()]).into(),
        ])
        .into(),
    ]);

    let flat = group_to_filters(&group);
    let columns: Vec<_> = flat.iter().map(|c| c.column.as_str()).collect();
    assert_eq!(columns, vec!["status", "track", "beneficiary"]);
}

#[test]
#[allow(deprecated)]
fn test_group_to_filters_warns_per_call_and_nested_group() {
    use opengov_query::convert::group_to_filters;

    let flat = FilterGroup::or(vec![
        FilterCondition::new("status", FilterOperator::Eq, "Executed").into(),
        FilterCondition::new("status", FilterOperator::Eq, "Rejected").into(),
    ]);
    assert_eq!(count_warnings(|| assert_eq!(group_to_filters(&flat).len(), 2)), 1);

    let nested = FilterGroup::or(vec![
        FilterCondition::new("status", FilterOperator::Eq, "Executed").into(),
        FilterGroup::and(vec![
            FilterCondition::new("track", FilterOperator::Eq, 2).into(),
            FilterGroup::or(vec![FilterCondition::is_null("beneficiary").into()]).into(),
        ])
        .into(),
        FilterGroup::and(vec![FilterCondition::is_not_null("proposer").into()]).into(),
    ]);
    // One for the call, one for each of the three nested groups.
    assert_eq!(count_warnings(|| assert_eq!(group_to_filters(&nested).len(), 4)), 4);
}

#[test]
fn test_facet_query_config() {
    let joins = vec![JoinConfig::left("categories", "c", "category_id", "c.id")];
    let columns = vec!["category".to_string(), "status".to_string()];
    let filters = QueryFilters::List(vec![FilterCondition::new(
        "subcategory",
        FilterOperator::Eq,
        "Tooling",
    )]);
    let map = category_map();

    let facet = build_facet_query_config(FacetQueryInput {
        joins: &joins,
        filters: Some(&filters),
        column_id_to_ref: Some(&map),
        ..FacetQueryInput::new("treasury_spends", &columns)
    });

    assert_eq!(facet.columns, vec!["c.category", "status"]);
    assert_eq!(facet.joins, joins);
    assert_eq!(
        facet.filters,
        Some(QueryFilters::List(vec![FilterCondition::new(
            "c.subcategory",
            FilterOperator::Eq,
            "Tooling"
        )]))
    );
}

#[test]
fn test_apply_view_state_to_base_query() {
    let base = QueryConfig::new("referenda")
        .with_column(ColumnSpec::new("id"))
        .with_column(ColumnSpec::new("status"))
        .with_order_by(OrderBy::desc("id"));

    let untouched = apply_view_state(&base, &ViewState::default(), None);
    assert_eq!(untouched, base);

    let state = ViewState {
        sorting: vec![SortingEntry::asc("status")],
        column_filters: vec![ColumnFilter::new("status", "Ongoing")],
        ..ViewState::default()
    };
    let applied = apply_view_state(&base, &state, None);
    assert_eq!(applied.order_by, vec![OrderBy::asc("status")]);
    assert_eq!(
        applied.filters,
        Some(QueryFilters::List(vec![FilterCondition::new(
            "status",
            FilterOperator::Like,
            "%Ongoing%"
        )]))
    );
}
