// Filtering, search, sorting and scope tests against a real SQLite database

mod common;
use common::user_entity::Users;
use common::{names, setup_test_db};
use urlquery::{ParameterMap, QueryCompiler, QueryConfig, QueryError};

async fn fetch(config: QueryConfig, query: &str) -> Result<Vec<String>, QueryError> {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let params = ParameterMap::from_query_str(query);
    let users = QueryCompiler::new(config)
        .get_by_parameters::<Users>(&db, &params)
        .await?;
    Ok(names(&users).into_iter().map(String::from).collect())
}

async fn fetch_lenient(query: &str) -> Vec<String> {
    fetch(QueryConfig::extended(), query)
        .await
        .expect("lenient compile should not fail")
}

#[tokio::test]
async fn test_no_parameters_sorts_by_created_at() {
    assert_eq!(
        fetch_lenient("").await,
        vec!["Annie", "Dana", "Bob", "Carl", "Ann"]
    );
}

#[tokio::test]
async fn test_exact_match() {
    assert_eq!(fetch_lenient("name=Ann").await, vec!["Ann"]);
}

#[tokio::test]
async fn test_exact_match_on_boolean_column() {
    assert_eq!(fetch_lenient("active=1").await, vec!["Annie", "Carl", "Ann"]);
    assert_eq!(fetch_lenient("active=false").await, vec!["Dana", "Bob"]);
}

#[tokio::test]
async fn test_range_operators() {
    assert_eq!(
        fetch_lenient("gte[age]=20&lte[age]=45").await,
        vec!["Dana", "Carl", "Ann"]
    );
    assert_eq!(fetch_lenient("gt[age]=45").await, vec!["Annie"]);
    assert_eq!(fetch_lenient("lt[age]=20").await, vec!["Bob"]);
}

#[tokio::test]
async fn test_min_and_max_aliases() {
    assert_eq!(fetch_lenient("min[age]=45").await, vec!["Annie", "Dana"]);
    assert_eq!(fetch_lenient("max[age]=27").await, vec!["Bob", "Carl"]);
}

#[tokio::test]
async fn test_search_all_columns() {
    assert_eq!(fetch_lenient("search=ann").await, vec!["Annie", "Ann"]);
}

#[tokio::test]
async fn test_search_does_not_reach_hidden_column() {
    // every password contains "secret"
    assert!(fetch_lenient("search=secret").await.is_empty());
}

#[tokio::test]
async fn test_search_by_column() {
    assert_eq!(
        fetch_lenient("search=corp&search_by=email").await,
        vec!["Annie", "Dana"]
    );
}

#[tokio::test]
async fn test_search_is_grouped_with_other_conditions() {
    // (id LIKE .. OR name LIKE .. OR ..) AND active = true
    assert_eq!(fetch_lenient("active=1&search=an").await, vec!["Annie", "Ann"]);
}

#[tokio::test]
async fn test_sort_descending() {
    assert_eq!(
        fetch_lenient("order_by=age&order=desc").await,
        vec!["Annie", "Dana", "Ann", "Carl", "Bob"]
    );
    assert_eq!(
        fetch_lenient("search=ann&order_by=NAME&order=DESC").await,
        vec!["Annie", "Ann"]
    );
}

#[tokio::test]
async fn test_scopes() {
    assert_eq!(fetch_lenient("scopes[active]=1").await, vec!["Annie", "Carl", "Ann"]);
    assert_eq!(fetch_lenient("scopes[active]=0").await, vec!["Dana", "Bob"]);
    assert_eq!(
        fetch_lenient("scopes[older_than]=30").await,
        vec!["Annie", "Dana", "Ann"]
    );
    assert_eq!(
        fetch_lenient("scopes[active]=1&scopes[older_than]=30").await,
        vec!["Annie", "Ann"]
    );
}

#[tokio::test]
async fn test_lenient_mode_skips_invalid_names() {
    assert_eq!(
        fetch_lenient("nickname=x&password=Ann-secret&scopes[admin]=1&name=Bob").await,
        vec!["Bob"]
    );
}

#[tokio::test]
async fn test_strict_mode_rejects_unknown_column() {
    let err = fetch(QueryConfig::extended().strict(), "nickname=x")
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidParameter { ref parameter } if parameter == "nickname"));
}

#[tokio::test]
async fn test_strict_mode_rejects_hidden_column() {
    let err = fetch(QueryConfig::extended().strict(), "password=Ann-secret")
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidParameter { ref parameter } if parameter == "password"));
}

#[tokio::test]
async fn test_strict_mode_rejects_unknown_scope() {
    let err = fetch(QueryConfig::extended().strict(), "scopes[admin]=1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        QueryError::UnknownScope { ref scope, ref resource } if scope == "admin" && resource == "users"
    ));
}

#[tokio::test]
async fn test_hardened_columns_reject_hidden_sort() {
    let config = QueryConfig::extended()
        .strict()
        .with_validate_all_columns(true);
    let err = fetch(config, "order_by=password").await.unwrap_err();
    assert!(matches!(err, QueryError::InvalidParameter { .. }));

    let lenient = QueryConfig::extended().with_validate_all_columns(true);
    assert_eq!(
        fetch(lenient, "order_by=password&gte[password]=a").await.unwrap(),
        vec!["Annie", "Dana", "Bob", "Carl", "Ann"]
    );
}

#[tokio::test]
async fn test_basic_variant_treats_range_names_as_columns() {
    // `lt` is an ordinary parameter here; its map value is never matched
    assert_eq!(fetch(QueryConfig::basic(), "lt[age]=20").await.unwrap().len(), 5);

    assert_eq!(fetch(QueryConfig::basic(), "name=Carl").await.unwrap(), vec!["Carl"]);
}

#[tokio::test]
async fn test_json_parameters() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let params = ParameterMap::from_json(serde_json::json!({
        "gte": {"age": 30},
        "order_by": "age",
        "scopes": {"active": "1"}
    }));
    let users = QueryCompiler::new(QueryConfig::extended())
        .get_by_parameters::<Users>(&db, &params)
        .await
        .unwrap();
    assert_eq!(names(&users), vec!["Ann", "Annie"]);
}
