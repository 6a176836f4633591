//! Integration tests for the full query pipeline
//!
//! Every test runs against its own in-memory SQLite database through the
//! sqlx connector, so no external server is needed.

use glider::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
struct User {
    id: i64,
    name: String,
    age: i64,
}

impl FieldAccess for User {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "name" => Some(Value::from(&self.name)),
            "age" => Some(Value::from(self.age)),
            _ => None,
        }
    }

    fn field_names(&self) -> Vec<String> {
        vec!["id".to_string(), "name".to_string(), "age".to_string()]
    }
}

impl ResultMapper for User {
    fn properties(&self) -> &'static [&'static str] {
        &["id", "name", "age"]
    }

    fn map_field(&mut self, column: &str, value: Value) {
        match column {
            "id" => self.id = value.as_i64().unwrap_or_default(),
            "name" => self.name = value.as_str().unwrap_or_default().to_string(),
            "age" => self.age = value.as_i64().unwrap_or_default(),
            _ => {}
        }
    }
}

fn connect(auto_commit: bool) -> anyhow::Result<Platform> {
    let profile = ConnectionProfile::new("sqlite", "sqlite::memory:").with_auto_commit(auto_commit);
    let glider = Glider::new(AppConfig::single("default", profile))?;
    let mut platform = glider.connect_default()?;

    QueryBuilder::new(&mut platform)
        .raw_query(
            "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, age INTEGER NOT NULL)",
        )
        .execute()?;

    for (name, age) in [("Ann", 31), ("Bob", 25), ("Cid", 47), ("Dee", 25)] {
        QueryBuilder::new(&mut platform)
            .insert("users", [("name", Value::from(name)), ("age", Value::from(age))])?;
    }
    Ok(platform)
}

#[test]
fn test_insert_reports_last_id() -> anyhow::Result<()> {
    let mut platform = connect(false)?;

    let result = QueryBuilder::new(&mut platform)
        .insert("users", vec![("name", Value::from("Eve")), ("age", Value::from(19))])?;

    assert_eq!(result.query_type(), QueryType::Insert);
    assert_eq!(result.rows_affected(), 1);
    assert_eq!(result.last_insert_id(), Some(5));
    Ok(())
}

#[test]
fn test_select_with_mapper() -> anyhow::Result<()> {
    let mut platform = connect(true)?;

    let users = QueryBuilder::new(&mut platform)
        .select(&["id", "name", "age"])
        .from("users")
        .where_("age", 25)
        .order_by(&["id"])
        .get_as::<User>()?;

    let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Bob", "Dee"]);
    assert_eq!(
        users.statement().map(|s| s.sql()),
        Some("SELECT id,name,age FROM users WHERE age=? ORDER BY id")
    );
    Ok(())
}

#[test]
fn test_select_generic_rows() -> anyhow::Result<()> {
    let mut platform = connect(true)?;

    let mut rows = QueryBuilder::new(&mut platform)
        .select(&["name"])
        .from("users")
        .where_between("age", 26, 50)
        .order_by(&["age"])
        .get()?;

    assert_eq!(rows.size(), 2);
    assert_eq!(rows.first().and_then(|r| r.field("name")), Some(Value::from("Ann")));
    assert_eq!(rows.last().and_then(|r| r.field("name")), Some(Value::from("Cid")));
    Ok(())
}

#[test]
fn test_where_in_and_like() -> anyhow::Result<()> {
    let mut platform = connect(true)?;

    let users = QueryBuilder::new(&mut platform)
        .select(&["id", "name", "age"])
        .from("users")
        .where_in("age", vec![25, 47])
        .where_not_like("name", "D%")
        .get_as::<User>()?;

    let mut names: Vec<String> = users.into_vec().into_iter().map(|u| u.name).collect();
    names.sort();
    assert_eq!(names, vec!["Bob".to_string(), "Cid".to_string()]);
    Ok(())
}

#[test]
fn test_raw_query_with_list_parameter() -> anyhow::Result<()> {
    let mut platform = connect(true)?;

    let rows = QueryBuilder::new(&mut platform)
        .raw_query("SELECT name FROM users WHERE name IN ( :names ) ORDER BY name")
        .set_param_list("names", vec!["Cid", "Ann"])
        .get()?;

    let names: Vec<Option<Value>> = rows.iter().map(|r| r.field("name")).collect();
    assert_eq!(names, vec![Some(Value::from("Ann")), Some(Value::from("Cid"))]);
    Ok(())
}

#[test]
fn test_raw_select_after_comment() -> anyhow::Result<()> {
    let mut platform = connect(true)?;

    let builder = QueryBuilder::new(&mut platform).raw_query("-- all users\nSELECT * FROM users");
    assert_eq!(builder.get_query_type(), QueryType::Select);
    let rows = builder.get()?;
    assert_eq!(rows.size(), 4);

    let rows = QueryBuilder::new(&mut platform)
        .raw_query("/* adults */ SELECT name FROM users WHERE age > 40")
        .get()?;
    assert_eq!(rows.size(), 1);
    Ok(())
}

#[test]
fn test_empty_select_describes_columns() -> anyhow::Result<()> {
    let mut platform = connect(true)?;

    let rows = QueryBuilder::new(&mut platform)
        .select(&["id", "name"])
        .from("users")
        .where_("age", 99)
        .get()?;

    assert!(rows.is_empty());
    let columns = rows.statement().map(|s| s.columns().to_vec());
    assert_eq!(columns, Some(vec!["id".to_string(), "name".to_string()]));
    Ok(())
}

#[test]
fn test_insert_ignores_earlier_conditions() -> anyhow::Result<()> {
    let mut platform = connect(true)?;

    let result = QueryBuilder::new(&mut platform)
        .where_("name", "x")
        .insert("users", [("name", Value::from("Bob")), ("age", Value::from(20))])?;
    assert_eq!(result.sql(), "INSERT INTO users (name,age) VALUES ( ? , ? )");
    assert_eq!(result.rows_affected(), 1);
    Ok(())
}

#[test]
fn test_aggregates() -> anyhow::Result<()> {
    let mut platform = connect(true)?;

    let mut rows = QueryBuilder::new(&mut platform)
        .count("id", "total")
        .sum("age", "years")
        .max("age", "oldest")
        .from("users")
        .get()?;

    let row = rows.first().and_then(|r| r.as_row()).cloned();
    let row = row.ok_or_else(|| anyhow::anyhow!("no aggregate row"))?;
    assert_eq!(row.get("total"), Some(&Value::Integer(4)));
    assert_eq!(row.get("years"), Some(&Value::Integer(128)));
    assert_eq!(row.get("oldest"), Some(&Value::Integer(47)));
    Ok(())
}

#[test]
fn test_group_concat_with_separator() -> anyhow::Result<()> {
    let mut platform = connect(true)?;

    let rows = QueryBuilder::new(&mut platform)
        .select(&["age"])
        .group_concat("name", "names", "|")
        .from("users")
        .where_("age", 25)
        .get()?;

    let names = rows.iter().next().and_then(|r| r.field("names"));
    let names = names.and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
    let mut parts: Vec<&str> = names.split('|').collect();
    parts.sort();
    assert_eq!(parts, vec!["Bob", "Dee"]);
    Ok(())
}

#[test]
fn test_update_and_delete() -> anyhow::Result<()> {
    let mut platform = connect(false)?;

    let updated = QueryBuilder::new(&mut platform)
        .where_("age", 25)
        .update("users", [("age", Value::from(26))])?;
    assert_eq!(updated.rows_affected(), 2);
    assert_eq!(updated.sql(), "UPDATE users SET age=? WHERE age=?");

    let deleted = QueryBuilder::new(&mut platform)
        .where_("name", "Ann")
        .or_where("age", 26)
        .delete("users")?;
    assert_eq!(deleted.rows_affected(), 3);

    let remaining = QueryBuilder::new(&mut platform)
        .select(&["id", "name", "age"])
        .from("users")
        .get_as::<User>()?;
    assert_eq!(remaining.size(), 1);
    assert_eq!(remaining.all()[0].name, "Cid");
    Ok(())
}

#[test]
fn test_limit_and_offset() -> anyhow::Result<()> {
    let mut platform = connect(true)?;

    let users = QueryBuilder::new(&mut platform)
        .select(&["id", "name", "age"])
        .from("users")
        .order_by(&["id"])
        .limit(2, 1)
        .get_as::<User>()?;

    let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![2, 3]);
    Ok(())
}

#[test]
fn test_failed_insert_rolls_back() -> anyhow::Result<()> {
    let mut platform = connect(false)?;

    let err = QueryBuilder::new(&mut platform)
        .insert("missing", [("name", Value::from("Zed"))])
        .unwrap_err();
    match err {
        QueryError::Execution { sql, .. } => {
            assert_eq!(sql, "INSERT INTO missing (name) VALUES ( ? )");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The connection is usable again after the rollback
    let users = QueryBuilder::new(&mut platform)
        .select(&["id", "name", "age"])
        .from("users")
        .get_as::<User>()?;
    assert_eq!(users.size(), 4);
    Ok(())
}

#[test]
fn test_collection_grouping() -> anyhow::Result<()> {
    let mut platform = connect(true)?;

    let users = QueryBuilder::new(&mut platform)
        .select(&["id", "name", "age"])
        .from("users")
        .order_by(&["id"])
        .get_as::<User>()?;

    assert_eq!(users.max("age"), Some(Value::Integer(47)));
    let groups = users.group_by("age");
    let keys: Vec<Value> = groups.iter().map(|g| g.key.clone()).collect();
    assert_eq!(
        keys,
        vec![Value::Integer(31), Value::Integer(25), Value::Integer(47)]
    );
    assert_eq!(groups.offset(1).map(|g| g.items.len()), Some(2));
    Ok(())
}

#[test]
fn test_unregistered_backend_falls_back() -> anyhow::Result<()> {
    let config = AppConfig::from_toml_str(
        r#"
        default = "primary"

        [connections.primary]
        backend = "oracle"
        database = "app"
        fallback = "local"

        [connections.local]
        backend = "sqlite"
        database = "sqlite::memory:"
        "#,
    )?;

    let platform = Glider::new(config)?.connect_default()?;
    assert_eq!(platform.profile_name(), "local");
    assert_eq!(platform.name(), "sqlite");
    assert_eq!(platform.dialect(), Dialect::Sqlite);
    Ok(())
}

#[test]
fn test_unknown_backend_without_fallback() {
    let profile = ConnectionProfile::new("oracle", "app");
    let glider = Glider::new(AppConfig::single("default", profile)).unwrap();
    let err = glider.connect_default().unwrap_err();
    assert!(matches!(
        err,
        GliderError::Platform(platform::PlatformError::NoBackend { .. })
    ));
}
