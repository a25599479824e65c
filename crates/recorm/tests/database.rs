mod common;

use common::{seed, setup};
use recorm::{
    Condition, DatabaseFactory, DatabaseProfiles, Logic, OrmError, QueryType, RowExt, Value, row,
};

#[test]
fn select_fetches_rows_in_order() {
    let (mut db, _) = setup();
    seed(&mut db);

    db.select(&["id", "name"])
        .from("users")
        .order_by("id", "asc");
    assert!(db.execute());
    let first = db.fetch().unwrap();
    assert_eq!(first.try_get_column::<String>("name").unwrap(), "alice");
    let second = db.fetch().unwrap();
    assert_eq!(second.try_get_column::<i64>("id").unwrap(), 2);
    assert!(db.fetch().is_none());
}

#[test]
fn get_one_and_get_all() {
    let (mut db, _) = setup();
    seed(&mut db);

    db.select(&["title"]).from("posts").and_where(("user_id", "=", 1));
    let row = db.get_one().unwrap();
    assert_eq!(row.get("title"), Some(&Value::from("first")));
    assert_eq!(
        db.last_query(),
        Some("SELECT `title` FROM `posts` WHERE `user_id` = ? LIMIT 1")
    );

    db.select_all(true).from("posts");
    assert_eq!(db.get_all().len(), 3);
}

#[test]
fn join_group_and_having_run_against_store() {
    let (mut db, _) = setup();
    seed(&mut db);

    db.select(&["users.name"])
        .select_raw("COUNT(posts.id) AS total")
        .from("users")
        .inner_join("posts", None)
        .on("posts.user_id = users.id")
        .group_by(&["users.name"])
        .having("COUNT(posts.id) > ?", vec![Value::Int(1)]);
    let rows = db.get_all();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].try_get_column::<String>("name").unwrap(), "alice");
    assert_eq!(rows[0].try_get_column::<i64>("total").unwrap(), 2);
}

#[test]
fn where_groups_bind_in_order() {
    let (mut db, _) = setup();
    seed(&mut db);

    db.select(&["title"])
        .from("posts")
        .and_where_group(
            Logic::Or,
            vec![
                Condition::eq("title", "first"),
                Condition::eq("title", "third"),
            ],
        )
        .and_where(("user_id", "=", 2));
    let rows = db.get_all();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("title"), Some(&Value::from("third")));
}

#[test]
fn insert_with_function_field() {
    let (mut db, _) = setup();
    db.insert(
        "profiles",
        row! { "user_id" => 7 },
        &[("bio", "UPPER('made by sql')")],
    );
    assert!(db.execute());
    assert_eq!(db.insert_id().unwrap(), Value::Int(1));

    db.select(&["bio"]).from("profiles");
    let row = db.get_one().unwrap();
    assert_eq!(row.get("bio"), Some(&Value::from("MADE BY SQL")));
}

#[test]
fn update_and_delete_report_affected_rows() {
    let (mut db, _) = setup();
    seed(&mut db);

    db.update("posts", row! { "title" => "x" })
        .and_where(("user_id", "=", 1));
    assert!(db.execute());
    assert_eq!(db.affected_rows(), 2);

    db.delete("posts").and_where(Condition::in_list("id", vec![1, 3]));
    assert!(db.execute());
    assert_eq!(db.affected_rows(), 2);
    assert_eq!(db.last_query_type(), Some(QueryType::Delete));
}

#[test]
fn failed_statement_keeps_sql_and_values() {
    let (mut db, _) = setup();
    db.select(&["nope"]).from("missing").and_where(("id", "=", 5));
    assert!(!db.execute());
    assert!(db.get_one().is_none());

    let err = db.take_last_error().unwrap();
    assert!(matches!(err, OrmError::Query { .. }));
    assert!(db.last_error().is_none());
}

#[test]
fn rollback_discards_writes() {
    let (mut db, _) = setup();
    assert!(db.begin());
    db.insert("users", row! { "name" => "tmp" }, &[]);
    assert!(db.execute());
    assert!(db.rollback());

    db.select_all(true).from("users");
    assert!(db.get_all().is_empty());

    assert!(db.begin());
    db.insert("users", row! { "name" => "kept" }, &[]);
    assert!(db.execute());
    assert!(db.commit());
    db.select_all(true).from("users");
    assert_eq!(db.get_all().len(), 1);
}

#[test]
fn factory_opens_default_profile() {
    let profiles = DatabaseProfiles::from_toml_str(
        r#"
        [default]
        driver = "sqlite"
        database = ":memory:"
        "#,
    )
    .unwrap();
    let mut factory = DatabaseFactory::new(profiles);
    let db = factory.default_database().unwrap().unwrap();
    db.run("CREATE TABLE kv (k TEXT, v TEXT)", vec![]).unwrap();
    db.run("INSERT INTO kv VALUES (?, ?)", vec!["a".into(), "b".into()])
        .unwrap();
    db.run("SELECT v FROM kv WHERE k = ?", vec!["a".into()]).unwrap();
    assert_eq!(db.fetch().unwrap().get("v"), Some(&Value::from("b")));
}
