use super::*;
use crate::condition::{Condition, Logic, Op};
use crate::row;

fn placeholders(sql: &str) -> usize {
    sql.matches('?').count()
}

#[test]
fn test_select_columns_and_aliases() {
    let mut qb = QueryBuilder::new();
    qb.select(&["id", "age value", "users.age value1", "users.name"])
        .from("users");
    assert_eq!(
        qb.get_query(),
        "SELECT `id`, `age` AS value, `users`.`age` AS value1, `users`.`name` FROM `users`"
    );
    // Idempotent emission.
    assert_eq!(qb.get_query(), qb.get_query());
    assert_eq!(qb.get_sql(), qb.get_query());
}

#[test]
fn test_select_empty_is_star() {
    let mut qb = QueryBuilder::new();
    qb.select::<&str>(&[]).from("users");
    assert_eq!(qb.get_sql(), "SELECT * FROM `users`");
}

#[test]
fn test_select_as_and_raw() {
    let mut qb = QueryBuilder::new();
    qb.select(&["id"])
        .select_as(&[("users.name", "username")])
        .select_raw("COUNT(*) AS total")
        .from("users u");
    assert_eq!(
        qb.get_sql(),
        "SELECT `id`, `users`.`name` AS username, COUNT(*) AS total FROM `users` AS u"
    );
}

#[test]
fn test_group_by() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true).from("users").group_by(&["id", "role"]);
    assert_eq!(qb.get_sql(), "SELECT * FROM `users` GROUP BY (`id`, `role`)");
}

#[test]
fn test_order_by_accumulates() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true)
        .from("users")
        .order_by("name", "asc")
        .order_by("age", " DESC ");
    assert_eq!(qb.get_sql(), "SELECT * FROM `users` ORDER BY name ASC, age DESC");
}

#[test]
fn test_order_by_invalid_is_noop() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true)
        .from("users")
        .order_by("", "ASC")
        .order_by("name", "SIDEWAYS");
    assert_eq!(qb.get_sql(), "SELECT * FROM `users`");
}

#[test]
fn test_having_and_limit() {
    let mut qb = QueryBuilder::new();
    qb.select(&["role"])
        .select_raw("COUNT(*) AS user_count")
        .from("users")
        .group_by(&["role"])
        .having("user_count > ?", vec![Value::Int(1)])
        .limit(10, Some(10));
    assert_eq!(
        qb.get_sql(),
        "SELECT `role`, COUNT(*) AS user_count FROM `users` GROUP BY (`role`) HAVING user_count > ? LIMIT 10, 10"
    );
    assert_eq!(qb.get_bind_values(), vec![Value::Int(1)]);
}

#[test]
fn test_order_by_precedes_limit() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true).from("users").limit(5, None).order_by("id", "DESC");
    assert_eq!(qb.get_sql(), "SELECT * FROM `users` ORDER BY id DESC LIMIT 5");
}

#[test]
fn test_limit_one_keeps_offset() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true).from("posts").limit(10, Some(20)).limit_one();
    assert_eq!(qb.get_sql(), "SELECT * FROM `posts` LIMIT 20, 1");

    qb.select_all(true).from("posts").limit_one();
    assert_eq!(qb.get_sql(), "SELECT * FROM `posts` LIMIT 1");

    qb.select_all(true).from("posts").limit(0, None).limit_one();
    assert_eq!(qb.get_sql(), "SELECT * FROM `posts` LIMIT 0");
}

#[test]
fn test_wrap_where_groups_existing_clause() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true)
        .from("posts")
        .and_where(("title", "=", "a"))
        .or_where(("title", "=", "b"));
    let _ = qb.get_sql();
    qb.wrap_where().and_where(("user_id", "=", 1));
    assert_eq!(
        qb.get_sql(),
        "SELECT * FROM `posts` WHERE (`title` = ? OR `title` = ?) AND `user_id` = ?"
    );
    assert_eq!(
        qb.get_bind_values(),
        vec![Value::from("a"), Value::from("b"), Value::Int(1)]
    );

    let mut empty = QueryBuilder::new();
    empty.select_all(true).from("posts").wrap_where();
    assert_eq!(empty.get_sql(), "SELECT * FROM `posts`");
}

#[test]
fn test_having_before_where_keeps_value_order() {
    let mut qb = QueryBuilder::new();
    qb.select(&["role"])
        .from("users")
        .group_by(&["role"])
        .having("COUNT(*) > ?", vec![Value::Int(3)])
        .and_where(("active", "=", true));
    assert_eq!(
        qb.get_sql(),
        "SELECT `role` FROM `users` WHERE `active` = ? GROUP BY (`role`) HAVING COUNT(*) > ?"
    );
    assert_eq!(
        qb.get_bind_values(),
        vec![Value::Bool(true), Value::Int(3)]
    );
}

#[test]
fn test_joins() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true)
        .from("orders")
        .inner_join("users", None)
        .using("user_id")
        .left_join("db.profiles", Some("profiles.user_id = users.id"))
        .right_join("items", None)
        .on("items.order_id = orders.id")
        .cross_join("regions", None);
    assert_eq!(
        qb.get_sql(),
        "SELECT * FROM `orders` INNER JOIN `users` USING(`user_id`) \
         LEFT JOIN `db`.`profiles` ON profiles.user_id = users.id \
         RIGHT JOIN `items` ON items.order_id = orders.id \
         CROSS JOIN `regions`"
    );
}

#[test]
fn test_using_dotted_field() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true)
        .from("orders")
        .inner_join("users", None)
        .using("users.user_id");
    assert_eq!(
        qb.get_sql(),
        "SELECT * FROM `orders` INNER JOIN `users` USING(`users`.`user_id`)"
    );
}

#[test]
fn test_insert_plain_then_function_fields() {
    let mut qb = QueryBuilder::new();
    qb.insert(
        "users",
        row! { "name" => "John", "email" => "john@example.com" },
        &[("created", "CURDATE()")],
    );
    assert_eq!(
        qb.get_sql(),
        "INSERT INTO `users` (`name`, `email`, `created`) VALUES (?, ?, (CURDATE()))"
    );
    assert_eq!(
        qb.get_bind_values(),
        vec![Value::from("John"), Value::from("john@example.com")]
    );
}

#[test]
fn test_update_with_raw_where() {
    let mut qb = QueryBuilder::new();
    qb.update_with(
        "users",
        row! { "users.name" => "John", "value" => 10 },
        Some("id = 1".into()),
        None,
    );
    assert_eq!(
        qb.get_sql(),
        "UPDATE `users`  SET `users`.`name` = ?, `value` = ? WHERE id = 1"
    );
    assert_eq!(qb.get_bind_values(), vec![Value::from("John"), Value::Int(10)]);
}

#[test]
fn test_update_with_join_and_mapping() {
    let mut qb = QueryBuilder::new();
    qb.update_with(
        "users",
        row! { "users.active" => false },
        Some(row! { "roles.name" => "guest" }.into()),
        Some("INNER JOIN `roles` ON roles.id = users.role_id"),
    );
    assert_eq!(
        qb.get_sql(),
        "UPDATE `users` INNER JOIN `roles` ON roles.id = users.role_id SET `users`.`active` = ? WHERE `roles`.`name` = ?"
    );
    assert_eq!(qb.get_bind_values(), vec![Value::Bool(false), Value::from("guest")]);
}

#[test]
fn test_update_then_where() {
    let mut qb = QueryBuilder::new();
    qb.update("users", row! { "name" => "x" })
        .and_where(("id", "=", 4));
    assert_eq!(qb.get_sql(), "UPDATE `users`  SET `name` = ? WHERE `id` = ?");
    assert_eq!(qb.get_bind_values(), vec![Value::from("x"), Value::Int(4)]);
}

#[test]
fn test_delete_with_mapping() {
    let mut qb = QueryBuilder::new();
    qb.delete_with("users", Some(row! { "id" => 1 }.into()));
    assert_eq!(qb.get_sql(), "DELETE FROM `users` WHERE `id` = ?");
    assert_eq!(qb.get_bind_values(), vec![Value::Int(1)]);
}

#[test]
fn test_delete_then_raw_where() {
    let mut qb = QueryBuilder::new();
    qb.delete("users").and_where("id = 1");
    assert_eq!(qb.get_sql(), "DELETE FROM `users` WHERE id = 1");
    assert!(qb.get_bind_values().is_empty());
}

#[test]
fn test_where_and_or() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true)
        .from("users")
        .and_where("id != 1")
        .and_where(("age > ?", 18))
        .or_where(("name", "LIKE", "a%"));
    assert_eq!(
        qb.get_sql(),
        "SELECT * FROM `users` WHERE id != 1 AND age > ? OR `name` LIKE ?"
    );
    assert_eq!(qb.get_bind_values(), vec![Value::Int(18), Value::from("a%")]);
}

#[test]
fn test_where_groups() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true)
        .from("users")
        .or_where_group(Logic::Or, vec![row! { "id" => 1, "id1" => 2 }.into()])
        .or_where_group(Logic::And, vec![row! { "id" => 3, "id1" => 4 }.into()]);
    assert_eq!(
        qb.get_sql(),
        "SELECT * FROM `users` WHERE (`id` = ? OR `id1` = ?) OR (`id` = ? AND `id1` = ?)"
    );
    assert_eq!(
        qb.get_bind_values(),
        vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
    );
}

#[test]
fn test_where_group_of_tuples() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true)
        .from("users")
        .and_where(("active", "=", 1))
        .and_where_group(
            Logic::Or,
            vec![Condition::new("age", Op::Lt(18)), Condition::new("age", Op::Gt(65))],
        );
    assert_eq!(
        qb.get_sql(),
        "SELECT * FROM `users` WHERE `active` = ? AND (`age` < ? OR `age` > ?)"
    );
}

#[test]
fn test_where_in_list() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true)
        .from("posts")
        .and_where(Condition::in_list("user_id", vec![1, 2]));
    assert_eq!(qb.get_sql(), "SELECT * FROM `posts` WHERE `user_id` IN (?, ?)");
}

#[test]
fn test_invalid_arity_surfaces_error() {
    let err = Condition::from_args(vec![
        "id".into(),
        "=".into(),
        1.into(),
        2.into(),
    ])
    .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_reset_isolation() {
    let mut qb = QueryBuilder::new();
    qb.select(&["id"])
        .from("users")
        .inner_join("roles", Some("roles.id = users.role_id"))
        .and_where(("id", "=", 1))
        .order_by("id", "ASC")
        .limit(1, None);
    let _ = qb.get_sql();

    qb.delete("sessions");
    assert_eq!(qb.get_sql(), "DELETE FROM `sessions`");
    assert!(qb.get_bind_values().is_empty());

    qb.reset();
    assert_eq!(qb.get_where(), "");
    assert_eq!(qb.kind(), None);
    assert!(qb.get_bind_values().is_empty());
}

#[test]
fn test_get_sql_cache_invalidated_by_mutation() {
    let mut qb = QueryBuilder::new();
    qb.select_all(true).from("users");
    assert_eq!(qb.get_sql(), "SELECT * FROM `users`");
    qb.and_where(("id", "=", 1));
    assert_eq!(qb.get_sql(), "SELECT * FROM `users` WHERE `id` = ?");
}

#[test]
fn test_select_all_without_reset_keeps_conditions() {
    let mut qb = QueryBuilder::new();
    qb.select(&["id"]).from("users").and_where(("id", "=", 2));
    qb.select_all(false);
    assert_eq!(qb.get_sql(), "SELECT * FROM `users` WHERE `id` = ?");
    assert_eq!(qb.get_bind_values(), vec![Value::Int(2)]);
}

#[test]
fn test_raw_statement() {
    let mut qb = QueryBuilder::new();
    qb.raw("SELECT 1 + ?", vec![Value::Int(1)]);
    assert_eq!(qb.kind(), Some(StatementKind::Raw));
    assert_eq!(qb.to_string(), "SELECT 1 + ?");
    assert_eq!(qb.build(), ("SELECT 1 + ?".to_string(), vec![Value::Int(1)]));
}

#[test]
fn test_placeholders_match_values() {
    let mut qb = QueryBuilder::new();
    qb.select(&["a"])
        .from("t")
        .and_where(row! { "x" => 1, "y" => 2 })
        .or_where(("z", ">", 3))
        .and_where_group(Logic::Or, vec![("p = ?", 4).into(), "q IS NULL".into()])
        .group_by(&["a"])
        .having("COUNT(*) > ?", vec![Value::Int(5)]);
    let (sql, values) = qb.build();
    assert_eq!(placeholders(&sql), values.len());
}
