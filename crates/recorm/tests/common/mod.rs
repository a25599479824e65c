#![allow(dead_code)]

use recorm::{
    Database, Entity, QueryContext, QueryHook, QueryResult, QueryStats, Schema, SqliteConnection,
    StatsHook,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Counts statements and keeps their SQL text for assertions.
#[derive(Default)]
pub struct Recorder {
    stats: StatsHook,
    statements: RefCell<Vec<String>>,
}

impl Recorder {
    pub fn stats(&self) -> QueryStats {
        self.stats.stats()
    }

    /// Every statement seen since the last reset, in execution order.
    pub fn statements(&self) -> Vec<String> {
        self.statements.borrow().clone()
    }

    pub fn reset(&self) {
        self.stats.reset();
        self.statements.borrow_mut().clear();
    }
}

impl QueryHook for Recorder {
    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        self.stats.after_query(ctx, duration, result);
        self.statements.borrow_mut().push(ctx.sql.clone());
    }
}

pub struct User;

impl Entity for User {
    fn schema() -> Schema {
        Schema::new("users")
            .fields(&["id", "name", "email", "deleted"])
            .has_many("posts", Post::schema, "user_id", "id")
            .has_one("profile", Profile::schema, "user_id", "id")
    }
}

pub struct Post;

impl Entity for Post {
    fn schema() -> Schema {
        Schema::new("posts").has_many("comments", Comment::schema, "post_id", "id")
    }
}

pub struct Comment;

impl Entity for Comment {
    fn schema() -> Schema {
        Schema::new("comments")
    }
}

pub struct Profile;

impl Entity for Profile {
    fn schema() -> Schema {
        Schema::new("profiles")
    }
}

const DDL: &str = r#"
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE,
    deleted INTEGER DEFAULT 0
);
CREATE TABLE posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL
);
CREATE TABLE comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL,
    body TEXT NOT NULL
);
CREATE TABLE profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    bio TEXT
);
"#;

/// An in-memory database with the test schema and a shared statement counter.
pub fn setup() -> (Database, Rc<Recorder>) {
    let conn = SqliteConnection::open_in_memory().expect("open sqlite");
    conn.execute_batch(DDL).expect("create schema");
    let stats = Rc::new(Recorder::default());
    let db = Database::new(conn).with_shared_hook(stats.clone());
    (db, stats)
}

/// Seed two users; posts reference users 1, 1, 2.
pub fn seed(db: &mut Database) {
    let statements = [
        "INSERT INTO users (name, email) VALUES ('alice', 'a@example.com')",
        "INSERT INTO users (name, email) VALUES ('bob', 'b@example.com')",
        "INSERT INTO posts (user_id, title) VALUES (1, 'first')",
        "INSERT INTO posts (user_id, title) VALUES (1, 'second')",
        "INSERT INTO posts (user_id, title) VALUES (2, 'third')",
        "INSERT INTO comments (post_id, body) VALUES (1, 'nice')",
        "INSERT INTO comments (post_id, body) VALUES (3, 'meh')",
        "INSERT INTO profiles (user_id, bio) VALUES (2, 'hello')",
    ];
    for sql in statements {
        db.run(sql, vec![]).expect("seed");
    }
}
