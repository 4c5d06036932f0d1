use rowmap_core::mapping::{Entity, KeyTag, Mapping, RelationTag};
use rusqlite::Connection;

pub const SCHEMA: &str = "
CREATE TABLE authors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nick TEXT,
    firstname TEXT NOT NULL,
    lastname TEXT NOT NULL
);
CREATE TABLE articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT,
    author_id INTEGER REFERENCES authors(id)
);
CREATE TABLE products (
    code TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    price REAL NOT NULL,
    active INTEGER NOT NULL
);
";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Author {
    pub id: i32,
    pub nick: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl Entity for Author {
    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new()
            .table("authors")
            .key("id", "id", KeyTag::auto_increment(), |a| a.id, |a, v| a.id = v)
            .field("nick", "nick", |a| a.nick.clone(), |a, v| a.nick = v)
            .field(
                "first_name",
                "firstname",
                |a| a.first_name.clone(),
                |a, v| a.first_name = v,
            )
            .field(
                "last_name",
                "lastname",
                |a| a.last_name.clone(),
                |a, v| a.last_name = v,
            )
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub content: Option<String>,
    pub author: Option<Author>,
}

impl Entity for Article {
    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new()
            .table("articles")
            .key("id", "id", KeyTag::auto_increment(), |a| a.id, |a, v| a.id = v)
            .field("title", "title", |a| a.title.clone(), |a, v| a.title = v)
            .field("content", "content", |a| a.content.clone(), |a, v| a.content = v)
            .has_one::<Author>(
                "author",
                RelationTag::child("authors", "author_id")
                    .related_column("id")
                    .prefix("author"),
                |a| a.author.as_ref(),
                |a, v| a.author = Some(v),
            )
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Product {
    pub code: String,
    pub label: String,
    pub price: f64,
    pub active: bool,
}

impl Entity for Product {
    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new()
            .table("products")
            .key("code", "code", KeyTag::assigned(), |p| p.code.clone(), |p, v| p.code = v)
            .field("label", "label", |p| p.label.clone(), |p, v| p.label = v)
            .field("price", "price", |p| p.price, |p, v| p.price = v)
            .field("active", "active", |p| p.active, |p, v| p.active = v)
    }
}

pub fn setup(conn: &Connection) {
    rowmap_sqlite::db::configure(conn).expect("Failed to configure connection");
    conn.execute_batch(SCHEMA).expect("Failed to create schema");
}

#[allow(dead_code)]
pub fn author(first_name: &str, last_name: &str, nick: Option<&str>) -> Author {
    Author {
        id: 0,
        nick: nick.map(str::to_string),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    }
}

#[allow(dead_code)]
pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .expect("Failed to count rows")
}
