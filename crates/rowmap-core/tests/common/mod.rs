use chrono::{NaiveDate, NaiveDateTime};
use rowmap_core::cursor::memory::MemoryExecutor;
use rowmap_core::mapping::{Entity, KeyTag, Mapping, RelationTag};
use rowmap_core::registry::Registry;
use rowmap_core::sql::PostgresDialect;
use rowmap_core::Session;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub nick: Option<String>,
}

impl Entity for Author {
    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new()
            .table("authors")
            .key("id", "id", KeyTag::auto_increment(), |a| a.id, |a, v| a.id = v)
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
            .field("nick", "nick", |a| a.nick.clone(), |a, v| a.nick = v)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub content: Option<String>,
    pub created: Option<NaiveDateTime>,
    pub author: Option<Author>,
}

impl Entity for Article {
    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new()
            .table("articles")
            .key("id", "id", KeyTag::auto_increment(), |a| a.id, |a, v| a.id = v)
            .field("title", "title", |a| a.title.clone(), |a, v| a.title = v)
            .field("content", "content", |a| a.content.clone(), |a, v| a.content = v)
            .field("created", "created", |a| a.created, |a, v| a.created = v)
            .has_one::<Author>(
                "author",
                RelationTag::child("authors", "author_id")
                    .related_column("id")
                    .prefix("author"),
                |a| a.author.as_ref(),
                |a, v| a.author = Some(v),
            )
            .has_many::<Comment>("comments", RelationTag::parent("comments", "id").related_column("article_id"))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Comment {
    pub id: i32,
    pub content: String,
    pub article: Option<Article>,
}

impl Entity for Comment {
    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new()
            .table("comments")
            .key("id", "id", KeyTag::auto_increment(), |c| c.id, |c, v| c.id = v)
            .field("content", "content", |c| c.content.clone(), |c, v| c.content = v)
            .has_one::<Article>(
                "article",
                RelationTag::child("articles", "article_id")
                    .related_column("id")
                    .prefix("article"),
                |c| c.article.as_ref(),
                |c, v| c.article = Some(v),
            )
    }
}

/// Entity with a caller-assigned key and no relations
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Product {
    pub code: String,
    pub label: String,
    pub price: f64,
    pub stock: i64,
    pub active: bool,
}

impl Entity for Product {
    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new()
            .table("products")
            .key("code", "code", KeyTag::assigned(), |p| p.code.clone(), |p, v| p.code = v)
            .field("label", "label", |p| p.label.clone(), |p, v| p.label = v)
            .field("price", "price", |p| p.price, |p, v| p.price = v)
            .field("stock", "stock", |p| p.stock, |p, v| p.stock = v)
            .field("active", "active", |p| p.active, |p, v| p.active = v)
    }
}

/// Entity whose key reads back from an explicit sequence
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub label: String,
}

impl Entity for Tag {
    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new()
            .table("tags")
            .key(
                "id",
                "tag_id",
                KeyTag::auto_increment().sequence("tags_tag_id_seq"),
                |t| t.id,
                |t, v| t.id = v,
            )
            .field("label", "label", |t| t.label.clone(), |t, v| t.label = v)
    }
}

#[allow(dead_code)]
pub fn jean() -> Author {
    Author {
        id: 7,
        first_name: "Jean".to_string(),
        last_name: "Valjean".to_string(),
        nick: Some("24601".to_string()),
    }
}

#[allow(dead_code)]
pub fn noon(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid test date")
}

/// Session over a private registry and a scripted executor
#[allow(dead_code)]
pub fn memory_session<'c>(executor: &'c MemoryExecutor, registry: &'c Registry) -> Session<'c> {
    Session::new(executor, &PostgresDialect).with_registry(registry)
}
