//! Blog entities used by the demo commands

use rowmap_core::mapping::{Entity, KeyTag, Mapping, RelationTag};

/// Tables backing the models, created by `init-schema`
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS authors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nick TEXT,
    firstname TEXT NOT NULL,
    lastname TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT,
    author_id INTEGER REFERENCES authors(id)
);
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    author_id INTEGER REFERENCES authors(id),
    article_id INTEGER REFERENCES articles(id)
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
pub struct Comment {
    pub id: i32,
    pub content: String,
    pub author: Option<Author>,
    pub article: Option<Article>,
}

impl Entity for Comment {
    fn mapping() -> Mapping<Self> {
        Mapping::<Self>::new()
            .table("comments")
            .key("id", "id", KeyTag::auto_increment(), |c| c.id, |c, v| c.id = v)
            .field("content", "content", |c| c.content.clone(), |c, v| c.content = v)
            .has_one::<Author>(
                "author",
                RelationTag::child("authors", "author_id")
                    .related_column("id")
                    .prefix("author"),
                |c| c.author.as_ref(),
                |c, v| c.author = Some(v),
            )
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
