//! Hand-written reads over the blog tables

use crate::models::{Article, Author};
use rowmap_core::value::Value;
use rowmap_core::{Result, Session};

pub fn author_by_id(session: &Session<'_>, id: i32) -> Result<Option<Author>> {
    session.parse_one(
        "SELECT a.id, a.nick, a.firstname, a.lastname \
         FROM authors a \
         WHERE a.id = :p1",
        &[("p1", Value::Int(id))],
    )
}

pub fn all_authors(session: &Session<'_>) -> Result<Vec<Author>> {
    session.parse_many(
        "SELECT a.id, a.nick, a.firstname, a.lastname FROM authors a ORDER BY a.id",
        &[],
    )
}

/// Article joined with its author; author columns carry the `author_` prefix
pub fn article_by_id(session: &Session<'_>, id: i32) -> Result<Option<Article>> {
    session.parse_one(
        "SELECT \
            art.id, \
            art.title, \
            art.content, \
            art.author_id, \
            aut.nick AS author_nick, \
            aut.firstname AS author_firstname, \
            aut.lastname AS author_lastname \
         FROM articles art \
         INNER JOIN authors aut ON art.author_id = aut.id \
         WHERE art.id = :p1",
        &[("p1", Value::Int(id))],
    )
}
