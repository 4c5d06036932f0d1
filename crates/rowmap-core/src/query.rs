//! Typed SELECT over one mapped table

use crate::errors::Result;
use crate::mapping::Entity;
use crate::predicate::Predicate;
use crate::session::Session;
use crate::sql::Order;
use std::marker::PhantomData;

/// SELECT of every mapped column of `E`, narrowed by translated predicates
///
/// Built by [`Session::select`]. Each [`filter`](Query::filter) call adds a
/// `WHERE` (first) or `AND` (after) line.
pub struct Query<'s, E> {
    session: &'s Session<'s>,
    sql: String,
    where_set: bool,
    order_set: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<'s, E: Entity> Query<'s, E> {
    pub(crate) fn new(session: &'s Session<'s>) -> Result<Self> {
        let descriptor = session.registry().ensure_registered::<E>()?;
        let sql = format!(
            "SELECT {} \nFROM {} ",
            descriptor.columns().join(", "),
            descriptor.table()
        );
        Ok(Self {
            session,
            sql,
            where_set: false,
            order_set: false,
            _entity: PhantomData,
        })
    }

    pub fn filter(mut self, predicate: &Predicate<E>) -> Result<Self> {
        let condition = self.session.translate(predicate)?;
        let keyword = if self.where_set { "AND" } else { "WHERE" };
        self.sql.push_str(&format!("\n{} {}", keyword, condition));
        self.where_set = true;
        Ok(self)
    }

    #[must_use]
    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        let direction = order.keyword();
        if self.order_set {
            self.sql.push_str(&format!(", {} {}", column, direction));
        } else {
            self.sql
                .push_str(&format!("\nORDER BY {} {}", column, direction));
            self.order_set = true;
        }
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// First matching row, if any
    pub fn get_one(&self) -> Result<Option<E>> {
        self.session.parse_one::<E>(&self.sql, &[])
    }

    pub fn get_many(&self) -> Result<Vec<E>> {
        self.session.parse_many::<E>(&self.sql, &[])
    }
}
