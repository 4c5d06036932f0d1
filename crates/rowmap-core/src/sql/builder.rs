//! Free-form statement composition
//!
//! ```
//! use rowmap_core::sql::{Order, Sql};
//!
//! let sql = Sql::select(&["a.id", "a.title"])
//!     .from("articles", Some("a"))
//!     .join("authors u", "u.id", "=", "a.author_id")
//!     .and_where("u.nick", "=", ":p1")
//!     .order_by("a.id", Order::Desc);
//!
//! assert_eq!(
//!     sql.to_string(),
//!     "SELECT a.id, a.title\nFROM articles AS a\nINNER JOIN authors u ON u.id = a.author_id\nWHERE (u.nick = :p1)\nORDER BY a.id DESC"
//! );
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// Statement text under construction
///
/// Nothing is validated; the builder only appends clauses in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sql {
    text: String,
    where_set: bool,
    order_set: bool,
}

impl Sql {
    fn starting(text: String) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn select(columns: &[&str]) -> Self {
        Self::starting(format!("SELECT {}", columns.join(", ")))
    }

    #[must_use]
    pub fn insert(table: &str) -> Self {
        Self::starting(format!("INSERT INTO {}", table))
    }

    #[must_use]
    pub fn update(table: &str) -> Self {
        Self::starting(format!("UPDATE {}", table))
    }

    #[must_use]
    pub fn delete(table: &str) -> Self {
        Self::starting(format!("DELETE FROM {}", table))
    }

    #[must_use]
    pub fn from(mut self, table: &str, alias: Option<&str>) -> Self {
        self.text.push_str("\nFROM ");
        self.text.push_str(table);
        if let Some(alias) = alias {
            self.text.push_str(" AS ");
            self.text.push_str(alias);
        }
        self
    }

    /// FROM over a nested statement, indented one level
    #[must_use]
    pub fn from_subquery(mut self, inner: &Sql, alias: &str) -> Self {
        let nested = inner.text.replace('\n', "\n    ");
        self.text
            .push_str(&format!("\nFROM\n(\n    {}\n) AS {}", nested, alias));
        self
    }

    #[must_use]
    pub fn join(self, table: &str, on_left: &str, op: &str, on_right: &str) -> Self {
        self.push_join("INNER JOIN", table, on_left, op, on_right)
    }

    #[must_use]
    pub fn left_join(self, table: &str, on_left: &str, op: &str, on_right: &str) -> Self {
        self.push_join("OUTER LEFT JOIN", table, on_left, op, on_right)
    }

    #[must_use]
    pub fn right_join(self, table: &str, on_left: &str, op: &str, on_right: &str) -> Self {
        self.push_join("OUTER RIGHT JOIN", table, on_left, op, on_right)
    }

    fn push_join(
        mut self,
        kind: &str,
        table: &str,
        on_left: &str,
        op: &str,
        on_right: &str,
    ) -> Self {
        self.text.push_str(&format!(
            "\n{} {} ON {} {} {}",
            kind, table, on_left, op, on_right
        ));
        self
    }

    /// `WHERE (left op right)` the first time, `AND (left op right)` after
    #[must_use]
    pub fn and_where(self, left: &str, op: &str, right: &str) -> Self {
        self.push_condition(&format!("({} {} {})", left, op, right))
    }

    /// Append an already rendered boolean fragment, such as a translated predicate
    #[must_use]
    pub fn and_where_sql(self, fragment: &str) -> Self {
        self.push_condition(fragment)
    }

    fn push_condition(mut self, condition: &str) -> Self {
        let keyword = if self.where_set { "AND" } else { "WHERE" };
        self.where_set = true;
        self.text.push_str(&format!("\n{} {}", keyword, condition));
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        if self.order_set {
            self.text
                .push_str(&format!(", {} {}", column, order.keyword()));
        } else {
            self.text
                .push_str(&format!("\nORDER BY {} {}", column, order.keyword()));
            self.order_set = true;
        }
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.where_set = false;
        self.order_set = false;
    }
}

impl fmt::Display for Sql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
