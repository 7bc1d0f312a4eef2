//! Parameterized statements
//!
//! A `Statement` is the SQL text of one data-access step plus the ordered
//! list of values bound to its placeholders. Identifiers are quoted and
//! placeholders numbered per dialect.

use fastback_core::DatabaseType;
use serde::Serialize;

/// A value bound to a placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Bind {
    /// A payload field, by column name
    Field(String),
    /// The `id` argument of the operation
    Id,
    /// The master identifier captured inside a master-detail transaction
    MasterId,
    /// The `detail_id` argument of a detail operation
    DetailId,
}

/// One parameterized SQL statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub binds: Vec<Bind>,
}

impl Statement {
    /// Number of placeholders
    pub fn arity(&self) -> usize {
        self.binds.len()
    }
}

/// Builds statements for one dialect
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    db: DatabaseType,
    /// Columns selected as `::text`
    text_columns: Vec<String>,
}

impl SqlBuilder {
    pub fn new(db: DatabaseType) -> Self {
        Self {
            db,
            text_columns: Vec::new(),
        }
    }

    /// Select `columns` cast to text (PostgreSQL types decoded as `String`)
    pub fn reading_as_text(mut self, columns: Vec<String>) -> Self {
        self.text_columns = columns;
        self
    }

    fn q(&self, ident: &str) -> String {
        self.db.quote_ident(ident)
    }

    fn column_list(&self, columns: &[&str]) -> String {
        columns
            .iter()
            .map(|c| self.q(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn select_list(&self, columns: &[&str]) -> String {
        columns
            .iter()
            .map(|c| {
                if self.text_columns.iter().any(|t| t == c) {
                    format!("{0}::text AS {0}", self.q(c))
                } else {
                    self.q(c)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `SELECT cols FROM table ORDER BY id`
    pub fn select_all(&self, table: &str, columns: &[&str]) -> Statement {
        Statement {
            sql: format!(
                "SELECT {} FROM {} ORDER BY {}",
                self.select_list(columns),
                self.q(table),
                self.q("id")
            ),
            binds: vec![],
        }
    }

    /// `SELECT cols FROM table WHERE key = ?`, ordered by id
    pub fn select_where(&self, table: &str, columns: &[&str], key: &str, bind: Bind) -> Statement {
        let order = if key == "id" {
            String::new()
        } else {
            format!(" ORDER BY {}", self.q("id"))
        };
        Statement {
            sql: format!(
                "SELECT {} FROM {} WHERE {} = {}{}",
                self.select_list(columns),
                self.q(table),
                self.q(key),
                self.db.placeholder(1),
                order
            ),
            binds: vec![bind],
        }
    }

    /// `INSERT INTO table (cols) VALUES (...)`, optionally returning the new id
    pub fn insert(&self, table: &str, values: &[(&str, Bind)], returning_id: bool) -> Statement {
        let sql = if values.is_empty() {
            match self.db {
                DatabaseType::MySQL => format!("INSERT INTO {} () VALUES ()", self.q(table)),
                _ => format!("INSERT INTO {} DEFAULT VALUES", self.q(table)),
            }
        } else {
            let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
            let placeholders: Vec<String> =
                (1..=values.len()).map(|i| self.db.placeholder(i)).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.q(table),
                self.column_list(&columns),
                placeholders.join(", ")
            )
        };
        let sql = if returning_id && self.db.uses_returning() {
            format!("{} RETURNING {}", sql, self.q("id"))
        } else {
            sql
        };
        Statement {
            sql,
            binds: values.iter().map(|(_, b)| b.clone()).collect(),
        }
    }

    /// `UPDATE table SET a = ?, b = ? WHERE id = ?`
    ///
    /// With no columns to set, the id is assigned to itself so the statement
    /// still reports whether the row exists.
    pub fn update(&self, table: &str, values: &[(&str, Bind)], key: Bind) -> Statement {
        let mut binds: Vec<Bind> = values.iter().map(|(_, b)| b.clone()).collect();
        let assignments = if values.is_empty() {
            format!("{0} = {0}", self.q("id"))
        } else {
            values
                .iter()
                .enumerate()
                .map(|(i, (c, _))| format!("{} = {}", self.q(c), self.db.placeholder(i + 1)))
                .collect::<Vec<_>>()
                .join(", ")
        };
        binds.push(key);
        Statement {
            sql: format!(
                "UPDATE {} SET {} WHERE {} = {}",
                self.q(table),
                assignments,
                self.q("id"),
                self.db.placeholder(binds.len())
            ),
            binds,
        }
    }

    /// `DELETE FROM table WHERE id = ?`
    pub fn delete(&self, table: &str, key: Bind) -> Statement {
        Statement {
            sql: format!(
                "DELETE FROM {} WHERE {} = {}",
                self.q(table),
                self.q("id"),
                self.db.placeholder(1)
            ),
            binds: vec![key],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(name: &str) -> Bind {
        Bind::Field(name.to_string())
    }

    #[test]
    fn test_mysql_insert() {
        let sql = SqlBuilder::new(DatabaseType::MySQL);
        let stmt = sql.insert(
            "pedido",
            &[("cliente", field("cliente")), ("total", field("total"))],
            true,
        );
        assert_eq!(
            stmt.sql,
            "INSERT INTO `pedido` (`cliente`, `total`) VALUES (?, ?)"
        );
        assert_eq!(stmt.arity(), 2);
    }

    #[test]
    fn test_postgres_insert_returning() {
        let sql = SqlBuilder::new(DatabaseType::PostgreSQL);
        let stmt = sql.insert("pedido", &[("cliente", field("cliente"))], true);
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"pedido\" (\"cliente\") VALUES ($1) RETURNING \"id\""
        );
    }

    #[test]
    fn test_empty_insert() {
        let stmt = SqlBuilder::new(DatabaseType::SQLite).insert("marca", &[], false);
        assert_eq!(stmt.sql, "INSERT INTO \"marca\" DEFAULT VALUES");
        let stmt = SqlBuilder::new(DatabaseType::MySQL).insert("marca", &[], false);
        assert_eq!(stmt.sql, "INSERT INTO `marca` () VALUES ()");
    }

    #[test]
    fn test_postgres_update_numbers_key_last() {
        let sql = SqlBuilder::new(DatabaseType::PostgreSQL);
        let stmt = sql.update(
            "pedido",
            &[("cliente", field("cliente")), ("total", field("total"))],
            Bind::Id,
        );
        assert_eq!(
            stmt.sql,
            "UPDATE \"pedido\" SET \"cliente\" = $1, \"total\" = $2 WHERE \"id\" = $3"
        );
        assert_eq!(stmt.binds.last(), Some(&Bind::Id));
    }

    #[test]
    fn test_update_without_columns() {
        let stmt = SqlBuilder::new(DatabaseType::SQLite).update("marca", &[], Bind::Id);
        assert_eq!(
            stmt.sql,
            "UPDATE \"marca\" SET \"id\" = \"id\" WHERE \"id\" = ?"
        );
    }

    #[test]
    fn test_select_where_detail_is_ordered() {
        let sql = SqlBuilder::new(DatabaseType::SQLite);
        let stmt = sql.select_where("item_pedido", &["id", "produto"], "pedido_id", Bind::Id);
        assert_eq!(
            stmt.sql,
            "SELECT \"id\", \"produto\" FROM \"item_pedido\" WHERE \"pedido_id\" = ? ORDER BY \"id\""
        );
        let stmt = sql.select_where("pedido", &["id"], "id", Bind::Id);
        assert_eq!(stmt.sql, "SELECT \"id\" FROM \"pedido\" WHERE \"id\" = ?");
    }

    #[test]
    fn test_text_columns_cast_on_read_only() {
        let sql = SqlBuilder::new(DatabaseType::PostgreSQL)
            .reading_as_text(vec!["saldo".to_string()]);
        let stmt = sql.select_all("conta", &["id", "saldo"]);
        assert_eq!(
            stmt.sql,
            "SELECT \"id\", \"saldo\"::text AS \"saldo\" FROM \"conta\" ORDER BY \"id\""
        );
        let stmt = sql.insert("conta", &[("saldo", field("saldo"))], true);
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"conta\" (\"saldo\") VALUES ($1) RETURNING \"id\""
        );
    }

    #[test]
    fn test_delete() {
        let stmt = SqlBuilder::new(DatabaseType::MySQL).delete("pedido", Bind::Id);
        assert_eq!(stmt.sql, "DELETE FROM `pedido` WHERE `id` = ?");
    }
}
