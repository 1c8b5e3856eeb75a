//! Statement renderers for single-row CRUD and relation reads.
//!
//! Identifiers always come from [`EntityConfig`] / [`RelationConfig`]; caller-supplied
//! names are resolved through [`EntityConfig::column`] first and rejected if unknown.

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::pagination::PaginationSpec;
use crate::record::{PRIMARY_KEY, Record};
use crate::schema::{EntityConfig, RelationConfig, RelationSource};
use crate::statement::{Statement, StatementBuilder};
use crate::value::Value;

/// Alias given to the parent id in relation reads.
pub const PARENT_KEY: &str = "__parent";

/// Alias of the per-partition rank in windowed reads.
pub const RANK: &str = "__rank";

const CHILD: &str = "t";
const LINK: &str = "j";

fn push_columns(b: &mut StatementBuilder, entity: &EntityConfig, alias: Option<&str>) {
    b.push_list(entity.columns.iter().copied(), |b, column| match alias {
        Some(alias) => {
            b.push_qualified(alias, column);
        }
        None => {
            b.push_ident(column);
        }
    });
}

fn push_order(
    b: &mut StatementBuilder,
    alias: Option<&str>,
    column: &'static str,
    spec: &PaginationSpec,
) {
    let term = |b: &mut StatementBuilder, column: &str| {
        match alias {
            Some(alias) => b.push_qualified(alias, column),
            None => b.push_ident(column),
        };
        b.push(" ").push(spec.direction.as_sql());
    };
    term(b, column);
    // primary key breaks ties so pages never overlap
    if column != PRIMARY_KEY {
        b.push(", ");
        term(b, PRIMARY_KEY);
    }
}

/// Resolves the order column of `spec` against `entity`.
fn order_column(entity: &EntityConfig, spec: &PaginationSpec) -> Result<&'static str> {
    entity.column(&spec.order_by)
}

/// Resolves every field name of `fields`, failing on the first unknown one.
fn bound_fields(entity: &EntityConfig, fields: &Record) -> Result<Vec<(&'static str, Value)>> {
    if fields.is_empty() {
        return Err(Error::EmptyFields(entity.table));
    }
    fields
        .iter()
        .map(|(name, value)| Ok((entity.column(name)?, value.clone())))
        .collect()
}

/// `SELECT cols FROM table WHERE id = ?`
pub fn select_by_key(dialect: Dialect, entity: &EntityConfig, id: i64) -> Statement {
    let mut b = StatementBuilder::new(dialect);
    b.push("SELECT ");
    push_columns(&mut b, entity, None);
    b.push(" FROM ")
        .push_ident(entity.table)
        .push(" WHERE ")
        .push_ident(PRIMARY_KEY)
        .push(" = ")
        .push_param(id);
    b.build()
}

/// `SELECT cols FROM table ORDER BY col dir LIMIT ? OFFSET ?`
pub fn select_page(dialect: Dialect, entity: &EntityConfig, spec: &PaginationSpec) -> Result<Statement> {
    let order = order_column(entity, spec)?;
    let mut b = StatementBuilder::new(dialect);
    b.push("SELECT ");
    push_columns(&mut b, entity, None);
    b.push(" FROM ").push_ident(entity.table).push(" ORDER BY ");
    push_order(&mut b, None, order, spec);
    push_limit_offset(&mut b, spec);
    Ok(b.build())
}

fn push_limit_offset(b: &mut StatementBuilder, spec: &PaginationSpec) {
    b.push(" LIMIT ")
        .push_param(spec.limit)
        .push(" OFFSET ")
        .push_param(i64::try_from(spec.offset).unwrap_or(i64::MAX));
}

/// `INSERT INTO table (fields) VALUES (...) RETURNING cols`
pub fn insert(dialect: Dialect, entity: &EntityConfig, fields: &Record) -> Result<Statement> {
    let fields = bound_fields(entity, fields)?;
    let mut b = StatementBuilder::new(dialect);
    b.push("INSERT INTO ").push_ident(entity.table).push(" (");
    b.push_list(fields.iter(), |b, (column, _)| {
        b.push_ident(column);
    });
    b.push(") VALUES (");
    b.push_list(fields, |b, (_, value)| {
        b.push_param(value);
    });
    b.push(") RETURNING ");
    push_columns(&mut b, entity, None);
    Ok(b.build())
}

/// `UPDATE table SET f = ? ... WHERE id = ? RETURNING cols`
pub fn update(dialect: Dialect, entity: &EntityConfig, id: i64, fields: &Record) -> Result<Statement> {
    let fields = bound_fields(entity, fields)?;
    let mut b = StatementBuilder::new(dialect);
    b.push("UPDATE ").push_ident(entity.table).push(" SET ");
    b.push_list(fields, |b, (column, value)| {
        b.push_ident(column).push(" = ").push_param(value);
    });
    b.push(" WHERE ")
        .push_ident(PRIMARY_KEY)
        .push(" = ")
        .push_param(id)
        .push(" RETURNING ");
    push_columns(&mut b, entity, None);
    Ok(b.build())
}

/// `DELETE FROM table WHERE id = ?`
pub fn delete(dialect: Dialect, entity: &EntityConfig, id: i64) -> Statement {
    let mut b = StatementBuilder::new(dialect);
    b.push("DELETE FROM ")
        .push_ident(entity.table)
        .push(" WHERE ")
        .push_ident(PRIMARY_KEY)
        .push(" = ")
        .push_param(id);
    b.build()
}

/// Writes `FROM child t [JOIN link j ON ...]` and returns the alias holding the
/// parent column.
fn push_relation_source(b: &mut StatementBuilder, relation: &RelationConfig) -> &'static str {
    b.push(" FROM ")
        .push_ident(relation.child.table)
        .push(" AS ")
        .push(CHILD);
    match relation.source {
        RelationSource::Direct { .. } => CHILD,
        RelationSource::Junction {
            table,
            child_column,
            ..
        } => {
            b.push(" JOIN ")
                .push_ident(table)
                .push(" AS ")
                .push(LINK)
                .push(" ON ")
                .push_qualified(LINK, child_column)
                .push(" = ")
                .push_qualified(CHILD, PRIMARY_KEY);
            LINK
        }
    }
}

/// Children of a single parent, paginated directly with `LIMIT`/`OFFSET`.
pub fn select_children(
    dialect: Dialect,
    relation: &RelationConfig,
    parent_id: i64,
    spec: &PaginationSpec,
) -> Result<Statement> {
    let order = order_column(relation.child, spec)?;
    let mut b = StatementBuilder::new(dialect);
    b.push("SELECT ");
    push_columns(&mut b, relation.child, Some(CHILD));
    let parent_alias = push_relation_source(&mut b, relation);
    b.push(" WHERE ")
        .push_qualified(parent_alias, relation.parent_column())
        .push(" = ")
        .push_param(parent_id)
        .push(" ORDER BY ");
    push_order(&mut b, Some(CHILD), order, spec);
    push_limit_offset(&mut b, spec);
    Ok(b.build())
}

/// Children of many parents in one round trip.
///
/// Rows are ranked per parent with `ROW_NUMBER()`, only ranks inside the page window
/// survive, and the output is ordered by parent then rank. Each row carries the
/// parent id as [`PARENT_KEY`].
pub fn select_children_windowed(
    dialect: Dialect,
    relation: &RelationConfig,
    parent_ids: &[i64],
    spec: &PaginationSpec,
) -> Result<Statement> {
    let order = order_column(relation.child, spec)?;
    let parent_column = relation.parent_column();
    let (lo, hi) = spec.rank_window();

    let mut b = StatementBuilder::new(dialect);
    b.push("SELECT ");
    push_columns(&mut b, relation.child, None);
    b.push(", ").push_ident(PARENT_KEY).push(" FROM (SELECT ");
    push_columns(&mut b, relation.child, Some(CHILD));
    let parent_alias = if relation.is_junction() { LINK } else { CHILD };
    b.push(", ")
        .push_qualified(parent_alias, parent_column)
        .push(" AS ")
        .push_ident(PARENT_KEY)
        .push(", ROW_NUMBER() OVER (PARTITION BY ")
        .push_qualified(parent_alias, parent_column)
        .push(" ORDER BY ");
    push_order(&mut b, Some(CHILD), order, spec);
    b.push(") AS ").push_ident(RANK);
    push_relation_source(&mut b, relation);
    b.push(" WHERE ").push_qualified(parent_alias, parent_column);
    b.push_id_set(parent_ids);
    b.push(") AS ranked WHERE ")
        .push_ident(RANK)
        .push(" BETWEEN ")
        .push_param(lo)
        .push(" AND ")
        .push_param(hi)
        .push(" ORDER BY ")
        .push_ident(PARENT_KEY)
        .push(", ")
        .push_ident(RANK);
    Ok(b.build())
}

/// `INSERT INTO link (parent, child) VALUES (?, ?)` for a junction relation.
///
/// Returns `None` for relations that are not backed by a join table.
pub fn insert_link(
    dialect: Dialect,
    relation: &RelationConfig,
    parent_id: i64,
    child_id: i64,
) -> Option<Statement> {
    let RelationSource::Junction {
        table,
        parent_column,
        child_column,
    } = relation.source
    else {
        return None;
    };
    let mut b = StatementBuilder::new(dialect);
    b.push("INSERT INTO ")
        .push_ident(table)
        .push(" (")
        .push_ident(child_column)
        .push(", ")
        .push_ident(parent_column)
        .push(") VALUES (")
        .push_param(child_id)
        .push(", ")
        .push_param(parent_id)
        .push(")");
    Some(b.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{Direction, PaginationSpec};
    use crate::schema::ForeignKey;

    const BOOK: EntityConfig = EntityConfig {
        name: "Livre",
        table: "livre",
        default_order_by: "titre",
        columns: &["id", "titre", "auteur_id"],
        foreign_keys: &[ForeignKey {
            column: "auteur_id",
            references: "auteur",
        }],
    };

    const BY_AUTHOR: RelationConfig = RelationConfig {
        name: "books_by_author",
        child: &BOOK,
        source: RelationSource::Direct {
            parent_column: "auteur_id",
        },
    };

    const BY_THEME: RelationConfig = RelationConfig {
        name: "books_by_theme",
        child: &BOOK,
        source: RelationSource::Junction {
            table: "livre_theme",
            parent_column: "theme_id",
            child_column: "livre_id",
        },
    };

    fn spec(order_by: &str) -> PaginationSpec {
        PaginationSpec {
            limit: 2,
            offset: 1,
            order_by: order_by.into(),
            direction: Direction::Desc,
        }
    }

    #[test]
    fn select_by_key_sql() {
        let stmt = select_by_key(Dialect::PostgreSQL, &BOOK, 7);
        assert_eq!(
            stmt.sql,
            r#"SELECT "id", "titre", "auteur_id" FROM "livre" WHERE "id" = $1"#
        );
        assert_eq!(stmt.params, vec![Value::Integer(7)]);
    }

    #[test]
    fn select_page_sql() {
        let stmt = select_page(Dialect::SQLite, &BOOK, &spec("titre")).unwrap();
        assert_eq!(
            stmt.sql,
            r#"SELECT "id", "titre", "auteur_id" FROM "livre" ORDER BY "titre" DESC, "id" DESC LIMIT ?1 OFFSET ?2"#
        );
        assert_eq!(stmt.params, vec![Value::Integer(2), Value::Integer(1)]);
    }

    #[test]
    fn unknown_order_column_is_rejected() {
        let err = select_page(Dialect::SQLite, &BOOK, &spec("1; DROP TABLE livre")).unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { table: "livre", .. }));
    }

    #[test]
    fn insert_binds_only_supplied_fields() {
        let fields = Record::new().with("titre", "X");
        let stmt = insert(Dialect::PostgreSQL, &BOOK, &fields).unwrap();
        assert_eq!(
            stmt.sql,
            r#"INSERT INTO "livre" ("titre") VALUES ($1) RETURNING "id", "titre", "auteur_id""#
        );
        assert_eq!(stmt.params, vec![Value::Text("X".into())]);
    }

    #[test]
    fn insert_rejects_unknown_and_empty_fields() {
        let fields = Record::new().with("nope", 1);
        assert!(matches!(
            insert(Dialect::SQLite, &BOOK, &fields),
            Err(Error::UnknownColumn { .. })
        ));
        assert_eq!(
            insert(Dialect::SQLite, &BOOK, &Record::new()),
            Err(Error::EmptyFields("livre"))
        );
    }

    #[test]
    fn update_puts_id_last() {
        let fields = Record::new().with("titre", "Y").with("auteur_id", 3);
        let stmt = update(Dialect::PostgreSQL, &BOOK, 9, &fields).unwrap();
        assert_eq!(
            stmt.sql,
            r#"UPDATE "livre" SET "titre" = $1, "auteur_id" = $2 WHERE "id" = $3 RETURNING "id", "titre", "auteur_id""#
        );
        assert_eq!(stmt.params.last(), Some(&Value::Integer(9)));
    }

    #[test]
    fn windowed_direct_partitions_on_own_column() {
        let stmt =
            select_children_windowed(Dialect::PostgreSQL, &BY_AUTHOR, &[1, 3], &spec("titre"))
                .unwrap();
        assert_eq!(
            stmt.sql,
            concat!(
                r#"SELECT "id", "titre", "auteur_id", "__parent" FROM (SELECT t."id", t."titre", t."auteur_id", "#,
                r#"t."auteur_id" AS "__parent", ROW_NUMBER() OVER (PARTITION BY t."auteur_id" "#,
                r#"ORDER BY t."titre" DESC, t."id" DESC) AS "__rank" FROM "livre" AS t "#,
                r#"WHERE t."auteur_id" = ANY($1)) AS ranked WHERE "__rank" BETWEEN $2 AND $3 "#,
                r#"ORDER BY "__parent", "__rank""#
            )
        );
        assert_eq!(
            stmt.params,
            vec![
                Value::IntegerList(vec![1, 3]),
                Value::Integer(2),
                Value::Integer(3)
            ]
        );
    }

    #[test]
    fn windowed_junction_joins_link_table() {
        let stmt =
            select_children_windowed(Dialect::SQLite, &BY_THEME, &[5], &spec("id")).unwrap();
        assert!(stmt.sql.contains(r#"j."theme_id" AS "__parent""#));
        assert!(stmt.sql.contains(r#"PARTITION BY j."theme_id" ORDER BY t."id" DESC)"#));
        assert!(stmt.sql.contains(r#"JOIN "livre_theme" AS j ON j."livre_id" = t."id""#));
        assert!(stmt.sql.contains(r#"WHERE j."theme_id" IN (SELECT value FROM json_each(?1))"#));
        assert_eq!(stmt.params[0], Value::from("[5]"));
    }

    #[test]
    fn single_parent_read() {
        let stmt = select_children(Dialect::SQLite, &BY_AUTHOR, 4, &spec("titre")).unwrap();
        assert_eq!(
            stmt.sql,
            concat!(
                r#"SELECT t."id", t."titre", t."auteur_id" FROM "livre" AS t "#,
                r#"WHERE t."auteur_id" = ?1 ORDER BY t."titre" DESC, t."id" DESC LIMIT ?2 OFFSET ?3"#
            )
        );
    }

    #[test]
    fn link_only_for_junctions() {
        assert!(insert_link(Dialect::SQLite, &BY_AUTHOR, 1, 2).is_none());
        let stmt = insert_link(Dialect::SQLite, &BY_THEME, 5, 9).unwrap();
        assert_eq!(
            stmt.sql,
            r#"INSERT INTO "livre_theme" ("livre_id", "theme_id") VALUES (?1, ?2)"#
        );
        assert_eq!(stmt.params, vec![Value::Integer(9), Value::Integer(5)]);
    }
}
