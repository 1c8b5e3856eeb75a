//! Fully rendered statements and their cache fingerprints.

use sha2::{Digest, Sha256};

use crate::dialect::Dialect;
use crate::value::Value;

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    /// Stable identifier of this exact statement: text and every bound value.
    ///
    /// Two statements share a fingerprint only if they would return the same rows.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update((self.sql.len() as u64).to_le_bytes());
        hasher.update(self.sql.as_bytes());
        hasher.update((self.params.len() as u64).to_le_bytes());
        for param in &self.params {
            param.digest_into(&mut hasher);
        }
        Fingerprint(hasher.finalize().into())
    }
}

/// SHA-256 digest of a [`Statement`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

/// Incremental statement writer that numbers placeholders as parameters are pushed.
#[derive(Debug)]
pub struct StatementBuilder {
    dialect: Dialect,
    sql: String,
    params: Vec<Value>,
}

impl StatementBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::with_capacity(128),
            params: Vec::new(),
        }
    }

    #[inline]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[inline]
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Writes a double-quoted identifier.
    pub fn push_ident(&mut self, ident: &str) -> &mut Self {
        self.sql.push('"');
        for ch in ident.chars() {
            if ch == '"' {
                self.sql.push('"');
            }
            self.sql.push(ch);
        }
        self.sql.push('"');
        self
    }

    /// Writes `alias."column"`.
    pub fn push_qualified(&mut self, alias: &str, column: &str) -> &mut Self {
        self.sql.push_str(alias);
        self.sql.push('.');
        self.push_ident(column)
    }

    /// Binds `value` and writes its placeholder.
    pub fn push_param(&mut self, value: impl Into<Value>) -> &mut Self {
        self.params.push(value.into());
        let placeholder = self.dialect.render_placeholder(self.params.len());
        self.sql.push_str(&placeholder);
        self
    }

    /// Writes `expr` matched against a set of ids bound as one parameter: `= ANY($n)`
    /// where arrays bind, a JSON array unpacked by `json_each` otherwise.
    pub fn push_id_set(&mut self, ids: &[i64]) -> &mut Self {
        if self.dialect.supports_array_params() {
            self.push(" = ANY(").push_param(ids.to_vec()).push(")")
        } else {
            let json = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
            self.push(" IN (SELECT value FROM json_each(")
                .push_param(format!("[{json}]"))
                .push("))")
        }
    }

    /// Writes `items` separated by `", "`, each through `f`.
    pub fn push_list<T>(&mut self, items: impl IntoIterator<Item = T>, mut f: impl FnMut(&mut Self, T)) -> &mut Self {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            f(self, item);
        }
        self
    }

    pub fn build(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_follow_dialect() {
        let mut pg = StatementBuilder::new(Dialect::PostgreSQL);
        pg.push("SELECT ").push_param(1).push(", ").push_param("a");
        assert_eq!(pg.build().sql, "SELECT $1, $2");

        let mut lite = StatementBuilder::new(Dialect::SQLite);
        lite.push("SELECT ").push_param(1).push(", ").push_param("a");
        assert_eq!(lite.build().sql, "SELECT ?1, ?2");
    }

    #[test]
    fn identifiers_escape_quotes() {
        let mut b = StatementBuilder::new(Dialect::SQLite);
        b.push_ident(r#"we"ird"#);
        assert_eq!(b.build().sql, r#""we""ird""#);
    }

    #[test]
    fn id_sets_per_dialect() {
        let mut pg = StatementBuilder::new(Dialect::PostgreSQL);
        pg.push("x").push_id_set(&[1, 2]);
        let pg = pg.build();
        assert_eq!(pg.sql, "x = ANY($1)");
        assert_eq!(pg.params, vec![Value::IntegerList(vec![1, 2])]);

        let mut lite = StatementBuilder::new(Dialect::SQLite);
        lite.push("x").push_id_set(&[1, 2]);
        let lite = lite.build();
        assert_eq!(lite.sql, "x IN (SELECT value FROM json_each(?1))");
        assert_eq!(lite.params, vec![Value::from("[1,2]")]);
    }

    #[test]
    fn fingerprint_tracks_params() {
        let a = Statement {
            sql: "SELECT ?1".into(),
            params: vec![Value::Integer(1)],
        };
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());

        b.params[0] = Value::Integer(2);
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().to_string().len(), 64);
    }
}
