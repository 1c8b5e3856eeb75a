#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;

use bindery::{Config, Database, Dialect, Error, Executor, Instrumented, Record, Result, Statement};
use bindery_sqlite::SqliteExecutor;

pub type TestExecutor = Instrumented<SqliteExecutor>;

pub const SCHEMA: &str = r#"
CREATE TABLE auteur (
    id INTEGER PRIMARY KEY,
    nom TEXT NOT NULL,
    prenom TEXT,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE pays (
    id INTEGER PRIMARY KEY,
    nom TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE theme (
    id INTEGER PRIMARY KEY,
    titre TEXT NOT NULL,
    adulte INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE livre (
    id INTEGER PRIMARY KEY,
    titre TEXT NOT NULL,
    resume TEXT,
    date_parution TEXT,
    date_parution_france TEXT,
    nb_page INTEGER,
    auteur_id INTEGER REFERENCES auteur (id),
    pays_id INTEGER REFERENCES pays (id),
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE livre_theme (
    livre_id INTEGER NOT NULL REFERENCES livre (id),
    theme_id INTEGER NOT NULL REFERENCES theme (id),
    PRIMARY KEY (livre_id, theme_id)
);
"#;

/// Three authors, two countries, two themes, six books.
///
/// Books per author, by title: 1 → [3, 1, 2], 2 → [4, 5], 3 → [6].
pub const SEED: &str = r#"
INSERT INTO auteur (id, nom, prenom) VALUES
    (1, 'Hugo', 'Victor'),
    (2, 'Camus', 'Albert'),
    (3, 'Zola', 'Emile');
INSERT INTO pays (id, nom) VALUES (1, 'France'), (2, 'Algerie');
INSERT INTO theme (id, titre, adulte) VALUES (1, 'Roman', 0), (2, 'Philosophie', 1);
INSERT INTO livre (id, titre, nb_page, auteur_id, pays_id, date_parution) VALUES
    (1, 'Les Miserables', 1900, 1, 1, '1862-04-03'),
    (2, 'Notre-Dame de Paris', 940, 1, 1, '1831-03-16'),
    (3, 'Les Contemplations', 420, 1, 1, '1856-04-23'),
    (4, 'L''Etranger', 185, 2, 2, '1942-05-19'),
    (5, 'La Peste', 330, 2, 1, '1947-06-10'),
    (6, 'Germinal', 590, 3, 1, '1885-03-02');
INSERT INTO livre_theme (livre_id, theme_id) VALUES
    (1, 1), (2, 1), (4, 1), (6, 1), (4, 2), (5, 2);
"#;

pub fn setup_executor() -> Arc<TestExecutor> {
    let executor = SqliteExecutor::open_in_memory().expect("Failed to create in-memory database");
    executor.execute_batch(SCHEMA).expect("Failed to create tables");
    executor.execute_batch(SEED).expect("Failed to seed tables");
    Arc::new(Instrumented::new(executor))
}

pub fn setup_db() -> (Database<TestExecutor>, Arc<TestExecutor>) {
    setup_db_with(Config::default())
}

pub fn setup_db_with(config: Config) -> (Database<TestExecutor>, Arc<TestExecutor>) {
    let executor = setup_executor();
    (Database::with_shared(executor.clone(), config), executor)
}

pub fn without_cache() -> Config {
    let mut config = Config::default();
    config.cache.enabled = false;
    config
}

pub fn ids(rows: &[Record]) -> Vec<i64> {
    rows.iter().filter_map(Record::id).collect()
}

/// Executor whose every statement fails.
#[derive(Debug, Default)]
pub struct Unavailable;

pub fn unavailable() -> Error {
    Error::Execution("database unavailable".into())
}

impl Executor for Unavailable {
    const DIALECT: Dialect = Dialect::SQLite;

    fn query(&self, _stmt: &Statement) -> impl Future<Output = Result<Vec<Record>>> + Send {
        std::future::ready(Err(unavailable()))
    }

    fn execute(&self, _stmt: &Statement) -> impl Future<Output = Result<u64>> + Send {
        std::future::ready(Err(unavailable()))
    }
}

/// Holds every query until `parties` of them are in flight at once.
pub struct Rendezvous(Arc<tokio::sync::Barrier>);

impl Rendezvous {
    pub fn new(parties: usize) -> Self {
        Self(Arc::new(tokio::sync::Barrier::new(parties)))
    }
}

impl Executor for Rendezvous {
    const DIALECT: Dialect = Dialect::SQLite;

    fn query(&self, _stmt: &Statement) -> impl Future<Output = Result<Vec<Record>>> + Send {
        let barrier = Arc::clone(&self.0);
        async move {
            barrier.wait().await;
            Ok(Vec::new())
        }
    }

    fn execute(&self, _stmt: &Statement) -> impl Future<Output = Result<u64>> + Send {
        std::future::ready(Ok(0))
    }
}
