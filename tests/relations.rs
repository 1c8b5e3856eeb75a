use bindery::{Entity, Relation, Value};
use common::{ids, setup_db, setup_db_with, without_cache};

mod common;

#[tokio::test]
async fn books_by_theme_group_on_join_table() {
    let (db, executor) = setup_db_with(without_cache());
    let session = db.session();

    let (roman, philosophie) = tokio::join!(
        session.load_children(Relation::BooksByTheme, 1, None),
        session.load_children(Relation::BooksByTheme, 2, None),
    );

    assert_eq!(executor.statement_count(), 1);
    // book 4 belongs to both themes
    assert_eq!(ids(&roman.unwrap()), [6, 4, 1, 2]);
    assert_eq!(ids(&philosophie.unwrap()), [4, 5]);
}

#[tokio::test]
async fn themes_by_book() {
    let (db, _) = setup_db();
    let session = db.session();

    let (etranger, miserables, orphan) = tokio::join!(
        session.load_children(Relation::ThemesByBook, 4, None),
        session.load_children(Relation::ThemesByBook, 1, None),
        session.load_children(Relation::ThemesByBook, 3, None),
    );

    let etranger = etranger.unwrap();
    assert_eq!(ids(&etranger), [2, 1]);
    assert_eq!(etranger[0].get("titre"), Some(&Value::from("Philosophie")));
    assert_eq!(etranger[0].get("adulte"), Some(&Value::Integer(1)));
    assert_eq!(etranger[0].get("adulte").and_then(Value::as_bool), Some(true));
    assert_eq!(ids(&miserables.unwrap()), [1]);
    assert!(orphan.unwrap().is_empty());
}

#[tokio::test]
async fn associate_theme_links_and_returns_the_book() {
    let (db, _) = setup_db_with(without_cache());

    let book = db
        .associate_theme(6, 2)
        .await
        .unwrap()
        .expect("book 6 exists");
    assert_eq!(book.id(), Some(6));
    assert_eq!(book.get("titre"), Some(&Value::from("Germinal")));

    let rows = db
        .session()
        .load_children(Relation::BooksByTheme, 2, None)
        .await
        .unwrap();
    assert_eq!(ids(&rows), [6, 4, 5]);

    let themes = db
        .mapper(Entity::Theme)
        .find_by_parent(Relation::ThemesByBook, 6, None)
        .await
        .unwrap();
    assert_eq!(ids(&themes), [2, 1]);
}

#[tokio::test]
async fn associate_theme_twice_fails() {
    let (db, _) = setup_db();
    // (livre 4, theme 1) is already linked
    let result = db.associate_theme(4, 1).await;
    assert!(matches!(result, Err(bindery::Error::Execution(_))));
}

#[tokio::test]
async fn relations_of_different_kinds_batch_independently() {
    let (db, executor) = setup_db_with(without_cache());
    let session = db.session();

    let (books, themes) = tokio::join!(
        session.load_children(Relation::BooksByAuthor, 2, None),
        session.load_children(Relation::ThemesByBook, 5, None),
    );

    assert_eq!(executor.statement_count(), 2);
    assert_eq!(ids(&books.unwrap()), [4, 5]);
    assert_eq!(ids(&themes.unwrap()), [2]);
}
