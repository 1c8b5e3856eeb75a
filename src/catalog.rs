//! The entities and relations of the book catalog.

use std::fmt;

use bindery_core::{EntityConfig, ForeignKey, RelationConfig, RelationSource};

pub const BOOK: EntityConfig = EntityConfig {
    name: "Livre",
    table: "livre",
    default_order_by: "titre",
    columns: &[
        "id",
        "titre",
        "resume",
        "date_parution",
        "date_parution_france",
        "nb_page",
        "auteur_id",
        "pays_id",
        "created_at",
    ],
    foreign_keys: &[
        ForeignKey {
            column: "auteur_id",
            references: "auteur",
        },
        ForeignKey {
            column: "pays_id",
            references: "pays",
        },
    ],
};

pub const AUTHOR: EntityConfig = EntityConfig {
    name: "Auteur",
    table: "auteur",
    default_order_by: "nom",
    columns: &["id", "nom", "prenom", "description", "created_at"],
    foreign_keys: &[],
};

pub const THEME: EntityConfig = EntityConfig {
    name: "Theme",
    table: "theme",
    default_order_by: "titre",
    columns: &["id", "titre", "adulte", "created_at"],
    foreign_keys: &[],
};

pub const COUNTRY: EntityConfig = EntityConfig {
    name: "Pays",
    table: "pays",
    default_order_by: "nom",
    columns: &["id", "nom", "created_at"],
    foreign_keys: &[],
};

/// Join table between books and themes.
pub const BOOK_THEME: &str = "livre_theme";

/// A table of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Book,
    Author,
    Theme,
    Country,
}

impl Entity {
    pub const ALL: [Entity; 4] = [Entity::Book, Entity::Author, Entity::Theme, Entity::Country];

    pub const fn config(self) -> &'static EntityConfig {
        match self {
            Entity::Book => &BOOK,
            Entity::Author => &AUTHOR,
            Entity::Theme => &THEME,
            Entity::Country => &COUNTRY,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config().name)
    }
}

/// A parent → children relation, each served by its own batch loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `Auteur.livres`
    BooksByAuthor,
    /// `Pays.livres`
    BooksByCountry,
    /// `Theme.livres`, through [`BOOK_THEME`]
    BooksByTheme,
    /// `Livre.themes`, through [`BOOK_THEME`]
    ThemesByBook,
}

impl Relation {
    pub const ALL: [Relation; 4] = [
        Relation::BooksByAuthor,
        Relation::BooksByCountry,
        Relation::BooksByTheme,
        Relation::ThemesByBook,
    ];

    pub const fn config(self) -> &'static RelationConfig {
        match self {
            Relation::BooksByAuthor => &BOOKS_BY_AUTHOR,
            Relation::BooksByCountry => &BOOKS_BY_COUNTRY,
            Relation::BooksByTheme => &BOOKS_BY_THEME,
            Relation::ThemesByBook => &THEMES_BY_BOOK,
        }
    }

    #[inline]
    pub const fn child(self) -> &'static EntityConfig {
        self.config().child
    }

    pub const fn name(self) -> &'static str {
        self.config().name
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const BOOKS_BY_AUTHOR: RelationConfig = RelationConfig {
    name: "books_by_author",
    child: &BOOK,
    source: RelationSource::Direct {
        parent_column: "auteur_id",
    },
};

const BOOKS_BY_COUNTRY: RelationConfig = RelationConfig {
    name: "books_by_country",
    child: &BOOK,
    source: RelationSource::Direct {
        parent_column: "pays_id",
    },
};

const BOOKS_BY_THEME: RelationConfig = RelationConfig {
    name: "books_by_theme",
    child: &BOOK,
    source: RelationSource::Junction {
        table: BOOK_THEME,
        parent_column: "theme_id",
        child_column: "livre_id",
    },
};

const THEMES_BY_BOOK: RelationConfig = RelationConfig {
    name: "themes_by_book",
    child: &THEME,
    source: RelationSource::Junction {
        table: BOOK_THEME,
        parent_column: "livre_id",
        child_column: "theme_id",
    },
};
