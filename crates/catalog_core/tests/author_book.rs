use catalog_core::db::open_db_in_memory;
use catalog_core::model::book::BOOK_ISBN_EXISTS_MESSAGE;
use catalog_core::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use catalog_core::repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
use catalog_core::repo::genre_repo::{GenreRepository, SqliteGenreRepository};
use catalog_core::{Author, Book, EntityKind, Genre, Language, Page, RepoError};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::BTreeSet;
use uuid::Uuid;

fn emma(author: &Author) -> Book {
    Book::new("Emma", "9780141439587", "A young matchmaker meddles.").with_author(author.id)
}

fn austen(conn: &Connection) -> Author {
    let repo = SqliteAuthorRepository::try_new(conn).unwrap();
    let mut author = Author::new("Jane", "Austen");
    author.date_of_birth = NaiveDate::from_ymd_opt(1775, 12, 16);
    author.date_of_death = NaiveDate::from_ymd_opt(1817, 7, 18);
    repo.create_author(&author).unwrap();
    author
}

#[test]
fn author_roundtrip_preserves_dates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();
    let author = austen(&conn);

    let loaded = repo.get_author(author.id).unwrap().unwrap();
    assert_eq!(loaded, author);
    assert_eq!(loaded.to_string(), "Austen Jane");
}

#[test]
fn book_lookup_by_isbn_returns_genre_links() {
    let conn = open_db_in_memory().unwrap();
    let author = austen(&conn);
    let genres = SqliteGenreRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let romance = Genre::new("Romance");
    genres.create_genre(&romance).unwrap();
    let book = emma(&author).with_genres([romance.id]);
    books.create_book(&book).unwrap();

    let found = books.find_book_by_isbn("9780141439587").unwrap().unwrap();
    assert_eq!(found.id, book.id);
    assert_eq!(found.author, Some(author.id));
    assert_eq!(found.genre, BTreeSet::from([romance.id]));

    assert!(books.find_book_by_isbn("9780140440041").unwrap().is_none());
}

#[test]
fn deleting_referenced_author_is_restricted() {
    let conn = open_db_in_memory().unwrap();
    let authors = SqliteAuthorRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let author = austen(&conn);
    books.create_book(&emma(&author)).unwrap();

    let err = authors.delete_author(author.id).unwrap_err();
    match err {
        RepoError::ReferentialIntegrityViolation {
            entity,
            id,
            dependent,
            dependents,
        } => {
            assert_eq!(entity, EntityKind::Author);
            assert_eq!(id, author.id);
            assert_eq!(dependent, EntityKind::Book);
            assert_eq!(dependents, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(authors.get_author(author.id).unwrap().is_some());
}

#[test]
fn deleting_unreferenced_author_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let authors = SqliteAuthorRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let author = austen(&conn);
    let mut book = emma(&author);
    books.create_book(&book).unwrap();

    book.author = None;
    books.update_book(&book).unwrap();

    authors.delete_author(author.id).unwrap();
    assert!(authors.get_author(author.id).unwrap().is_none());
}

#[test]
fn isbn_is_unique_across_books() {
    let conn = open_db_in_memory().unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();
    let author = austen(&conn);

    books.create_book(&emma(&author)).unwrap();
    let duplicate = Book::new("Emma (reprint)", "9780141439587", "Same isbn.");
    let err = books.create_book(&duplicate).unwrap_err();

    match &err {
        RepoError::UniquenessViolation { entity, field, .. } => {
            assert_eq!(*entity, EntityKind::Book);
            assert_eq!(*field, "isbn");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.to_string(), BOOK_ISBN_EXISTS_MESSAGE);
    assert!(books.get_book(duplicate.id).unwrap().is_none());
}

#[test]
fn book_defaults_to_english_and_roundtrips_genres() {
    let conn = open_db_in_memory().unwrap();
    let genres = SqliteGenreRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let romance = Genre::new("Romance");
    let satire = Genre::new("Satire");
    genres.create_genre(&romance).unwrap();
    genres.create_genre(&satire).unwrap();

    let book = Book::new("Persuasion", "9780141439686", "Second chances.")
        .with_genres([romance.id, satire.id]);
    books.create_book(&book).unwrap();

    let loaded = books.get_book(book.id).unwrap().unwrap();
    assert_eq!(loaded.language, Language::English);
    assert_eq!(loaded.genre, BTreeSet::from([romance.id, satire.id]));

    let stored: String = conn
        .query_row(
            "SELECT language FROM books WHERE id = ?1;",
            [book.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, "en");
}

#[test]
fn unknown_references_are_rejected_without_partial_writes() {
    let conn = open_db_in_memory().unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let missing_author = Book::new("Ghost", "0000000000001", "No author.").with_author(Uuid::new_v4());
    let err = books.create_book(&missing_author).unwrap_err();
    assert!(matches!(
        err,
        RepoError::UnknownReference {
            field: "author",
            entity: EntityKind::Author,
            ..
        }
    ));

    let missing_genre = Book::new("Ghost", "0000000000002", "No genre.").with_genres([Uuid::new_v4()]);
    let err = books.create_book(&missing_genre).unwrap_err();
    assert!(matches!(
        err,
        RepoError::UnknownReference {
            field: "genre",
            entity: EntityKind::Genre,
            ..
        }
    ));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn deleting_genre_unlinks_books_but_keeps_them() {
    let conn = open_db_in_memory().unwrap();
    let genres = SqliteGenreRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let poetry = Genre::new("Poetry");
    genres.create_genre(&poetry).unwrap();
    let book = Book::new("Odes", "9780140424454", "Collected odes.").with_genres([poetry.id]);
    books.create_book(&book).unwrap();

    genres.delete_genre(poetry.id).unwrap();

    let loaded = books.get_book(book.id).unwrap().unwrap();
    assert!(loaded.genre.is_empty());
}

#[test]
fn genre_links_can_be_replaced_added_and_removed() {
    let conn = open_db_in_memory().unwrap();
    let genres = SqliteGenreRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let drama = Genre::new("Drama");
    let comedy = Genre::new("Comedy");
    let history = Genre::new("History");
    for genre in [&drama, &comedy, &history] {
        genres.create_genre(genre).unwrap();
    }
    let book = Book::new("Henry V", "9780743484879", "Agincourt.").with_genres([drama.id]);
    books.create_book(&book).unwrap();

    books
        .set_book_genres(book.id, &BTreeSet::from([comedy.id, history.id]))
        .unwrap();
    books.add_book_genre(book.id, history.id).unwrap();
    books.add_book_genre(book.id, drama.id).unwrap();
    books.remove_book_genre(book.id, comedy.id).unwrap();

    let titles: Vec<String> = books
        .list_book_genres(book.id)
        .unwrap()
        .into_iter()
        .map(|genre| genre.title)
        .collect();
    assert_eq!(titles, vec!["Drama", "History"]);
}

#[test]
fn list_books_filters_by_author_genre_and_language() {
    let conn = open_db_in_memory().unwrap();
    let genres = SqliteGenreRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();
    let author = austen(&conn);

    let classic = Genre::new("Classic");
    genres.create_genre(&classic).unwrap();

    books
        .create_book(&emma(&author).with_genres([classic.id]))
        .unwrap();
    books
        .create_book(
            &Book::new("Candide", "9780140440041", "Optimism tested.")
                .with_language(Language::French)
                .with_genres([classic.id]),
        )
        .unwrap();
    books
        .create_book(&Book::new("Alone", "1111111111111", "Unlinked."))
        .unwrap();

    let by_author = books
        .list_books(&BookListQuery {
            author: Some(author.id),
            ..BookListQuery::default()
        })
        .unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].title, "Emma");

    let by_genre: Vec<String> = books
        .list_books(&BookListQuery {
            genre: Some(classic.id),
            ..BookListQuery::default()
        })
        .unwrap()
        .into_iter()
        .map(|book| book.title)
        .collect();
    assert_eq!(by_genre, vec!["Candide", "Emma"]);

    let french = books
        .list_books(&BookListQuery {
            language: Some(Language::French),
            ..BookListQuery::default()
        })
        .unwrap();
    assert_eq!(french.len(), 1);
    assert_eq!(french[0].title, "Candide");

    let paged = books
        .list_books(&BookListQuery {
            page: Page::new(2, 1),
            ..BookListQuery::default()
        })
        .unwrap();
    assert_eq!(paged.len(), 2);
    assert_eq!(paged[0].title, "Candide");
}

#[test]
fn authors_list_by_last_then_first_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    for (first, last) in [("Mary", "Shelley"), ("Anne", "Bronte"), ("Charlotte", "Bronte")] {
        repo.create_author(&Author::new(first, last)).unwrap();
    }

    let names: Vec<String> = repo
        .list_authors(&Page::default())
        .unwrap()
        .into_iter()
        .map(|author| author.to_string())
        .collect();
    assert_eq!(names, vec!["Bronte Anne", "Bronte Charlotte", "Shelley Mary"]);
}

#[test]
fn update_missing_book_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let book = Book::new("Nowhere", "2222222222222", "Never stored.");
    let err = books.update_book(&book).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: EntityKind::Book, .. }));
}
