use catalog_core::admin::{
    catalog_registrations, filter_options, AdminConfigError, AdminSite, ChangeList,
    ChangeListError, DateRange, FormRow, ListFilter, ModelAdmin, DISPLAY_COLUMN, EMPTY_VALUE,
};
use catalog_core::{
    Author, Book, BookInstance, BookInstanceEntry, EntityKind, Genre, Language, LoanStatus,
};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn catalog_site() -> AdminSite {
    AdminSite::new(catalog_registrations()).unwrap()
}

#[test]
fn catalog_registers_every_entity() {
    let site = catalog_site();
    for entity in EntityKind::ALL {
        assert!(site.is_registered(entity), "{entity} is not registered");
    }
    assert_eq!(site.registrations().count(), 4);
}

#[test]
fn catalog_registrations_match_console_configuration() {
    let site = catalog_site();

    let copies = site.get(EntityKind::BookInstance).unwrap();
    assert_eq!(copies.list_display, vec![DISPLAY_COLUMN]);
    assert_eq!(copies.list_filter, vec!["status", "due_back"]);

    let books = site.get(EntityKind::Book).unwrap();
    assert_eq!(books.list_display, vec!["title", "isbn", "language"]);
    assert!(books.list_filter.is_empty());

    let authors = site.get(EntityKind::Author).unwrap();
    assert_eq!(
        authors.list_display,
        vec!["first_name", "last_name", "date_of_birth", "date_of_death"]
    );
    assert_eq!(
        site.form_layout(EntityKind::Author).unwrap(),
        vec![
            FormRow::Single("first_name"),
            FormRow::Single("last_name"),
            FormRow::Inline(vec!["date_of_birth", "date_of_death"]),
        ]
    );

    let genres = site.get(EntityKind::Genre).unwrap();
    assert_eq!(genres.list_display, vec![DISPLAY_COLUMN]);
    assert_eq!(
        site.form_layout(EntityKind::Genre).unwrap(),
        vec![FormRow::Single("title")]
    );
}

#[test]
fn duplicate_registration_is_rejected() {
    let err = AdminSite::new([
        ModelAdmin::new(EntityKind::Genre),
        ModelAdmin::new(EntityKind::Genre),
    ])
    .unwrap_err();
    assert_eq!(err, AdminConfigError::DuplicateRegistration(EntityKind::Genre));
}

#[test]
fn invalid_field_references_are_rejected() {
    let err = AdminSite::new([ModelAdmin::new(EntityKind::Book).list_display(&["publisher"])])
        .unwrap_err();
    assert_eq!(
        err,
        AdminConfigError::UnknownField {
            entity: EntityKind::Book,
            option: "list_display",
            field: "publisher",
        }
    );

    let err = AdminSite::new([ModelAdmin::new(EntityKind::Book).list_filter(&["isbn"])])
        .unwrap_err();
    assert!(matches!(
        err,
        AdminConfigError::Unsupported {
            option: "list_filter",
            field: "isbn",
            ..
        }
    ));

    let err = AdminSite::new([ModelAdmin::new(EntityKind::Book).list_display(&["genre"])])
        .unwrap_err();
    assert!(matches!(err, AdminConfigError::Unsupported { field: "genre", .. }));

    let err = AdminSite::new([ModelAdmin::new(EntityKind::Author)
        .fields(vec![FormRow::Single("id"), FormRow::Single("last_name")])])
    .unwrap_err();
    assert!(matches!(
        err,
        AdminConfigError::Unsupported {
            option: "fields",
            field: "id",
            ..
        }
    ));
}

#[test]
fn empty_and_repeated_entries_are_rejected() {
    let err = AdminSite::new([ModelAdmin::new(EntityKind::Genre).list_display(&[])]).unwrap_err();
    assert_eq!(err, AdminConfigError::EmptyListDisplay(EntityKind::Genre));

    let err = AdminSite::new([ModelAdmin::new(EntityKind::Author).fields(vec![
        FormRow::Single("first_name"),
        FormRow::Inline(Vec::new()),
    ])])
    .unwrap_err();
    assert_eq!(err, AdminConfigError::EmptyFormRow(EntityKind::Author));

    let err = AdminSite::new([ModelAdmin::new(EntityKind::Author).fields(vec![
        FormRow::Single("first_name"),
        FormRow::Inline(vec!["last_name", "first_name"]),
    ])])
    .unwrap_err();
    assert!(matches!(
        err,
        AdminConfigError::DuplicateField {
            option: "fields",
            field: "first_name",
            ..
        }
    ));
}

#[test]
fn author_change_list_renders_configured_columns() {
    let site = catalog_site();
    let admin = site.get(EntityKind::Author).unwrap();

    let mut austen = Author::new("Jane", "Austen");
    austen.date_of_birth = Some(date(1775, 12, 16));
    austen.date_of_death = Some(date(1817, 7, 18));
    let living = Author::new("Zadie", "Smith");

    let list = ChangeList::build(admin, &[austen.clone(), living.clone()], &[], date(2024, 1, 1))
        .unwrap();
    assert_eq!(
        list.headers,
        vec!["First name", "Last name", "Date of birth", "Date of death"]
    );
    assert_eq!(list.rows[0].id, austen.id);
    assert_eq!(
        list.rows[0].cells,
        vec!["Jane", "Austen", "1775-12-16", "1817-07-18"]
    );
    assert_eq!(
        list.rows[1].cells,
        vec!["Zadie", "Smith", EMPTY_VALUE, EMPTY_VALUE]
    );
}

#[test]
fn book_change_list_shows_language_labels() {
    let site = catalog_site();
    let admin = site.get(EntityKind::Book).unwrap();
    let book = Book::new("Candide", "9780140440041", "Optimism tested.")
        .with_language(Language::French);

    let list = ChangeList::build(admin, &[book], &[], date(2024, 1, 1)).unwrap();
    assert_eq!(list.headers, vec!["Title", "ISBN", "Language"]);
    assert_eq!(list.rows[0].cells, vec!["Candide", "9780140440041", "French"]);
}

#[test]
fn default_display_column_uses_canonical_string() {
    let site = catalog_site();
    let admin = site.get(EntityKind::Genre).unwrap();

    let list = ChangeList::build(admin, &[Genre::new("Poetry")], &[], date(2024, 1, 1)).unwrap();
    assert_eq!(list.headers, vec!["Genre"]);
    assert_eq!(list.rows[0].cells, vec!["Poetry"]);
}

#[test]
fn copy_change_list_applies_status_and_due_date_filters() {
    let site = catalog_site();
    let admin = site.get(EntityKind::BookInstance).unwrap();
    let today = date(2024, 3, 10);

    let mut due_today = BookInstance::new(None, "A");
    due_today.status = LoanStatus::OnLoan;
    due_today.due_back = Some(today);
    let mut due_last_year = BookInstance::new(None, "B");
    due_last_year.status = LoanStatus::OnLoan;
    due_last_year.due_back = Some(date(2023, 3, 10));
    let available = BookInstance::new(None, "C");
    let records: Vec<BookInstanceEntry> = [&due_today, &due_last_year, &available]
        .into_iter()
        .map(|copy| BookInstanceEntry::new(copy.clone(), None))
        .collect();

    let on_loan = ListFilter::Choice {
        field: "status",
        code: "l".to_string(),
    };
    let list = ChangeList::build(admin, &records, &[on_loan.clone()], today).unwrap();
    let ids: Vec<_> = list.rows.iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![due_today.id, due_last_year.id]);

    let this_year = ListFilter::Date {
        field: "due_back",
        range: DateRange::ThisYear,
    };
    let list = ChangeList::build(admin, &records, &[on_loan, this_year], today).unwrap();
    assert_eq!(list.rows.len(), 1);
    assert_eq!(list.rows[0].id, due_today.id);

    let no_date = ListFilter::Date {
        field: "due_back",
        range: DateRange::NoDate,
    };
    let list = ChangeList::build(admin, &records, &[no_date], today).unwrap();
    assert_eq!(list.rows.len(), 1);
    assert_eq!(list.rows[0].id, available.id);
    assert_eq!(list.rows[0].cells, vec![format!("{} (no book)", available.id)]);
}

#[test]
fn copy_change_list_shows_book_title() {
    let site = catalog_site();
    let admin = site.get(EntityKind::BookInstance).unwrap();
    let emma = Book::new("Emma", "9780141439587", "A young matchmaker meddles.");
    let copy = BookInstance::new(Some(emma.id), "Penguin, 2003");

    let entry = BookInstanceEntry::new(copy.clone(), Some(emma));
    let list = ChangeList::build(admin, &[entry], &[], date(2024, 1, 1)).unwrap();
    assert_eq!(list.headers, vec!["Book instance"]);
    assert_eq!(list.rows[0].id, copy.id);
    assert_eq!(list.rows[0].cells, vec![format!("{} (Emma)", copy.id)]);
}

#[test]
fn unregistered_or_invalid_filters_are_rejected() {
    let site = catalog_site();
    let copies = site.get(EntityKind::BookInstance).unwrap();
    let today = date(2024, 3, 10);

    let err = ChangeList::build::<BookInstanceEntry>(
        copies,
        &[],
        &[ListFilter::Choice {
            field: "status",
            code: "z".to_string(),
        }],
        today,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ChangeListError::InvalidChoice {
            field: "status",
            code: "z".to_string()
        }
    );

    let books = site.get(EntityKind::Book).unwrap();
    let err = ChangeList::build::<Book>(
        books,
        &[],
        &[ListFilter::Choice {
            field: "language",
            code: "en".to_string(),
        }],
        today,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ChangeListError::FilterNotAllowed {
            entity: EntityKind::Book,
            field: "language"
        }
    );

    let err = ChangeList::build::<Genre>(books, &[], &[], today).unwrap_err();
    assert_eq!(
        err,
        ChangeListError::EntityMismatch {
            admin: EntityKind::Book,
            records: EntityKind::Genre
        }
    );
}

#[test]
fn filter_options_describe_sidebar_choices() {
    let site = catalog_site();
    let specs = filter_options(site.get(EntityKind::BookInstance).unwrap());
    assert_eq!(specs.len(), 2);

    let status = &specs[0];
    assert_eq!(status.field, "status");
    assert_eq!(status.title, "Status");
    let labels: Vec<&str> = status.options.iter().map(|option| option.label).collect();
    assert_eq!(labels, vec!["All", "On loan", "Available", "Reserved"]);
    assert_eq!(status.options[0].filter, None);

    let due_back = &specs[1];
    let labels: Vec<&str> = due_back.options.iter().map(|option| option.label).collect();
    assert_eq!(
        labels,
        vec![
            "Any date",
            "Today",
            "Past 7 days",
            "This month",
            "This year",
            "No date",
            "Has date"
        ]
    );
    assert_eq!(
        due_back.options[1].filter,
        Some(ListFilter::Date {
            field: "due_back",
            range: DateRange::Today
        })
    );

    assert!(filter_options(site.get(EntityKind::Genre).unwrap()).is_empty());
}
