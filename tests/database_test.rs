use chrono::NaiveDateTime;
use notice_drafter::db::{Database, DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE_TEXT};
use notice_drafter::error::NoticeError;
use notice_drafter::models::{
    Category, Language, MessageFilter, MessageTable, NewInputMessage, NewRecord, NewTaggedMessage,
};

fn at(stamp: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").expect("Failed to parse timestamp")
}

fn converted(message: &str, district: &str, category: Category) -> NewRecord {
    NewRecord::Converted(NewTaggedMessage {
        message: message.to_string(),
        district: district.to_string(),
        category,
    })
}

#[test]
fn test_database_creation_seeds_default_template() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("nested").join("messages.db");

    let db = Database::new(&db_path).expect("Failed to create database");
    assert!(db_path.exists());

    let names = db.list_template_names().expect("Failed to list templates");
    assert_eq!(names, vec![DEFAULT_TEMPLATE_NAME.to_string()]);
    assert_eq!(
        db.get_template_text(DEFAULT_TEMPLATE_NAME).expect("Failed to get template"),
        DEFAULT_TEMPLATE_TEXT
    );
}

#[test]
fn test_reopen_keeps_history_and_templates() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("messages.db");

    {
        let db = Database::new(&db_path).expect("Failed to create database");
        db.append(&converted("kept", "Karachi", Category::B)).expect("Failed to append");
        assert!(db.create_template("Short", "{activity}").expect("Failed to create template"));
        db.close().expect("Failed to close");
    }

    let db = Database::new(&db_path).expect("Failed to reopen database");
    assert_eq!(db.count(MessageTable::Converted).expect("Failed to count"), 1);
    assert_eq!(
        db.list_template_names().expect("Failed to list templates"),
        vec![DEFAULT_TEMPLATE_NAME.to_string(), "Short".to_string()]
    );
}

#[test]
fn test_create_template_rejects_duplicate_name() {
    let db = Database::open_in_memory().expect("Failed to open database");

    assert!(db.create_template("Brief", "{activity} at {venue}").expect("Failed to create"));
    assert!(!db.create_template("Brief", "{time}").expect("Duplicate should not error"));
    assert_eq!(db.get_template_text("Brief").expect("Failed to get"), "{activity} at {venue}");
}

#[test]
fn test_update_template() {
    let db = Database::open_in_memory().expect("Failed to open database");

    assert!(db.update_template(DEFAULT_TEMPLATE_NAME, "{venue}").expect("Failed to update"));
    assert_eq!(db.get_template_text(DEFAULT_TEMPLATE_NAME).expect("Failed to get"), "{venue}");

    assert!(!db.update_template("Missing", "{venue}").expect("Failed to update"));
    assert_eq!(db.get_template_text("Missing").expect("Failed to get"), "");
}

#[test]
fn test_template_names_are_sorted() {
    let db = Database::open_in_memory().expect("Failed to open database");
    db.create_template("Zeta", "{time}").expect("Failed to create");
    db.create_template("Alpha", "{time}").expect("Failed to create");

    assert_eq!(
        db.list_template_names().expect("Failed to list"),
        vec!["Alpha".to_string(), DEFAULT_TEMPLATE_NAME.to_string(), "Zeta".to_string()]
    );
}

#[test]
fn test_query_by_date_newest_first() {
    let db = Database::open_in_memory().expect("Failed to open database");

    db.append_at(&converted("first", "Hyd", Category::A), at("2024-01-01 10:00:00"))
        .expect("Failed to append");
    db.append_at(&converted("second", "Hyd", Category::A), at("2024-01-01 18:30:00"))
        .expect("Failed to append");
    db.append_at(&converted("next day", "Hyd", Category::A), at("2024-01-02 09:00:00"))
        .expect("Failed to append");

    let day = db
        .query(MessageTable::Converted, &MessageFilter::new().with_date("2024-01-01"))
        .expect("Failed to query");
    let messages: Vec<&str> = day.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["second", "first"]);
    assert_eq!(day[0].timestamp, "2024-01-01 18:30:00");

    let all = db.query(MessageTable::Converted, &MessageFilter::new()).expect("Failed to query");
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].message, "next day");
}

#[test]
fn test_same_second_rows_keep_insertion_order_reversed() {
    let db = Database::open_in_memory().expect("Failed to open database");
    let stamp = at("2024-03-05 12:00:00");

    db.append_at(&converted("older", "Lahore", Category::C), stamp).expect("Failed to append");
    db.append_at(&converted("newer", "Lahore", Category::C), stamp).expect("Failed to append");

    let entries = db.query(MessageTable::Converted, &MessageFilter::new()).expect("Failed to query");
    assert_eq!(entries[0].message, "newer");
    assert_eq!(entries[1].message, "older");
}

#[test]
fn test_query_by_district_and_category() {
    let db = Database::open_in_memory().expect("Failed to open database");

    db.append(&converted("k-a", "Karachi", Category::A)).expect("Failed to append");
    db.append(&converted("k-b", "Karachi", Category::B)).expect("Failed to append");
    db.append(&converted("l-a", "Lahore", Category::A)).expect("Failed to append");

    let karachi = db
        .query(MessageTable::Converted, &MessageFilter::new().with_district("Karachi"))
        .expect("Failed to query");
    assert_eq!(karachi.len(), 2);

    let both = db
        .query(
            MessageTable::Converted,
            &MessageFilter::new().with_district("Karachi").with_category(Category::A),
        )
        .expect("Failed to query");
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].message, "k-a");

    // Empty strings are treated as "any"
    let unfiltered = MessageFilter {
        date: Some(String::new()),
        district: Some(String::new()),
        category: None,
    };
    assert_eq!(db.query(MessageTable::Converted, &unfiltered).expect("Failed to query").len(), 3);
}

#[test]
fn test_records_keep_tags() {
    let db = Database::open_in_memory().expect("Failed to open database");
    let id = db
        .append(&NewRecord::Input(NewInputMessage {
            message: "Meeting in Multan".to_string(),
            lang: Language::Urdu,
            district: "Multan".to_string(),
            category: Category::C,
        }))
        .expect("Failed to append");

    let records = db.records(MessageTable::Input, &MessageFilter::new()).expect("Failed to read");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].district, "Multan");
    assert_eq!(records[0].category, "C");

    // Tables are independent logs
    assert_eq!(db.count(MessageTable::Translated).expect("Failed to count"), 0);
}

#[test]
fn test_close_is_idempotent() {
    let db = Database::open_in_memory().expect("Failed to open database");
    assert!(!db.is_closed());

    db.close().expect("First close failed");
    db.close().expect("Second close failed");
    assert!(db.is_closed());

    let err = db.list_template_names().expect_err("Closed store should fail");
    assert!(matches!(err, NoticeError::StoreClosed));
    assert!(!err.is_recoverable());
}
