mod common;

use common::{Post, PostComment, User, UserSummary, UserWithPosts};
use joinwise::{Entity, FieldFill, Shape};

#[test]
fn entity_metadata_follows_declaration_order() {
    assert_eq!(User::TABLE, "users");

    let properties: Vec<_> = User::COLUMNS.iter().map(|c| c.property).collect();
    assert_eq!(properties, ["id", "name", "email", "created"]);

    let columns: Vec<_> = User::COLUMNS.iter().map(|c| c.column).collect();
    assert_eq!(columns, ["id", "name", "email", "created_at"]);
}

#[test]
fn column_attributes() {
    let id = &User::COLUMNS[0];
    assert!(id.primary_key);
    assert!(!id.nullable);
    assert_eq!(id.type_hint, "i64");

    let email = &User::COLUMNS[2];
    assert!(email.nullable);
    assert!(!email.primary_key);
    assert_eq!(email.type_hint, "Option<String>");
    assert!(email.is_char_sequence());

    let created = &User::COLUMNS[3];
    assert_eq!(created.fill, FieldFill::Insert);
    assert_eq!(User::COLUMNS[1].fill, FieldFill::Default);
}

#[test]
fn default_table_name_and_skipped_fields() {
    assert_eq!(PostComment::TABLE, "post_comment");

    let properties: Vec<_> = PostComment::COLUMNS.iter().map(|c| c.property).collect();
    assert_eq!(properties, ["id", "post_id", "body"]);

    // skipped fields keep their accessor and shape property
    assert_eq!(PostComment::cached_html.name(), "cached_html");
    assert!(PostComment::PROPERTIES.contains(&"cached_html"));
}

#[test]
fn accessor_consts() {
    assert_eq!(User::id.name(), "id");
    assert_eq!(User::created.name(), "created");
    assert_eq!(Post::user_id.name(), "user_id");
}

#[test]
fn shape_properties() {
    assert_eq!(UserSummary::PROPERTIES, ["id", "name", "nickname"]);
    assert_eq!(UserWithPosts::PROPERTIES, ["id", "name", "posts"]);
    assert_eq!(UserWithPosts::posts.name(), "posts");
    assert_eq!(User::PROPERTIES, ["id", "name", "email", "created"]);
}
