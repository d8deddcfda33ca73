mod common;

use std::collections::HashMap;

use common::{Post, PostItem, User, UserSummary, UserWithPosts, registry};
use joinwise::{Result, Row, Value, Wrapper};

fn user_row(id: i64, name: &str, post: Option<(i64, &str, i64)>) -> Row {
    let row = Row::new().with("id", id).with("name", name);
    match post {
        Some((post_id, title, views)) => row
            .with("t1_id", post_id)
            .with("user_id", id)
            .with("title", title)
            .with("views", views),
        None => row
            .with("t1_id", Value::Null)
            .with("user_id", Value::Null)
            .with("title", Value::Null)
            .with("views", Value::Null),
    }
}

#[test]
fn test_collection_folds_onto_shape() -> Result<()> {
    let registry = registry();
    let query = Wrapper::new::<User>(&registry)?
        .select((User::id, User::name))?
        .select_collection::<Post, _, _>(UserWithPosts::posts)?
        .left_join_on(Post::user_id, User::id)?
        .render()?;

    assert_eq!(
        query.sql,
        "SELECT t.id, t.name, t1.id AS t1_id, t1.user_id, t1.title, t1.views \
         FROM users t LEFT JOIN posts t1 ON t1.user_id = t.id"
    );

    let rows = vec![
        user_row(1, "ann", Some((11, "second", 5))),
        user_row(2, "bob", None),
        user_row(1, "ann", Some((10, "first", 3))),
        user_row(1, "ann", Some((11, "second", 5))),
    ];

    let users: Vec<UserWithPosts> = query.bind_all(rows)?;
    assert_eq!(
        users,
        vec![
            UserWithPosts {
                id: 1,
                name: "ann".into(),
                posts: vec![
                    PostItem {
                        id: 11,
                        title: "second".into(),
                    },
                    PostItem {
                        id: 10,
                        title: "first".into(),
                    },
                ],
            },
            UserWithPosts {
                id: 2,
                name: "bob".into(),
                posts: vec![],
            },
        ]
    );
    Ok(())
}

#[test]
fn test_bind_entity_and_map() -> Result<()> {
    let registry = registry();
    let query = Wrapper::new::<User>(&registry)?.render()?;

    let row = Row::new()
        .with("id", 3)
        .with("name", "cy")
        .with("email", Value::Null)
        .with("created_at", 1_700_000_000);
    let records = query.fold([row]);
    assert_eq!(records.len(), 1);

    // labels are renamed to properties
    let record = &records[0];
    assert_eq!(record.value("created"), Some(&Value::from(1_700_000_000)));
    assert!(record.value("created_at").is_none());

    let user: User = record.bind()?;
    assert_eq!(
        user,
        User {
            id: 3,
            name: "cy".into(),
            email: None,
            created: 1_700_000_000,
        }
    );

    let map: HashMap<String, serde_json::Value> = record.bind()?;
    assert_eq!(map["name"], serde_json::json!("cy"));
    assert_eq!(map["email"], serde_json::Value::Null);
    Ok(())
}

#[test]
fn test_colliding_columns_keep_driving_value() -> Result<()> {
    let registry = registry();
    let query = Wrapper::new::<User>(&registry)?
        .select((User::id, User::name, Post::id))?
        .inner_join_on(Post::user_id, User::id)?
        .render()?;

    assert_eq!(
        query.sql,
        "SELECT t.id, t.name, t1.id AS t1_id FROM users t INNER JOIN posts t1 ON t1.user_id = t.id"
    );
    let properties: Vec<_> = query.shape.columns().iter().map(|c| c.property.as_str()).collect();
    assert_eq!(properties, ["id", "name", "t1_id"]);

    let row = Row::new().with("id", 1).with("name", "ann").with("t1_id", 99);
    let records = query.fold([row.clone()]);
    let map: HashMap<String, serde_json::Value> = records[0].bind()?;
    assert_eq!(map["id"], serde_json::json!(1));
    assert_eq!(map["t1_id"], serde_json::json!(99));

    let summaries: Vec<UserSummary> = query.bind_all([row])?;
    assert_eq!(
        summaries,
        vec![UserSummary {
            id: 1,
            name: "ann".into(),
            nickname: None,
        }]
    );
    Ok(())
}

#[test]
fn test_aliased_function_binds_by_alias() -> Result<()> {
    #[derive(serde::Deserialize)]
    struct Total {
        total: i64,
    }

    let registry = registry();
    let query = Wrapper::new::<User>(&registry)?
        .select_sum_as(User::id, "total")?
        .render()?;

    let totals: Vec<Total> = query.bind_all([Row::new().with("total", 42)])?;
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].total, 42);
    Ok(())
}

#[test]
fn test_bind_mismatch_is_mapping_error() -> Result<()> {
    let registry = registry();
    let query = Wrapper::new::<User>(&registry)?.select(User::name)?.render()?;

    let result = query.bind_all::<User, _>([Row::new().with("name", "dee")]);
    assert!(matches!(result, Err(joinwise::JoinError::Mapping(_))));
    Ok(())
}
