#![allow(dead_code)]

use joinwise::{Entity, Registry, Shape};
use serde::Deserialize;

#[derive(Entity, Debug, Deserialize, PartialEq)]
#[entity(table = "users")]
pub struct User {
    #[column(primary)]
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    #[column(name = "created_at", fill = "insert")]
    pub created: i64,
}

#[derive(Entity, Debug, Deserialize, PartialEq)]
#[entity(table = "posts")]
pub struct Post {
    #[column(primary)]
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub views: i64,
}

/// Table name defaults to the snake_case struct name.
#[derive(Entity, Debug)]
pub struct PostComment {
    #[column(primary)]
    pub id: i64,
    pub post_id: i64,
    pub body: String,
    #[column(skip)]
    pub cached_html: Option<String>,
}

/// Self-referencing: a category may have a parent category.
#[derive(Entity, Debug, Deserialize, PartialEq)]
#[entity(table = "category")]
pub struct Category {
    #[column(primary)]
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
}

#[derive(Shape, Debug, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct PostItem {
    pub id: i64,
    pub title: String,
}

#[derive(Shape, Debug, Deserialize, PartialEq)]
pub struct UserWithPosts {
    pub id: i64,
    pub name: String,
    pub posts: Vec<PostItem>,
}

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register::<User>()
        .and_then(|r| r.register::<Post>())
        .and_then(|r| r.register::<PostComment>())
        .and_then(|r| r.register::<Category>())
        .expect("test entities register");
    registry
}
