//! End-to-end tests for recipes, collections and the shopping list.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{Method, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;

async fn ingredient_id(pool: &PgPool, name: &str, unit: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(unit)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn tag_id(app: &common::TestApp, slug: &str) -> i64 {
    let (_, tags) = common::get_json(app, "/api/tags/", None).await;
    tags.as_array()
        .unwrap()
        .iter()
        .find(|tag| tag["slug"] == slug)
        .unwrap()["id"]
        .as_i64()
        .unwrap()
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_recipe_create_round_trip(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (chef_id, token) = common::sign_up(&app, "chef").await;
    let lunch = tag_id(&app, "lunch").await;
    let flour = ingredient_id(&pool, "Flour", "g").await;

    // POST /api/recipes/
    let (status, created) = common::post_json(
        &app,
        "/api/recipes/",
        Some(&token),
        &json!({
            "ingredients": [{"id": flour, "amount": 250}],
            "tags": [lunch],
            "image": common::png_data_uri(),
            "name": "Flatbread",
            "text": "Mix, rest, bake.",
            "cooking_time": 25,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    // The image landed under the media root.
    let image_url = created["image"].as_str().unwrap();
    let relative = image_url.strip_prefix("http://testserver/media/").unwrap();
    assert!(app.media.path().join(relative).exists());

    // GET /api/recipes/{id}/ as an anonymous reader.
    let (status, json) =
        common::get_json(&app, &format!("/api/recipes/{}/", created["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["author"]["id"], chef_id);
    assert_eq!(json["author"]["is_subscribed"], false);
    assert_eq!(json["ingredients"][0]["measurement_unit"], "g");
    assert_eq!(json["ingredients"][0]["amount"], 250);
    assert_eq!(json["favorited_count"], 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_shopping_cart_download_sums_shared_ingredients(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, chef) = common::sign_up(&app, "chef").await;
    let (_, shopper) = common::sign_up(&app, "shopper").await;
    let dinner = tag_id(&app, "dinner").await;
    let flour = ingredient_id(&pool, "Flour", "g").await;
    let salt = ingredient_id(&pool, "Salt", "g").await;

    let mut recipe_ids = Vec::new();
    for (name, lines) in [
        ("A", json!([{"id": flour, "amount": 200}, {"id": salt, "amount": 5}])),
        ("B", json!([{"id": flour, "amount": 300}])),
    ] {
        let (status, created) = common::post_json(
            &app,
            "/api/recipes/",
            Some(&chef),
            &json!({
                "ingredients": lines,
                "tags": [dinner],
                "image": common::png_data_uri(),
                "name": name,
                "text": "Cook.",
                "cooking_time": 10,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        recipe_ids.push(created["id"].as_i64().unwrap());
    }

    // Empty cart first.
    let response = common::send(
        &app,
        Method::GET,
        "/api/recipes/download_shopping_cart/",
        Some(&shopper),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for id in &recipe_ids {
        let (status, _) = common::post_json(
            &app,
            &format!("/api/recipes/{id}/shopping_cart/"),
            Some(&shopper),
            &json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, in_cart) =
        common::get_json(&app, "/api/recipes/?is_in_shopping_cart=1", Some(&shopper)).await;
    assert_eq!(in_cart["count"], 2);

    let response = common::send(
        &app,
        Method::GET,
        "/api/recipes/download_shopping_cart/",
        Some(&shopper),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION],
        "attachment; filename=\"ShoppingCart.pdf\""
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let document = lopdf::Document::load_mem(&bytes).unwrap();
    let text = document.extract_text(&[1]).unwrap();
    let cells: Vec<&str> = text.lines().map(str::trim).collect();
    assert!(cells.contains(&"Flour"));
    assert!(cells.contains(&"500"));
    assert!(cells.contains(&"Salt"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_subscriptions_embed_newest_recipes(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (chef_id, chef) = common::sign_up(&app, "chef").await;
    let (_, reader) = common::sign_up(&app, "reader").await;
    let breakfast = tag_id(&app, "breakfast").await;
    let oats = ingredient_id(&pool, "Oats", "g").await;

    for name in ["Porridge", "Granola"] {
        let (status, _) = common::post_json(
            &app,
            "/api/recipes/",
            Some(&chef),
            &json!({
                "ingredients": [{"id": oats, "amount": 80}],
                "tags": [breakfast],
                "image": common::png_data_uri(),
                "name": name,
                "text": "Stir.",
                "cooking_time": 5,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, subscription) = common::post_json(
        &app,
        &format!("/api/users/{chef_id}/subscribe/?recipes_limit=1"),
        Some(&reader),
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{subscription}");
    assert_eq!(subscription["recipes_count"], 2);
    assert_eq!(subscription["recipes"].as_array().unwrap().len(), 1);

    let (status, page) = common::get_json(&app, "/api/users/subscriptions/", Some(&reader)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["username"], "chef");
    assert_eq!(page["results"][0]["recipes"].as_array().unwrap().len(), 2);

    let status = common::delete(&app, &format!("/api/users/{chef_id}/subscribe/"), Some(&reader)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
