//! Aggregate consistency tests for the rating write path

mod common;

use axum::http::StatusCode;
use common::create_test_app;
use serde_json::json;
use store_ratings::model::Role;
use store_ratings::queries::rating::{count_ratings_for_pair, list_ratings_for_store};
use store_ratings::ratings::{recompute_store_average, submit_rating};

/// A store starts at 0, each submission moves the average to the mean of
/// the current rating set, updates replace in place, deletes recompute.
#[tokio::test]
async fn aggregate_tracks_rating_lifecycle() {
    let app = create_test_app().await;

    let (owner, _) = app.seed_user("Shop Owner", "owner@example.com", Role::StoreOwner).await;
    let store = app.seed_store(&owner.id, "Corner Shop").await;
    let (u1, t1) = app.seed_user("User One", "u1@example.com", Role::User).await;
    let (u2, t2) = app.seed_user("User Two", "u2@example.com", Role::User).await;
    let (_, admin_token) = app.seed_user("Admin", "admin@example.com", Role::Admin).await;

    // No ratings yet
    let (status, stores) = app.request("GET", "/stores", Some(&t1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stores[0]["average_rating"], 0.0);

    // U1 rates 4 -> average 4.0
    let (status, body) = app
        .request(
            "POST",
            "/ratings",
            Some(&t1),
            Some(json!({"store_id": store.id, "rating": 4})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 4);
    assert_eq!(app.store_average(&store.id).await, 4.0);

    // U2 rates 2 -> average 3.0
    let (status, _) = app
        .request(
            "POST",
            "/ratings",
            Some(&t2),
            Some(json!({"store_id": store.id, "rating": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store_average(&store.id).await, 3.0);

    // U1 re-submits 5: updated in place, no new row, average 3.5
    let (status, _) = app
        .request(
            "POST",
            "/ratings",
            Some(&t1),
            Some(json!({"store_id": store.id, "rating": 5})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count_ratings_for_pair(&app.pool, &u1.id, &store.id).await.unwrap(), 1);
    assert_eq!(app.store_average(&store.id).await, 3.5);

    // Admin deletes U2's rating -> only U1's 5 remains
    let ratings = list_ratings_for_store(&app.pool, &store.id).await.unwrap();
    let u2_rating = ratings.iter().find(|r| r.user_id == u2.id).unwrap();

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/ratings/{}", u2_rating.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.store_average(&store.id).await, 5.0);
}

#[tokio::test]
async fn resubmission_keeps_the_same_row() {
    let app = create_test_app().await;

    let (owner, _) = app.seed_user("Owner", "owner@example.com", Role::StoreOwner).await;
    let store = app.seed_store(&owner.id, "Shop").await;
    let (u1, _) = app.seed_user("User", "u1@example.com", Role::User).await;

    let first = submit_rating(&app.pool, &u1.id, &store.id, 3).await.unwrap();
    let second = submit_rating(&app.pool, &u1.id, &store.id, 5).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.rating, 5);
    assert_eq!(count_ratings_for_pair(&app.pool, &u1.id, &store.id).await.unwrap(), 1);
}

#[tokio::test]
async fn rating_value_out_of_range_is_rejected() {
    let app = create_test_app().await;

    let (owner, _) = app.seed_user("Owner", "owner@example.com", Role::StoreOwner).await;
    let store = app.seed_store(&owner.id, "Shop").await;
    let (_, token) = app.seed_user("User", "u1@example.com", Role::User).await;

    for value in [0, 6, -1] {
        let (status, body) = app
            .request(
                "POST",
                "/ratings",
                Some(&token),
                Some(json!({"store_id": store.id, "rating": value})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "value {value} should be rejected");
        assert!(body["error"].as_str().unwrap().contains("between 1 and 5"));
    }

    assert_eq!(app.store_average(&store.id).await, 0.0);
}

#[tokio::test]
async fn rating_unknown_store_is_not_found() {
    let app = create_test_app().await;
    let (_, token) = app.seed_user("User", "u1@example.com", Role::User).await;

    let (status, _) = app
        .request(
            "POST",
            "/ratings",
            Some(&token),
            Some(json!({"store_id": "no-such-store", "rating": 3})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// The unique index is the authoritative guard: a raw duplicate insert for
/// the same (user, store) pair fails at the storage layer.
#[tokio::test]
async fn storage_layer_rejects_duplicate_pair() {
    let app = create_test_app().await;

    let (owner, _) = app.seed_user("Owner", "owner@example.com", Role::StoreOwner).await;
    let store = app.seed_store(&owner.id, "Shop").await;
    let (u1, _) = app.seed_user("User", "u1@example.com", Role::User).await;

    submit_rating(&app.pool, &u1.id, &store.id, 4).await.unwrap();

    let err = sqlx::query(
        "INSERT INTO ratings (id, rating, user_id, store_id, created_at, updated_at)
         VALUES ('dup', 2, ?, ?, 0, 0)",
    )
    .bind(&u1.id)
    .bind(&store.id)
    .execute(&app.pool)
    .await
    .unwrap_err();

    assert!(
        matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation()),
        "expected unique violation, got {err:?}"
    );
    assert_eq!(count_ratings_for_pair(&app.pool, &u1.id, &store.id).await.unwrap(), 1);
}

#[tokio::test]
async fn recompute_is_idempotent() {
    let app = create_test_app().await;

    let (owner, _) = app.seed_user("Owner", "owner@example.com", Role::StoreOwner).await;
    let store = app.seed_store(&owner.id, "Shop").await;
    let (u1, _) = app.seed_user("User One", "u1@example.com", Role::User).await;
    let (u2, _) = app.seed_user("User Two", "u2@example.com", Role::User).await;

    submit_rating(&app.pool, &u1.id, &store.id, 5).await.unwrap();
    submit_rating(&app.pool, &u2.id, &store.id, 2).await.unwrap();

    let first = recompute_store_average(&app.pool, &store.id).await.unwrap();
    let second = recompute_store_average(&app.pool, &store.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, 3.5);
    assert_eq!(app.store_average(&store.id).await, 3.5);
}

#[tokio::test]
async fn deleting_unknown_rating_is_not_found() {
    let app = create_test_app().await;
    let (_, admin_token) = app.seed_user("Admin", "admin@example.com", Role::Admin).await;

    let (status, _) = app
        .request("DELETE", "/ratings/no-such-rating", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Deleting a user cascades their ratings; affected store averages are
/// recomputed in the same transaction.
#[tokio::test]
async fn deleting_user_recomputes_store_averages() {
    let app = create_test_app().await;

    let (owner, _) = app.seed_user("Owner", "owner@example.com", Role::StoreOwner).await;
    let store = app.seed_store(&owner.id, "Shop").await;
    let (u1, _) = app.seed_user("User One", "u1@example.com", Role::User).await;
    let (u2, _) = app.seed_user("User Two", "u2@example.com", Role::User).await;
    let (_, admin_token) = app.seed_user("Admin", "admin@example.com", Role::Admin).await;

    submit_rating(&app.pool, &u1.id, &store.id, 5).await.unwrap();
    submit_rating(&app.pool, &u2.id, &store.id, 2).await.unwrap();
    assert_eq!(app.store_average(&store.id).await, 3.5);

    let (status, _) = app
        .request("DELETE", &format!("/users/{}", u2.id), Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(app.store_average(&store.id).await, 5.0);
    assert_eq!(count_ratings_for_pair(&app.pool, &u2.id, &store.id).await.unwrap(), 0);
}

#[tokio::test]
async fn ratings_listing_is_ordered_by_creation() {
    let app = create_test_app().await;

    let (owner, owner_token) = app.seed_user("Owner", "owner@example.com", Role::StoreOwner).await;
    let store = app.seed_store(&owner.id, "Shop").await;
    let (u1, _) = app.seed_user("User One", "u1@example.com", Role::User).await;
    let (u2, _) = app.seed_user("User Two", "u2@example.com", Role::User).await;

    submit_rating(&app.pool, &u1.id, &store.id, 4).await.unwrap();
    submit_rating(&app.pool, &u2.id, &store.id, 2).await.unwrap();

    let (status, body) = app
        .request(
            "GET",
            &format!("/stores/{}/ratings", store.id),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0]["created_at"].as_i64() <= listed[1]["created_at"].as_i64());

    let users: Vec<&str> = listed.iter().map(|r| r["user_id"].as_str().unwrap()).collect();
    assert!(users.contains(&u1.id.as_str()));
    assert!(users.contains(&u2.id.as_str()));
}
