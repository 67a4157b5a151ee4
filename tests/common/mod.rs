#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use store_ratings::auth::generate_token;
use store_ratings::model::{Role, Store, User};
use store_ratings::queries::store::{NewStore, insert_store};
use store_ratings::queries::user::{NewUser, insert_user};
use store_ratings::{create_app, test_jwt_secret};

pub async fn setup_test_db() -> SqlitePool {
    let pool = store_ratings::db::create_pool(":memory:", 1).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
}

pub async fn create_test_app() -> TestApp {
    let pool = setup_test_db().await;
    TestApp {
        router: create_app(pool.clone()),
        pool,
    }
}

impl TestApp {
    /// Insert a user row directly and mint a token for it. The password
    /// hash is a placeholder; login-path tests go through /auth/register.
    pub async fn seed_user(&self, name: &str, email: &str, role: Role) -> (User, String) {
        let user = insert_user(
            &self.pool,
            NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: "seeded-placeholder-hash".to_string(),
                address: None,
                role,
            },
        )
        .await
        .unwrap();

        let token = generate_token(&user.id, &user.email, user.role, test_jwt_secret(), 7).unwrap();

        (user, token)
    }

    pub async fn seed_store(&self, owner_id: &str, name: &str) -> Store {
        insert_store(
            &self.pool,
            NewStore {
                name: name.to_string(),
                email: None,
                address: None,
                owner_id: owner_id.to_string(),
            },
        )
        .await
        .unwrap()
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    /// Read the persisted aggregate directly, bypassing the HTTP layer
    pub async fn store_average(&self, store_id: &str) -> f64 {
        sqlx::query_scalar("SELECT average_rating FROM stores WHERE id = ?")
            .bind(store_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}
