use axum::{Json, Router, extract::State};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema,
};
use std::sync::Arc;
use urlquery::{Page, ParameterMap, QueryCompiler, QueryError};

pub mod user_entity;

use user_entity::{ActiveModel as UserActiveModel, Model as User, Users};

// Helper function to get database URL from environment or default to SQLite
fn get_test_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

/// (name, email, age, active, `created_at`)
pub const SEED_USERS: [(&str, &str, i32, bool, i64); 5] = [
    ("Ann", "ann@example.com", 34, true, 5),
    ("Bob", "bob@example.com", 19, false, 3),
    ("Annie", "annie@corp.test", 52, true, 1),
    ("Carl", "carl@example.com", 27, true, 4),
    ("Dana", "dana@corp.test", 45, false, 2),
];

#[allow(dead_code)]
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(&get_test_database_url()).await?;
    let backend = db.get_database_backend();

    let _ = db.execute_unprepared("DROP TABLE IF EXISTS users").await;
    db.execute(backend.build(&Schema::new(backend).create_table_from_entity(user_entity::Entity)))
        .await?;

    for (name, email, age, active, created_at) in SEED_USERS {
        UserActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password: Set(format!("{name}-secret")),
            age: Set(age),
            active: Set(active),
            created_at: Set(created_at),
            ..Default::default()
        }
        .insert(&db)
        .await?;
    }

    Ok(db)
}

#[allow(dead_code)]
pub fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|user| user.name.as_str()).collect()
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub compiler: Arc<QueryCompiler>,
}

async fn list_users(
    State(state): State<AppState>,
    params: ParameterMap,
) -> Result<Json<Page<User>>, QueryError> {
    let page = state
        .compiler
        .paginate_by_parameters::<Users>(&state.db, &params)
        .await?;
    Ok(Json(page))
}

async fn list_users_global(
    State(state): State<AppState>,
    params: ParameterMap,
) -> Result<Json<Vec<User>>, QueryError> {
    Ok(Json(
        urlquery::get_by_parameters::<Users>(&state.db, &params).await?,
    ))
}

#[allow(dead_code)]
pub fn setup_test_app(db: DatabaseConnection, compiler: QueryCompiler) -> Router {
    let state = AppState {
        db,
        compiler: Arc::new(compiler),
    };

    let api = Router::new()
        .route("/users", axum::routing::get(list_users))
        .route("/global/users", axum::routing::get(list_users_global))
        .with_state(state);

    Router::new().nest("/api/v1", api)
}
