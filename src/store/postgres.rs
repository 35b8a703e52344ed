//! PostgreSQL-backed store

use async_trait::async_trait;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row};

use super::{CourseStore, UserStore};
use crate::error::{Error, Result};
use crate::models::user::DUPLICATE_EMAIL_MESSAGE;
use crate::models::{
    Course, CourseChanges, CourseWithOwner, NewCourse, NewUser, User, UserInfo,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email_address TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS courses (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    estimated_time TEXT,
    materials_needed TEXT,
    user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS courses_user_id_idx ON courses (user_id);
"#;

const USER_COLUMNS: &str =
    "id, first_name, last_name, email_address, password, created_at, updated_at";

const COURSE_COLUMNS: &str = "id, title, description, estimated_time, materials_needed, \
     user_id, created_at, updated_at";

const JOINED_SELECT: &str = "SELECT c.id, c.title, c.description, c.estimated_time, \
     c.materials_needed, c.user_id, u.first_name, u.last_name, u.email_address \
     FROM courses c JOIN users u ON u.id = c.user_id";

/// Store backed by a single pipelined tokio-postgres connection
pub struct PgStore {
    client: Client,
}

impl PgStore {
    /// Connect using a tokio-postgres connection string
    pub async fn connect(url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await?;

        // The connection future drives the socket and must be polled
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        tracing::info!("Connected to PostgreSQL");
        Ok(Self { client })
    }

    /// Create the users and courses tables if they do not exist
    pub async fn migrate(&self) -> Result<()> {
        self.client.batch_execute(SCHEMA).await?;
        tracing::info!("Database schema is up to date");
        Ok(())
    }
}

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email_address: row.get("email_address"),
        password_hash: row.get("password"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn course_from_row(row: &Row) -> Course {
    Course {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        estimated_time: row.get("estimated_time"),
        materials_needed: row.get("materials_needed"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn joined_from_row(row: &Row) -> CourseWithOwner {
    let user_id: i64 = row.get("user_id");
    CourseWithOwner {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        estimated_time: row.get("estimated_time"),
        materials_needed: row.get("materials_needed"),
        user_id,
        course_user: UserInfo {
            id: user_id,
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email_address: row.get("email_address"),
        },
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let query = format!(
            "INSERT INTO users (first_name, last_name, email_address, password) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let result = self
            .client
            .query_one(
                &query,
                &[
                    &user.first_name,
                    &user.last_name,
                    &user.email_address,
                    &user.password_hash,
                ],
            )
            .await;

        match result {
            Ok(row) => Ok(user_from_row(&row)),
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                Err(Error::validation(DUPLICATE_EMAIL_MESSAGE))
            }
            Err(e) => Err(Error::Database(e)),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email_address = $1", USER_COLUMNS);
        let row = self.client.query_opt(&query, &[&email]).await?;
        Ok(row.as_ref().map(user_from_row))
    }
}

#[async_trait]
impl CourseStore for PgStore {
    async fn create_course(&self, course: NewCourse) -> Result<Course> {
        let query = format!(
            "INSERT INTO courses (title, description, estimated_time, materials_needed, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COURSE_COLUMNS
        );
        let row = self
            .client
            .query_one(
                &query,
                &[
                    &course.title,
                    &course.description,
                    &course.estimated_time,
                    &course.materials_needed,
                    &course.user_id,
                ],
            )
            .await?;
        Ok(course_from_row(&row))
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>> {
        let query = format!("SELECT {} FROM courses WHERE id = $1", COURSE_COLUMNS);
        let row = self.client.query_opt(&query, &[&id]).await?;
        Ok(row.as_ref().map(course_from_row))
    }

    async fn find_course_with_owner(&self, id: i64) -> Result<Option<CourseWithOwner>> {
        let query = format!("{} WHERE c.id = $1", JOINED_SELECT);
        let row = self.client.query_opt(&query, &[&id]).await?;
        Ok(row.as_ref().map(joined_from_row))
    }

    async fn list_courses(&self) -> Result<Vec<CourseWithOwner>> {
        let query = format!("{} ORDER BY c.id", JOINED_SELECT);
        let rows = self.client.query(&query, &[]).await?;
        Ok(rows.iter().map(joined_from_row).collect())
    }

    async fn update_course(&self, id: i64, changes: CourseChanges) -> Result<Option<Course>> {
        // Nullable columns take a "was supplied" flag so an explicit null can clear them
        let query = format!(
            "UPDATE courses SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 estimated_time = CASE WHEN $4 THEN $5 ELSE estimated_time END, \
                 materials_needed = CASE WHEN $6 THEN $7 ELSE materials_needed END, \
                 updated_at = now() \
             WHERE id = $1 RETURNING {}",
            COURSE_COLUMNS
        );
        let set_estimated_time = changes.estimated_time.is_some();
        let estimated_time = changes.estimated_time.flatten();
        let set_materials_needed = changes.materials_needed.is_some();
        let materials_needed = changes.materials_needed.flatten();

        let row = self
            .client
            .query_opt(
                &query,
                &[
                    &id,
                    &changes.title,
                    &changes.description,
                    &set_estimated_time,
                    &estimated_time,
                    &set_materials_needed,
                    &materials_needed,
                ],
            )
            .await?;
        Ok(row.as_ref().map(course_from_row))
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        let deleted = self
            .client
            .execute("DELETE FROM courses WHERE id = $1", &[&id])
            .await?;
        Ok(deleted > 0)
    }
}
