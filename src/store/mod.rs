//! Persistence for users and courses
//!
//! Handlers only see the [`UserStore`] and [`CourseStore`] traits. Two
//! implementations exist: [`MemoryStore`] for tests and throwaway servers,
//! and [`PgStore`] backed by PostgreSQL.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::error::Result;
use crate::models::{Course, CourseChanges, CourseWithOwner, NewCourse, NewUser, User};

/// Credential store: user records with hashed passwords
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Insert a user. Fails with a validation error if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Exact-match lookup by email address
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Entity store: courses, each owned by one user
#[async_trait]
pub trait CourseStore: Send + Sync + 'static {
    async fn create_course(&self, course: NewCourse) -> Result<Course>;

    /// The bare record, used for ownership checks
    async fn find_course(&self, id: i64) -> Result<Option<Course>>;

    /// One course joined with its owner
    async fn find_course_with_owner(&self, id: i64) -> Result<Option<CourseWithOwner>>;

    /// All courses joined with their owners, ascending by id
    async fn list_courses(&self) -> Result<Vec<CourseWithOwner>>;

    /// Apply changes; `None` if the course does not exist
    async fn update_course(&self, id: i64, changes: CourseChanges) -> Result<Option<Course>>;

    /// Hard delete; `false` if the course did not exist
    async fn delete_course(&self, id: i64) -> Result<bool>;
}

/// Both halves of the store behind shared handles
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub courses: Arc<dyn CourseStore>,
}

impl Stores {
    /// Share one backend for both users and courses
    pub fn from_backend<S: UserStore + CourseStore>(store: S) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            courses: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_backend(MemoryStore::new())
    }

    /// Open the backend named in the configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        match config.backend {
            StoreBackend::Memory => {
                tracing::info!("Using in-memory store");
                Ok(Self::in_memory())
            }
            StoreBackend::Postgres => {
                let store = PgStore::connect(&config.url).await?;
                store.migrate().await?;
                Ok(Self::from_backend(store))
            }
        }
    }
}
