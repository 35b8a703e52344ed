//! In-memory store

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{CourseStore, UserStore};
use crate::error::{Error, Result};
use crate::models::user::DUPLICATE_EMAIL_MESSAGE;
use crate::models::{
    Course, CourseChanges, CourseWithOwner, NewCourse, NewUser, User, UserInfo,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    courses: BTreeMap<i64, Course>,
    next_user_id: i64,
    next_course_id: i64,
}

impl Tables {
    fn join(&self, course: &Course) -> Result<CourseWithOwner> {
        let owner = self.users.get(&course.user_id).ok_or_else(|| {
            Error::Other(format!(
                "Course {} references missing user {}",
                course.id, course.user_id
            ))
        })?;
        Ok(CourseWithOwner::new(course.clone(), UserInfo::from(owner)))
    }
}

/// Users and courses held in process memory. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|u| u.email_address == user.email_address)
        {
            return Err(Error::validation(DUPLICATE_EMAIL_MESSAGE));
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let stored = User {
            id: tables.next_user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email_address: user.email_address,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(stored.id, stored.clone());
        tracing::debug!("Created user {}", stored.id);
        Ok(stored)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email_address == email)
            .cloned())
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn create_course(&self, course: NewCourse) -> Result<Course> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&course.user_id) {
            return Err(Error::Other(format!(
                "Cannot create course for unknown user {}",
                course.user_id
            )));
        }

        tables.next_course_id += 1;
        let now = Utc::now();
        let stored = Course {
            id: tables.next_course_id,
            title: course.title,
            description: course.description,
            estimated_time: course.estimated_time,
            materials_needed: course.materials_needed,
            user_id: course.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.courses.insert(stored.id, stored.clone());
        tracing::debug!("Created course {} for user {}", stored.id, stored.user_id);
        Ok(stored)
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>> {
        Ok(self.tables.read().await.courses.get(&id).cloned())
    }

    async fn find_course_with_owner(&self, id: i64) -> Result<Option<CourseWithOwner>> {
        let tables = self.tables.read().await;
        tables.courses.get(&id).map(|c| tables.join(c)).transpose()
    }

    async fn list_courses(&self) -> Result<Vec<CourseWithOwner>> {
        let tables = self.tables.read().await;
        tables.courses.values().map(|c| tables.join(c)).collect()
    }

    async fn update_course(&self, id: i64, changes: CourseChanges) -> Result<Option<Course>> {
        let mut tables = self.tables.write().await;
        Ok(tables.courses.get_mut(&id).map(|course| {
            course.apply(changes);
            course.clone()
        }))
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        let removed = self.tables.write().await.courses.remove(&id).is_some();
        if removed {
            tracing::debug!("Deleted course {}", id);
        }
        Ok(removed)
    }
}
