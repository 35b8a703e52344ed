//! Course records and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserInfo;
use crate::error::Result;
use crate::validation::{double_option, FieldRules, Rule, Validator};

pub const COURSE_SCHEMA: &[FieldRules] = &[
    FieldRules {
        field: "title",
        rules: &[
            Rule::NotNull("Must provide a title"),
            Rule::NotEmpty("Please provide a title"),
        ],
    },
    FieldRules {
        field: "description",
        rules: &[
            Rule::NotNull("Must provide a description"),
            Rule::NotEmpty("Please provide a course description"),
        ],
    },
];

/// A stored course
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    /// Owning user
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    /// Apply validated changes in place, bumping `updated_at`
    pub fn apply(&mut self, changes: CourseChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(estimated_time) = changes.estimated_time {
            self.estimated_time = estimated_time;
        }
        if let Some(materials_needed) = changes.materials_needed {
            self.materials_needed = materials_needed;
        }
        self.updated_at = Utc::now();
    }
}

/// A course joined with its owner's public fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWithOwner {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    pub user_id: i64,
    pub course_user: UserInfo,
}

impl CourseWithOwner {
    pub fn new(course: Course, owner: UserInfo) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            estimated_time: course.estimated_time,
            materials_needed: course.materials_needed,
            user_id: course.user_id,
            course_user: owner,
        }
    }
}

/// Body of `POST /courses`. A `userId` in the body is ignored; the
/// authenticated user always becomes the owner.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
}

/// A validated course ready for insertion
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    pub user_id: i64,
}

impl CreateCourseRequest {
    pub fn validate(self, owner_id: i64) -> Result<NewCourse> {
        Validator::new()
            .field(COURSE_SCHEMA, "title", self.title.as_deref())
            .field(COURSE_SCHEMA, "description", self.description.as_deref())
            .finish()?;

        Ok(NewCourse {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            estimated_time: self.estimated_time,
            materials_needed: self.materials_needed,
            user_id: owner_id,
        })
    }
}

/// Body of `PUT /courses/{id}`. Outer `None` means the field was not sent;
/// `Some(None)` means it was sent as `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub materials_needed: Option<Option<String>>,
}

/// Validated partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_time: Option<Option<String>>,
    pub materials_needed: Option<Option<String>>,
}

impl UpdateCourseRequest {
    /// Validate only the fields that were supplied
    pub fn validate(self) -> Result<CourseChanges> {
        Validator::new()
            .supplied(COURSE_SCHEMA, "title", self.title.as_ref().map(|v| v.as_deref()))
            .supplied(
                COURSE_SCHEMA,
                "description",
                self.description.as_ref().map(|v| v.as_deref()),
            )
            .finish()?;

        Ok(CourseChanges {
            title: self.title.flatten(),
            description: self.description.flatten(),
            estimated_time: self.estimated_time,
            materials_needed: self.materials_needed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn stored() -> Course {
        let now = Utc::now();
        Course {
            id: 1,
            title: "Build a Basic Bookcase".to_string(),
            description: "High-end furniture projects are great to dream about.".to_string(),
            estimated_time: Some("12 hours".to_string()),
            materials_needed: Some("* 1/2 x 3/4 inch parting strip".to_string()),
            user_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_requires_title_and_description() {
        match CreateCourseRequest::default().validate(1) {
            Err(Error::Validation(errors)) => assert_eq!(
                errors,
                vec!["Must provide a title", "Must provide a description"]
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_uses_owner_argument() {
        let request: CreateCourseRequest = serde_json::from_value(serde_json::json!({
            "title": "Learn How to Program",
            "description": "In this course, you'll learn how to write code.",
            "userId": 99
        }))
        .unwrap();
        let course = request.validate(3).unwrap();
        assert_eq!(course.user_id, 3);
        assert_eq!(course.estimated_time, None);
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let request: UpdateCourseRequest =
            serde_json::from_value(serde_json::json!({ "estimatedTime": null })).unwrap();
        assert_eq!(request.title, None);
        assert_eq!(request.estimated_time, Some(None));

        let changes = request.validate().unwrap();
        let mut course = stored();
        course.apply(changes);
        assert_eq!(course.estimated_time, None);
        assert_eq!(course.title, "Build a Basic Bookcase");
    }

    #[test]
    fn test_update_rejects_null_title() {
        let request: UpdateCourseRequest =
            serde_json::from_value(serde_json::json!({ "title": null, "description": " " }))
                .unwrap();
        match request.validate() {
            Err(Error::Validation(errors)) => assert_eq!(
                errors,
                vec!["Must provide a title", "Please provide a course description"]
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_ownership() {
        let course = stored();
        assert!(course.is_owned_by(1));
        assert!(!course.is_owned_by(2));
    }
}
