//! PostgreSQL store tests
//!
//! Requires a reachable database; the tables are created if missing.
//! Run with: DATABASE_URL="host=localhost user=postgres password=postgres dbname=courses_test" \
//!     cargo test --test postgres_tests -- --ignored --test-threads=1

use courses_api::error::Error;
use courses_api::models::{CourseChanges, NewCourse, NewUser};
use courses_api::store::{CourseStore, PgStore, UserStore};

async fn connect() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let store = PgStore::connect(&url).await.expect("Failed to connect");
    store.migrate().await.expect("Failed to migrate");
    store
}

fn unique_email(tag: &str) -> String {
    format!("{}-{}@example.com", tag, chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0))
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        first_name: "Joe".to_string(),
        last_name: "Smith".to_string(),
        email_address: email.to_string(),
        password_hash: "$2b$04$notarealhash".to_string(),
    }
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_pg_duplicate_email() {
    let store = connect().await;
    let email = unique_email("dup");
    store.create_user(new_user(&email)).await.unwrap();

    match store.create_user(new_user(&email)).await {
        Err(Error::Validation(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("expected validation error, got {:?}", other.map(|u| u.id)),
    }
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_pg_course_lifecycle() {
    let store = connect().await;
    let user = store.create_user(new_user(&unique_email("owner"))).await.unwrap();

    let course = store
        .create_course(NewCourse {
            title: "Build a Basic Bookcase".to_string(),
            description: "Woodworking for beginners".to_string(),
            estimated_time: Some("12 hours".to_string()),
            materials_needed: None,
            user_id: user.id,
        })
        .await
        .unwrap();

    let joined = store.find_course_with_owner(course.id).await.unwrap().unwrap();
    assert_eq!(joined.course_user.id, user.id);
    assert_eq!(joined.course_user.email_address, user.email_address);

    let updated = store
        .update_course(
            course.id,
            CourseChanges {
                title: Some("Build an Advanced Bookcase".to_string()),
                estimated_time: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Build an Advanced Bookcase");
    assert_eq!(updated.description, "Woodworking for beginners");
    assert_eq!(updated.estimated_time, None);

    assert!(store.delete_course(course.id).await.unwrap());
    assert!(store.find_course(course.id).await.unwrap().is_none());
    assert!(!store.delete_course(course.id).await.unwrap());
}
