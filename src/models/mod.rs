//! Domain records for users and courses

pub mod course;
pub mod user;

pub use course::{
    Course, CourseChanges, CourseWithOwner, CreateCourseRequest, NewCourse, UpdateCourseRequest,
};
pub use user::{NewUser, RegisterRequest, User, UserInfo, ValidRegistration};
