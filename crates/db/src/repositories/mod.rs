//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod course_repo;
pub mod lesson_repo;
pub mod reorder_repo;
pub mod section_repo;

pub use course_repo::CourseRepo;
pub use lesson_repo::LessonRepo;
pub use reorder_repo::ReorderRepo;
pub use section_repo::SectionRepo;
