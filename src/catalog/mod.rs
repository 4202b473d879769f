//! Course catalog abstraction.
//!
//! Provides a trait-based interface over whatever backs content search and
//! course metadata lookup. The tools only depend on [`CourseStore`].

mod memory;

pub use memory::MemoryCourseStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A lesson within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_number: u32,
    pub lesson_title: String,
    #[serde(default)]
    pub lesson_link: Option<String>,
}

/// Course metadata as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    #[serde(default)]
    pub course_link: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Link of the lesson with the given number, if recorded.
    pub fn lesson_link(&self, lesson_number: u32) -> Option<&str> {
        self.lessons
            .iter()
            .find(|l| l.lesson_number == lesson_number)
            .and_then(|l| l.lesson_link.as_deref())
    }
}

/// A searchable piece of course content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChunk {
    pub course_title: String,
    pub lesson_number: Option<u32>,
    pub content: String,
}

/// Filters narrowing a content search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    /// Exact (already resolved) course title.
    pub course_title: Option<String>,
    pub lesson_number: Option<u32>,
}

/// Trait for course catalog implementations.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Search content chunks, best match first.
    async fn search(&self, query: &str, filter: &SearchFilter, limit: usize) -> Result<Vec<ContentChunk>>;

    /// Map a partial or differently-cased course name onto a stored title.
    async fn resolve_course_name(&self, name: &str) -> Result<Option<String>>;

    /// Get course metadata by exact title.
    async fn course(&self, title: &str) -> Result<Option<Course>>;

    /// Titles of all stored courses.
    async fn course_titles(&self) -> Result<Vec<String>>;
}
