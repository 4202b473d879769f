//! In-memory course catalog.
//!
//! Loaded from a JSON file; useful for local use and tests. Ranking is plain
//! term overlap, not semantic search.

use super::{ContentChunk, Course, CourseStore, Lesson, SearchFilter};
use crate::error::{CoursemateError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    courses: Vec<CatalogCourse>,
}

#[derive(Debug, Deserialize)]
struct CatalogCourse {
    title: String,
    #[serde(default)]
    course_link: Option<String>,
    #[serde(default)]
    instructor: Option<String>,
    #[serde(default)]
    lessons: Vec<CatalogLesson>,
}

#[derive(Debug, Deserialize)]
struct CatalogLesson {
    lesson_number: u32,
    lesson_title: String,
    #[serde(default)]
    lesson_link: Option<String>,
    #[serde(default)]
    content: String,
}

/// In-memory course store.
#[derive(Debug, Default)]
pub struct MemoryCourseStore {
    courses: Vec<Course>,
    chunks: Vec<ContentChunk>,
}

impl MemoryCourseStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a catalog JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoursemateError::Catalog(format!("Cannot read catalog {}: {}", path.display(), e))
        })?;
        let store = Self::from_json(&content)?;
        info!(
            "Loaded {} courses ({} chunks) from {}",
            store.courses.len(),
            store.chunks.len(),
            path.display()
        );
        Ok(store)
    }

    /// Build a store from catalog JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut store = Self::new();

        for course in file.courses {
            let mut lessons = Vec::with_capacity(course.lessons.len());
            let mut contents = Vec::with_capacity(course.lessons.len());
            for lesson in course.lessons {
                contents.push((lesson.lesson_number, lesson.content));
                lessons.push(Lesson {
                    lesson_number: lesson.lesson_number,
                    lesson_title: lesson.lesson_title,
                    lesson_link: lesson.lesson_link,
                });
            }

            store.add_course(
                Course {
                    title: course.title,
                    course_link: course.course_link,
                    instructor: course.instructor,
                    lessons,
                },
                contents,
            );
        }

        Ok(store)
    }

    /// Add a course and its lesson texts. Each lesson is split into paragraph chunks.
    pub fn add_course(&mut self, course: Course, lesson_contents: Vec<(u32, String)>) {
        for (lesson_number, text) in lesson_contents {
            for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
                self.chunks.push(ContentChunk {
                    course_title: course.title.clone(),
                    lesson_number: Some(lesson_number),
                    content: paragraph.to_string(),
                });
            }
        }
        self.courses.retain(|c| c.title != course.title);
        self.courses.push(course);
    }
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn search(&self, query: &str, filter: &SearchFilter, limit: usize) -> Result<Vec<ContentChunk>> {
        let terms = tokenize(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, &ContentChunk)> = self
            .chunks
            .iter()
            .filter(|c| {
                filter
                    .course_title
                    .as_ref()
                    .map_or(true, |title| &c.course_title == title)
            })
            .filter(|c| filter.lesson_number.is_none() || c.lesson_number == filter.lesson_number)
            .map(|c| (overlap(&terms, &c.content), c))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable sort keeps catalog order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored.into_iter().take(limit).map(|(_, c)| c.clone()).collect())
    }

    async fn resolve_course_name(&self, name: &str) -> Result<Option<String>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }

        if let Some(course) = self.courses.iter().find(|c| c.title.to_lowercase() == needle) {
            return Ok(Some(course.title.clone()));
        }

        if let Some(course) = self
            .courses
            .iter()
            .find(|c| c.title.to_lowercase().contains(&needle))
        {
            return Ok(Some(course.title.clone()));
        }

        let terms = tokenize(name);
        let best = self
            .courses
            .iter()
            .map(|c| (overlap(&terms, &c.title), c))
            .filter(|(score, _)| *score > 0)
            .max_by_key(|(score, _)| *score);

        Ok(best.map(|(_, c)| c.title.clone()))
    }

    async fn course(&self, title: &str) -> Result<Option<Course>> {
        Ok(self.courses.iter().find(|c| c.title == title).cloned())
    }

    async fn course_titles(&self) -> Result<Vec<String>> {
        Ok(self.courses.iter().map(|c| c.title.clone()).collect())
    }
}

/// Lowercased alphanumeric terms of at least two characters.
fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// Number of `terms` present in `text`.
fn overlap(terms: &HashSet<String>, text: &str) -> usize {
    let words = tokenize(text);
    terms.iter().filter(|t| words.contains(*t)).count()
}
