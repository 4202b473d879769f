//! Query and tool-result classification.
//!
//! Shared by synthesis template selection and fallback filtering so both
//! agree on what a "lesson question" or a "comparison question" is.

/// Phrases marking a question that compares topics across courses.
const COMPARISON_PHRASES: [&str; 5] = [
    "same topic",
    "similar",
    "other courses",
    "cover the same",
    "also cover",
];

/// Category of a user question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Anything not covered below.
    General,
    /// Mentions "lesson" together with a digit.
    LessonSpecific,
    /// Uses comparison phrasing.
    Comparison,
    /// Comparison phrasing about a specific lesson.
    LessonComparison,
}

impl QueryKind {
    pub fn is_comparison(self) -> bool {
        matches!(self, QueryKind::Comparison | QueryKind::LessonComparison)
    }

    pub fn is_lesson_specific(self) -> bool {
        matches!(self, QueryKind::LessonSpecific | QueryKind::LessonComparison)
    }
}

/// Classify a user question.
pub fn classify_query(query: &str) -> QueryKind {
    let lower = query.to_lowercase();
    let comparison = COMPARISON_PHRASES.iter().any(|p| lower.contains(p));
    let lesson = lower.contains("lesson") && query.chars().any(|c| c.is_ascii_digit());

    match (comparison, lesson) {
        (true, true) => QueryKind::LessonComparison,
        (true, false) => QueryKind::Comparison,
        (false, true) => QueryKind::LessonSpecific,
        (false, false) => QueryKind::General,
    }
}

/// Shape of a tool result, as far as fallback formatting cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultKind {
    /// A whole course outline (lessons 0, 1 and 2 all listed).
    OutlineDump,
    /// Search hits under a `[Course - Lesson N]` header.
    LessonContent,
    /// Brief course info; holds the `Course Title:` / `Course Instructor:` lines.
    CourseInfo(String),
    /// Anything else.
    Other,
}

/// Classify one (trimmed) tool result.
pub fn classify_result(result: &str) -> ResultKind {
    if result.contains("Lesson 0:") && result.contains("Lesson 1:") && result.contains("Lesson 2:") {
        return ResultKind::OutlineDump;
    }

    if result.starts_with('[') && result.contains("Lesson") {
        return ResultKind::LessonContent;
    }

    if result.contains("Course Title:") && result.matches("Lesson").count() <= 2 {
        let brief: Vec<&str> = result
            .lines()
            .take(3)
            .filter(|l| l.starts_with("Course Title:") || l.starts_with("Course Instructor:"))
            .collect();
        if !brief.is_empty() {
            return ResultKind::CourseInfo(brief.join("\n"));
        }
    }

    ResultKind::Other
}
