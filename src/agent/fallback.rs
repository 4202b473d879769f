//! Deterministic answers assembled from raw tool output.
//!
//! Used whenever model synthesis is skipped, disabled, or unusable. Never
//! calls the model.

use super::classify::{classify_query, classify_result, ResultKind};

/// Answer when there is nothing to work with.
pub const NO_INFORMATION: &str =
    "I couldn't find specific information about your question in the course materials.";

/// Answer when a lesson question's results contain no lesson material.
pub const NO_LESSON_INFORMATION: &str =
    "I couldn't find specific information about the requested lesson.";

/// Build an answer for `query` directly from successful tool results.
pub fn format_tool_results(results: &[String], query: &str) -> String {
    let non_blank: Vec<&str> = results
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect();

    if non_blank.is_empty() {
        return NO_INFORMATION.to_string();
    }

    if classify_query(query).is_lesson_specific() {
        format_lesson_answer(&non_blank)
    } else {
        format!(
            "Based on the course materials, here's what I found about {}:\n\n{}",
            query,
            non_blank.join("\n\n")
        )
    }
}

/// Present one search result as an answer, with `[Course - Lesson n]` headers removed.
///
/// Short results get the introductory sentence for `query`.
pub fn format_single_result(result: &str, query: &str) -> String {
    let body = result
        .split("\n\n")
        .flat_map(|block| {
            let mut lines: Vec<&str> = block.split('\n').collect();
            if lines
                .first()
                .is_some_and(|first| first.starts_with('[') && first.ends_with(']'))
            {
                lines.remove(0);
            }
            lines
        })
        .collect::<Vec<_>>()
        .join("\n");
    let body = body.trim();

    if body.chars().count() > 100 {
        body.to_string()
    } else {
        format!(
            "Based on the course materials, here's what I found about {}:\n\n{}",
            query, body
        )
    }
}

/// Course info first, then lesson content; outline dumps and anything else dropped.
fn format_lesson_answer(results: &[&str]) -> String {
    let mut course_info: Option<String> = None;
    let mut lesson_content: Vec<&str> = Vec::new();

    for &result in results {
        match classify_result(result) {
            ResultKind::LessonContent => lesson_content.push(result),
            ResultKind::CourseInfo(brief) => course_info = Some(brief),
            ResultKind::OutlineDump | ResultKind::Other => {}
        }
    }

    let parts: Vec<&str> = course_info
        .as_deref()
        .into_iter()
        .chain(lesson_content)
        .collect();

    if parts.is_empty() {
        return NO_LESSON_INFORMATION.to_string();
    }

    parts.join("\n\n")
}
