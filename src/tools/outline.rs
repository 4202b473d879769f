//! Course outline tool.

use super::{required_str, Tool, ToolArgs, ToolOutput};
use crate::catalog::CourseStore;
use crate::error::Result;
use crate::llm::ToolDescriptor;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Returns a course's title, link, instructor and lesson list.
pub struct CourseOutlineTool {
    store: Arc<dyn CourseStore>,
}

impl CourseOutlineTool {
    pub const NAME: &'static str = "get_course_outline";

    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            Self::NAME,
            "Get course outline including title, course link, and complete lesson list",
            json!({
                "type": "object",
                "properties": {
                    "course_title": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    }
                },
                "required": ["course_title"]
            }),
        )
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolOutput> {
        let requested = required_str(args, "course_title")?;

        let Some(title) = self.store.resolve_course_name(requested).await? else {
            return Ok(ToolOutput::text(format!(
                "No course found matching '{}'. Please check the course name and try again.",
                requested
            )));
        };

        let Some(course) = self.store.course(&title).await? else {
            return Ok(ToolOutput::text(format!("No course details found for '{}'", title)));
        };

        let mut lines = vec![format!("Course Title: {}", course.title)];
        if let Some(link) = &course.course_link {
            lines.push(format!("Course Link: {}", link));
        }
        if let Some(instructor) = &course.instructor {
            lines.push(format!("Course Instructor: {}", instructor));
        }

        if course.lessons.is_empty() {
            lines.push("\nNo lessons found for this course.".to_string());
        } else {
            lines.push("\nLessons:".to_string());
            for lesson in &course.lessons {
                let mut line = format!("  Lesson {}: {}", lesson.lesson_number, lesson.lesson_title);
                if let Some(link) = &lesson.lesson_link {
                    line.push_str(&format!(" (Link: {})", link));
                }
                lines.push(line);
            }
        }

        Ok(ToolOutput::text(lines.join("\n")))
    }
}
