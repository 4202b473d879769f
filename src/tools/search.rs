//! Course content search tool.

use super::{optional_str, optional_u32, required_str, Source, Tool, ToolArgs, ToolOutput};
use crate::catalog::{ContentChunk, Course, CourseStore, SearchFilter};
use crate::error::Result;
use crate::llm::ToolDescriptor;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Searches course materials with course-name resolution and lesson filtering.
pub struct CourseSearchTool {
    store: Arc<dyn CourseStore>,
    max_results: usize,
}

impl CourseSearchTool {
    pub const NAME: &'static str = "search_course_content";

    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self {
            store,
            max_results: 5,
        }
    }

    /// Set the maximum number of hits returned per search.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max.max(1);
        self
    }

    /// Format hits under `[course - Lesson n]` headers and collect deduplicated sources.
    async fn format_results(&self, chunks: &[ContentChunk]) -> Result<ToolOutput> {
        let mut courses: HashMap<&str, Option<Course>> = HashMap::new();
        for chunk in chunks {
            if !courses.contains_key(chunk.course_title.as_str()) {
                let course = self.store.course(&chunk.course_title).await?;
                courses.insert(chunk.course_title.as_str(), course);
            }
        }

        let mut sources: Vec<Source> = Vec::new();
        let mut seen: Vec<(&str, Option<u32>)> = Vec::new();
        let mut formatted = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let label = match chunk.lesson_number {
                Some(n) => format!("{} - Lesson {}", chunk.course_title, n),
                None => chunk.course_title.clone(),
            };

            let key = (chunk.course_title.as_str(), chunk.lesson_number);
            if !seen.contains(&key) {
                seen.push(key);
                let url = chunk.lesson_number.and_then(|n| {
                    courses
                        .get(chunk.course_title.as_str())
                        .and_then(Option::as_ref)
                        .and_then(|c| c.lesson_link(n))
                        .map(str::to_string)
                });
                sources.push(Source {
                    label: label.clone(),
                    url,
                });
            }

            formatted.push(format!("[{}]\n{}", label, chunk.content));
        }

        Ok(ToolOutput {
            content: formatted.join("\n\n"),
            sources,
        })
    }
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            Self::NAME,
            "Search course materials with smart course name matching and lesson filtering",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        )
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolOutput> {
        let query = required_str(args, "query")?;
        let course_name = optional_str(args, "course_name");
        let lesson_number = optional_u32(args, "lesson_number")?;

        let course_title = match course_name {
            Some(name) => match self.store.resolve_course_name(name).await? {
                Some(title) => Some(title),
                None => return Ok(ToolOutput::text(format!("No course found matching '{}'.", name))),
            },
            None => None,
        };

        let filter = SearchFilter {
            course_title,
            lesson_number,
        };
        debug!("Searching for {:?} with filter {:?}", query, filter);

        let chunks = self.store.search(query, &filter, self.max_results).await?;

        if chunks.is_empty() {
            let mut filter_info = String::new();
            if let Some(name) = course_name {
                filter_info.push_str(&format!(" in course '{}'", name));
            }
            if let Some(n) = lesson_number {
                filter_info.push_str(&format!(" in lesson {}", n));
            }
            return Ok(ToolOutput::text(format!("No relevant content found{}.", filter_info)));
        }

        self.format_results(&chunks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCourseStore;

    const CATALOG: &str = r#"{
        "courses": [{
            "title": "MCP: Build Rich-Context AI Apps",
            "lessons": [
                {"lesson_number": 1, "lesson_title": "Architecture", "lesson_link": "https://example.com/mcp/1",
                 "content": "MCP uses a client server architecture.\n\nThe client keeps one session per server."},
                {"lesson_number": 2, "lesson_title": "Servers",
                 "content": "A server exposes tools to the client."}
            ]
        }]
    }"#;

    fn tool() -> CourseSearchTool {
        CourseSearchTool::new(Arc::new(MemoryCourseStore::from_json(CATALOG).unwrap()))
    }

    fn args(value: serde_json::Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_formats_hits_with_headers_and_dedupes_sources() {
        let output = tool()
            .execute(&args(json!({"query": "client server"})))
            .await
            .unwrap();

        assert!(output.content.starts_with("[MCP: Build Rich-Context AI Apps - Lesson 1]\n"));
        assert_eq!(output.content.matches("[MCP: Build Rich-Context AI Apps - Lesson").count(), 3);
        assert_eq!(output.sources.len(), 2);
        assert_eq!(output.sources[0].label, "MCP: Build Rich-Context AI Apps - Lesson 1");
        assert_eq!(output.sources[0].url.as_deref(), Some("https://example.com/mcp/1"));
        assert_eq!(output.sources[1].url, None);
    }

    #[tokio::test]
    async fn test_lesson_filter() {
        let output = tool()
            .execute(&args(json!({"query": "server", "course_name": "mcp", "lesson_number": 2})))
            .await
            .unwrap();

        assert_eq!(
            output.content,
            "[MCP: Build Rich-Context AI Apps - Lesson 2]\nA server exposes tools to the client."
        );
    }

    #[tokio::test]
    async fn test_empty_result_message() {
        let output = tool()
            .execute(&args(json!({"query": "kubernetes", "course_name": "MCP", "lesson_number": 1})))
            .await
            .unwrap();

        assert_eq!(output.content, "No relevant content found in course 'MCP' in lesson 1.");
        assert!(output.sources.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_course() {
        let output = tool()
            .execute(&args(json!({"query": "x", "course_name": "Quantum Knitting"})))
            .await
            .unwrap();

        assert_eq!(output.content, "No course found matching 'Quantum Knitting'.");
    }

    #[tokio::test]
    async fn test_missing_query_is_error() {
        assert!(tool().execute(&args(json!({"course_name": "MCP"}))).await.is_err());
    }
}
