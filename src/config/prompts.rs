//! Prompt templates for Coursemate.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub assistant: AssistantPrompts,
    pub synthesis: SynthesisPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts that open every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantPrompts {
    /// Base system prompt. `{{max_rounds}}` is available.
    pub system: String,
    /// Appended after the rendered tool list.
    pub tool_guidelines: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an assistant for course materials and educational content.

== ANSWERING ==
- Answer directly and concisely, with examples from the material when they help
- Do not describe your internal process unless asked
- Never name internal tools to the user; offer follow-ups in plain language
  ("I can show you the full course structure")

== WHICH TOOL ==
- Outline or structure questions ("What lessons are in...", "Show me the outline of...") -> course outline tool: course title, course link and every lesson with number and title
- Content questions ("What is...", "How do I...", "Explain...") -> course search tool

== ROUNDS ==
You may call tools in up to {{max_rounds}} rounds. After each round you see the results and decide whether more information is needed.
- Refine a search that was too broad, or search another course or lesson when results were thin
- Lesson questions ("What was covered in lesson 5?"): first search with course_name and lesson_number, then fetch the outline of the exact course title you found
- Same-topic questions ("Which other courses cover the topic of lesson X?"): first fetch the outline to get the exact lesson title, then search all courses with that exact title as the query, unchanged
- If nothing matches after a broader search, say that no matching course exists
- Never repeat an identical query"#
                .to_string(),

            tool_guidelines: r#"TOOL USAGE GUIDELINES:
- Use tools when a question relates to their capabilities
- Prefer searching the course materials for educational or technical questions
- If tools return nothing, answer from general knowledge and say so
- Avoid unnecessary calls"#
                .to_string(),
        }
    }
}

/// Instructions appended before the final synthesis call. `{{question}}` is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisPrompts {
    pub standard: String,
    pub comparison: String,
}

impl Default for SynthesisPrompts {
    fn default() -> Self {
        Self {
            standard: r#"Using the tool results above, answer this question: "{{question}}"

- Keep only information that answers the question
- For a question about one lesson, leave out full course outlines unless they matter
- Use bullet points or short sections where they help
- Drop duplicated material
- For lesson content questions, focus on the key topics and concepts covered"#
                .to_string(),

            comparison: r#"Using the tool results above, answer this comparison question: "{{question}}"

- Start by naming the topic or lesson being compared
- Then list the other lessons or courses covering the same topic, opening with "Yes" or "No"
- For each one, say briefly how it relates to the original topic
- Leave out anything unrelated to that topic
- Keep it short and comparative"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let assistant_path = custom_path.join("assistant.toml");
            if assistant_path.exists() {
                let content = std::fs::read_to_string(&assistant_path)?;
                prompts.assistant = toml::from_str(&content)?;
            }

            let synthesis_path = custom_path.join("synthesis.toml");
            if synthesis_path.exists() {
                let content = std::fs::read_to_string(&synthesis_path)?;
                prompts.synthesis = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.assistant.system.contains("{{max_rounds}}"));
        assert!(prompts.synthesis.standard.contains("{{question}}"));
        assert!(prompts.synthesis.comparison.contains("{{question}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("school".to_string(), "Academy".to_string());
        prompts.variables.insert("question".to_string(), "ignored".to_string());

        let vars = HashMap::from([("question".to_string(), "What is MCP?".to_string())]);
        assert_eq!(
            prompts.render_with_custom("{{school}}: {{question}}", &vars),
            "Academy: What is MCP?"
        );
    }

    #[test]
    fn test_load_custom_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("synthesis.toml"),
            "standard = \"Answer: {{question}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.synthesis.standard, "Answer: {{question}}");
        // Unset fields keep their defaults
        assert_eq!(prompts.synthesis.comparison, SynthesisPrompts::default().comparison);
        assert_eq!(prompts.assistant.system, AssistantPrompts::default().system);
    }
}
