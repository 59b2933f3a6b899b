//! Prompt templates for Docent.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use crate::session::ReportFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub assistant: AssistantPrompts,
    pub research: ResearchPrompts,
    pub email: EmailPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the conversational assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantPrompts {
    pub system: String,
    /// Instruction for the opening turn of a session.
    pub greeting: String,
    /// Instructions sent with plain web and index searches.
    pub search: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a fast, efficient voice assistant for an AI instructor.
Keep answers short, classroom-ready and easy to say out loud.

Tools:
- 'file_search' for foundational material from the internal notes
- 'web_search' for recent developments and news
- 'deep_research_report' to build a brief (formats: daily_update, lesson_brief, research_report)
- 'save_last_report' to save the latest brief as docx or pdf
- 'upload_last_report_to_drive' to upload the saved file and share a link
- 'compose_email' to draft an email for review
- 'send_email' ONLY after the user clearly confirms the draft they just heard

Never send an email the user has not confirmed. Be direct and friendly; no filler."#
                .to_string(),
            greeting: "Greet the user in one sentence. Mention you can produce daily updates, \
                lesson briefs and deep research reports from the internal notes and the web, \
                then save, upload or email them."
                .to_string(),
            search: "Answer with direct facts in a few short sentences that read well aloud. \
                Include dates for anything recent."
                .to_string(),
        }
    }
}

/// Prompts for research report synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchPrompts {
    /// Frame around the format-specific instructions.
    pub frame: String,
    pub daily_update: String,
    pub lesson_brief: String,
    pub research_report: String,
}

impl Default for ResearchPrompts {
    fn default() -> Self {
        Self {
            frame: r#"You are helping an AI instructor plan and teach a six-month generative AI cohort.
Use FILE SEARCH for foundational definitions and frameworks from the internal notes.
Use WEB SEARCH for developments from the {{recency_hint}}.
Include source URLs and dates wherever possible. Keep it concise and classroom-ready.

FORMAT:
{{format_instructions}}

TOPIC:
{{topic}}
"#
            .to_string(),

            daily_update: r#"Write a DAILY UPDATE:
1) TL;DR: 3 short dated bullets
2) What changed in the {{recency_hint}}: 3-5 dated items
3) Teaching angle: 1-2 bullets on raising it in class
4) Must-know links: up to {{max_sources}} URLs"#
                .to_string(),

            lesson_brief: r#"Write a LESSON BRIEF for the next cohort session:
1) TL;DR: what to teach and why (3 bullets)
2) Core concepts and definitions, drawn from the internal notes first
3) New on the web ({{recency_hint}}): 3-5 dated points
4) Demo ideas: one no-code, one code
5) Exercises: 2-3 mini projects of 60-90 minutes
6) Reading list: up to {{max_sources}} links mixing internal and web sources"#
                .to_string(),

            research_report: r#"Write a RESEARCH REPORT:
1) TL;DR: 5 bullets
2) Landscape: key approaches and players
3) State of the art ({{recency_hint}}), dated
4) Risks and pitfalls
5) Teaching recommendations: a lecture flow for the cohort
6) Sources: up to {{max_sources}} URLs with dates"#
                .to_string(),
        }
    }
}

impl ResearchPrompts {
    /// Section instructions for a report format.
    pub fn instructions_for(&self, format: ReportFormat) -> &str {
        match format {
            ReportFormat::DailyUpdate => &self.daily_update,
            ReportFormat::LessonBrief => &self.lesson_brief,
            ReportFormat::ResearchReport => &self.research_report,
        }
    }
}

/// Prompts for drafting email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailPrompts {
    pub system: String,
    pub user: String,
}

impl Default for EmailPrompts {
    fn default() -> Self {
        Self {
            system: r#"You draft short, friendly, professional emails on behalf of an AI instructor.
Reply with the subject on the first line as 'Subject: ...', a blank line, then the body.
Do not add placeholders like [Your Name]; sign off simply."#
                .to_string(),

            user: r#"Recipient: {{to}}
Topic: {{topic}}

Additional context:
{{extra_context}}

Draft the email."#
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

            let research_path = custom_path.join("research.toml");
            if research_path.exists() {
                let content = std::fs::read_to_string(&research_path)?;
                prompts.research = toml::from_str(&content)?;
            }

            let email_path = custom_path.join("email.toml");
            if email_path.exists() {
                let content = std::fs::read_to_string(&email_path)?;
                prompts.email = toml::from_str(&content)?;
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

    /// Build the combined research instruction for one report.
    pub fn research_instruction(
        &self,
        topic: &str,
        format: ReportFormat,
        max_sources: u32,
        recency_hint: &str,
    ) -> String {
        let mut vars = HashMap::new();
        vars.insert("recency_hint".to_string(), recency_hint.to_string());
        vars.insert("max_sources".to_string(), max_sources.to_string());
        vars.insert("topic".to_string(), topic.to_string());

        let format_instructions =
            self.render_with_custom(self.research.instructions_for(format), &vars);
        vars.insert("format_instructions".to_string(), format_instructions);

        self.render_with_custom(&self.research.frame, &vars)
    }

    /// Build the user prompt for an email draft.
    pub fn email_request(&self, to: &str, topic: &str, extra_context: Option<&str>) -> String {
        let mut vars = HashMap::new();
        vars.insert("to".to_string(), to.to_string());
        vars.insert("topic".to_string(), topic.to_string());
        vars.insert(
            "extra_context".to_string(),
            extra_context.unwrap_or("(none)").to_string(),
        );
        self.render_with_custom(&self.email.user, &vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.assistant.system.is_empty());
        assert!(!prompts.email.system.is_empty());
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
    fn test_research_instruction_fills_format() {
        let prompts = Prompts::default();
        let text = prompts.research_instruction(
            "diffusion models",
            ReportFormat::ResearchReport,
            4,
            "last 7 days",
        );
        assert!(text.contains("RESEARCH REPORT"));
        assert!(text.contains("up to 4 URLs"));
        assert!(text.contains("last 7 days"));
        assert!(text.contains("diffusion models"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn test_custom_variables_lose_to_call_variables() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("topic".to_string(), "ignored".to_string());
        prompts.variables.insert("cohort".to_string(), "Spring".to_string());
        prompts.email.user = "{{topic}} for {{cohort}}".to_string();

        assert_eq!(prompts.email_request("a@x.com", "demo", None), "demo for Spring");
    }
}
