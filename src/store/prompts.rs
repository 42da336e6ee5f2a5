use std::path::PathBuf;

use chrono::Utc;

use crate::formats::{PromptTemplate, timestamp_id};
use crate::store::persist;

pub struct PromptDraft<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub system_prompt: &'a str,
    pub user_prompt_template: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct PromptUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub user_prompt_template: Option<String>,
}

/// Values available to `{{placeholder}}` substitution in user prompt templates.
#[derive(Debug, Clone, Default)]
pub struct PromptVars<'a> {
    pub topic: &'a str,
    pub audience: &'a str,
    pub chapter_title: &'a str,
    pub learning_objectives: &'a [String],
}

impl PromptTemplate {
    pub fn render_user_prompt(&self, vars: &PromptVars<'_>) -> String {
        self.user_prompt_template
            .replace("{{topic}}", vars.topic)
            .replace("{{audience}}", vars.audience)
            .replace("{{chapter_title}}", vars.chapter_title)
            .replace("{{learning_objectives}}", &vars.learning_objectives.join(", "))
    }
}

#[derive(Debug)]
pub struct PromptLibrary {
    path: Option<PathBuf>,
    templates: Vec<PromptTemplate>,
}

impl PromptLibrary {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            templates: Vec::new(),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let templates = persist::read_json(&path)?.unwrap_or_default();
        Ok(Self {
            path: Some(path),
            templates,
        })
    }

    pub fn templates(&self) -> &[PromptTemplate] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&PromptTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn save(&mut self, draft: PromptDraft<'_>) -> anyhow::Result<PromptTemplate> {
        let now = Utc::now();
        let template = PromptTemplate {
            id: timestamp_id("template"),
            name: draft.name.to_owned(),
            description: draft.description.to_owned(),
            system_prompt: draft.system_prompt.to_owned(),
            user_prompt_template: draft.user_prompt_template.to_owned(),
            created_at: now,
            updated_at: now,
        };
        self.templates.push(template.clone());
        self.persist()?;
        Ok(template)
    }

    /// Returns false when no template has `id`.
    pub fn update(&mut self, id: &str, update: PromptUpdate) -> anyhow::Result<bool> {
        let Some(template) = self.templates.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if let Some(v) = update.name {
            template.name = v;
        }
        if let Some(v) = update.description {
            template.description = v;
        }
        if let Some(v) = update.system_prompt {
            template.system_prompt = v;
        }
        if let Some(v) = update.user_prompt_template {
            template.user_prompt_template = v;
        }
        template.updated_at = Utc::now();
        self.persist()?;
        Ok(true)
    }

    pub fn delete(&mut self, id: &str) -> anyhow::Result<bool> {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        if self.templates.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn duplicate(&mut self, id: &str) -> anyhow::Result<Option<PromptTemplate>> {
        let Some(source) = self.get(id).cloned() else {
            return Ok(None);
        };
        let now = Utc::now();
        let copy = PromptTemplate {
            id: timestamp_id("template"),
            name: format!("{} (Copy)", source.name),
            created_at: now,
            updated_at: now,
            ..source
        };
        self.templates.push(copy.clone());
        self.persist()?;
        Ok(Some(copy))
    }

    /// Adds the bundled starter templates whose names are not already present.
    pub fn seed_defaults(&mut self) -> anyhow::Result<usize> {
        let mut added = 0;
        for draft in default_drafts() {
            if self.templates.iter().any(|t| t.name == draft.name) {
                continue;
            }
            let now = Utc::now();
            self.templates.push(PromptTemplate {
                id: timestamp_id("template"),
                name: draft.name.to_owned(),
                description: draft.description.to_owned(),
                system_prompt: draft.system_prompt.to_owned(),
                user_prompt_template: draft.user_prompt_template.to_owned(),
                created_at: now,
                updated_at: now,
            });
            added += 1;
        }
        if added > 0 {
            self.persist()?;
        }
        Ok(added)
    }

    fn persist(&self) -> anyhow::Result<()> {
        match &self.path {
            Some(path) => persist::write_json_atomic(path, &self.templates),
            None => Ok(()),
        }
    }
}

fn default_drafts() -> [PromptDraft<'static>; 4] {
    [
        PromptDraft {
            name: "Programming Tutorial",
            description: "Template for creating programming tutorials with code examples",
            system_prompt: "You are an expert programming instructor creating comprehensive tutorial content.\n\n\
Your writing should be:\n\
- Clear and beginner-friendly with step-by-step explanations\n\
- Rich with practical code examples and real-world applications\n\
- Focused on teaching core concepts with hands-on exercises\n\
- Using MyST Markdown with code cells, admonitions, and interactive elements",
            user_prompt_template: "Create a tutorial chapter about: {{topic}}\n\n\
Target Audience: {{audience}}\n\
Chapter Focus: {{chapter_title}}\n\
Learning Objectives: {{learning_objectives}}\n\n\
Include:\n\
- Clear explanations with examples\n\
- Code snippets with syntax highlighting\n\
- Practice exercises\n\
- Common pitfalls and best practices",
        },
        PromptDraft {
            name: "Research Paper",
            description: "Academic writing template with citations and formal structure",
            system_prompt: "You are an academic researcher creating scholarly content.\n\n\
Your writing should be:\n\
- Formal and precise with proper academic tone\n\
- Evidence-based with citations and references\n\
- Structured with clear methodology and findings\n\
- Using MyST Markdown with footnotes, citations, and figures",
            user_prompt_template: "Write an academic chapter about: {{topic}}\n\n\
Research Focus: {{chapter_title}}\n\
Key Arguments: {{learning_objectives}}\n\n\
Include:\n\
- Literature review context\n\
- Methodology and approach\n\
- Analysis and findings\n\
- Conclusions and implications\n\
- Proper citations and references",
        },
        PromptDraft {
            name: "Business Strategy",
            description: "Professional business content with frameworks and case studies",
            system_prompt: "You are a business strategy consultant creating professional content.\n\n\
Your writing should be:\n\
- Professional and actionable with clear frameworks\n\
- Data-driven with examples and case studies\n\
- Focused on practical implementation\n\
- Using MyST Markdown with diagrams, tables, and callouts",
            user_prompt_template: "Develop a business strategy chapter about: {{topic}}\n\n\
Strategic Focus: {{chapter_title}}\n\
Key Outcomes: {{learning_objectives}}\n\n\
Include:\n\
- Strategic frameworks and models\n\
- Real-world case studies\n\
- Implementation roadmaps\n\
- KPIs and success metrics\n\
- Risk assessment and mitigation",
        },
        PromptDraft {
            name: "Creative Storytelling",
            description: "Narrative writing template for fiction and creative works",
            system_prompt: "You are a creative writer crafting engaging narrative content.\n\n\
Your writing should be:\n\
- Engaging and immersive with vivid descriptions\n\
- Character-driven with emotional depth\n\
- Structured with clear narrative arcs\n\
- Using MyST Markdown with creative formatting and styling",
            user_prompt_template: "Write a narrative chapter about: {{topic}}\n\n\
Story Focus: {{chapter_title}}\n\
Themes: {{learning_objectives}}\n\n\
Include:\n\
- Engaging character development\n\
- Vivid scene descriptions\n\
- Compelling dialogue\n\
- Emotional resonance\n\
- Plot progression and pacing",
        },
    ]
}
