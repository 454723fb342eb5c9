//! Prompt templates
//!
//! Templates use `{name}` placeholders; `{{` and `}}` render as literal braces.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// A single-string template with named placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub template: String,
    pub input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Parse a template, collecting its placeholders in order of first use
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let mut input_variables: Vec<String> = Vec::new();

        for caps in PLACEHOLDER.captures_iter(&template) {
            if let Some(name) = caps.get(1) {
                if !input_variables.iter().any(|v| v == name.as_str()) {
                    input_variables.push(name.as_str().to_string());
                }
            }
        }

        Self {
            template,
            input_variables,
        }
    }

    /// Fill every placeholder. Missing variables are an error; extra ones are ignored.
    pub fn format(&self, values: &HashMap<String, String>) -> Result<String> {
        if let Some(missing) = self
            .input_variables
            .iter()
            .find(|name| !values.contains_key(name.as_str()))
        {
            return Err(Error::Prompt(format!(
                "Missing value for template variable '{}'",
                missing
            )));
        }

        let rendered = PLACEHOLDER.replace_all(&self.template, |caps: &Captures| {
            match caps.get(1) {
                Some(name) => values[name.as_str()].clone(),
                None if &caps[0] == "{{" => "{".to_string(),
                None => "}".to_string(),
            }
        });

        Ok(rendered.into_owned())
    }
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Ai,
}

impl Role {
    fn prefix(self) -> &'static str {
        match self {
            Role::System => "System",
            Role::Human => "Human",
            Role::Ai => "AI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// The rendered, structured message handed to a generative model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptValue {
    pub messages: Vec<ChatMessage>,
}

impl PromptValue {
    /// Flatten to a single completion prompt, one `Role: content` line per message
    pub fn to_prompt_string(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role.prefix(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for PromptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_prompt_string())
    }
}

/// An ordered list of role-tagged templates identified by a versioned id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPromptTemplate {
    pub id: String,
    pub messages: Vec<(Role, PromptTemplate)>,
}

impl ChatPromptTemplate {
    pub fn new(id: impl Into<String>, messages: Vec<(Role, PromptTemplate)>) -> Self {
        Self {
            id: id.into(),
            messages,
        }
    }

    /// Union of every message's variables, in order of first use
    pub fn input_variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (_, template) in &self.messages {
            for name in &template.input_variables {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    pub fn render(&self, values: &HashMap<String, String>) -> Result<PromptValue> {
        let messages = self
            .messages
            .iter()
            .map(|(role, template)| {
                Ok(ChatMessage {
                    role: *role,
                    content: template.format(values)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PromptValue { messages })
    }
}
