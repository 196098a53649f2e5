//! Model/mode allow-lists and the generation settings they imply.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::instructions::{HEALTH_ADVISOR, REASONING_DIRECTIVE, SYMPTOM_TRIAGE};
use crate::llm::{GenerationConfig, ReasoningConfig};

/// Reasoning budget granted to the reasoning-capable model.
pub const REASONING_BUDGET: u32 = 24576;

// ============================================================================
// ModelType
// ============================================================================

/// Conversational models a session may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    #[default]
    #[serde(rename = "gemini-flash-lite-latest")]
    FlashLite,
    #[serde(rename = "gemini-flash-latest")]
    Flash,
    #[serde(rename = "gemini-2.5-flash")]
    Flash25,
}

impl ModelType {
    pub const ALL: [ModelType; 3] = [ModelType::FlashLite, ModelType::Flash, ModelType::Flash25];

    /// Provider model identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::FlashLite => "gemini-flash-lite-latest",
            ModelType::Flash => "gemini-flash-latest",
            ModelType::Flash25 => "gemini-2.5-flash",
        }
    }

    /// Whether the model supports an extended reasoning phase.
    pub fn supports_reasoning(self) -> bool {
        matches!(self, ModelType::Flash25)
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|m| m.as_str() == s).ok_or(())
    }
}

// ============================================================================
// ChatMode
// ============================================================================

/// Conversation persona.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatMode {
    #[default]
    Chat,
    SymptomChecker,
}

impl ChatMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatMode::Chat => "chat",
            ChatMode::SymptomChecker => "symptom-checker",
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(ChatMode::Chat),
            "symptom-checker" => Ok(ChatMode::SymptomChecker),
            _ => Err(()),
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// A value chosen from client input.
///
/// `corrected` is set when the input named something outside the allow-list
/// and the default was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub corrected: bool,
}

fn resolve<T: FromStr + Default>(input: Option<&str>) -> Resolved<T> {
    match input {
        None => Resolved {
            value: T::default(),
            corrected: false,
        },
        Some(raw) => match raw.parse() {
            Ok(value) => Resolved {
                value,
                corrected: false,
            },
            Err(_) => Resolved {
                value: T::default(),
                corrected: true,
            },
        },
    }
}

/// Resolve a requested model against the allow-list.
pub fn resolve_model_type(input: Option<&str>) -> Resolved<ModelType> {
    resolve(input)
}

/// Resolve a requested mode; anything unrecognized becomes `chat`.
pub fn resolve_mode(input: Option<&str>) -> Resolved<ChatMode> {
    resolve(input)
}

/// Derive per-turn generation settings.
pub fn generation_config(mode: ChatMode, model_type: ModelType) -> GenerationConfig {
    let instruction = match mode {
        ChatMode::SymptomChecker => SYMPTOM_TRIAGE.to_string(),
        ChatMode::Chat if model_type.supports_reasoning() => {
            format!("{HEALTH_ADVISOR}{REASONING_DIRECTIVE}")
        }
        ChatMode::Chat => HEALTH_ADVISOR.to_string(),
    };

    GenerationConfig {
        system_instruction: Some(instruction),
        reasoning: model_type.supports_reasoning().then_some(ReasoningConfig {
            budget: REASONING_BUDGET,
        }),
    }
}
