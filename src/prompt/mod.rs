//! Prompt builders and tiered resolution per language pair and stage

pub mod commands;
pub mod registry;
pub mod resolver;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub use registry::{PromptRegistry, StaticRegistry, TemplateBuilder};
pub use resolver::Resolver;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("no prompt builder registered for stage `{stage}` (generic tier missing)")]
    BuilderNotFound { stage: Stage },

    #[error("prompt module `{path}` has no build template")]
    InvalidBuilder { path: String },

    #[error("invalid language pair `{0}`, expected <source>_<target>")]
    InvalidLanguagePair(String),

    #[error("unknown stage `{0}`")]
    UnknownStage(String),

    #[error("failed to read prompt templates: {0}")]
    TemplateIo(#[from] std::io::Error),

    #[error("failed to parse prompt templates: {0}")]
    TemplateParse(#[from] toml::de::Error),
}

/// A step of the translation pipeline that needs its own prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Segment,
    Translate,
    PostEdit,
    GlossaryGenerate,
    GlossaryUpdate,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Segment,
        Stage::Translate,
        Stage::PostEdit,
        Stage::GlossaryGenerate,
        Stage::GlossaryUpdate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Segment => "segment",
            Self::Translate => "translate",
            Self::PostEdit => "post-edit",
            Self::GlossaryGenerate => "glossary-generate",
            Self::GlossaryUpdate => "glossary-update",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == name)
            .ok_or_else(|| PromptError::UnknownStage(s.to_string()))
    }
}

/// Source and target language, written `<source>_<target>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.source, self.target)
    }
}

impl FromStr for LanguagePair {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split('_').collect::<Vec<_>>().as_slice() {
            [source, target] if !source.is_empty() && !target.is_empty() => {
                Ok(Self::new(*source, *target))
            }
            _ => Err(PromptError::InvalidLanguagePair(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Produces the system and user prompt for one stage from stage-specific
/// positional arguments.
pub trait PromptBuilder: Send + Sync + fmt::Debug {
    fn build(&self, pair: &LanguagePair, args: &[&str]) -> Prompt;

    /// Like [`build`](Self::build), with glossary context kept apart from
    /// the positional arguments. Builders without a glossary slot ignore it.
    fn build_with_glossary(&self, pair: &LanguagePair, args: &[&str], glossary: &str) -> Prompt {
        let _ = glossary;
        self.build(pair, args)
    }
}

/// A registry entry. `builder` is absent when the module was declared
/// without a usable template.
#[derive(Debug, Clone, Default)]
pub struct PromptModule {
    pub builder: Option<Arc<dyn PromptBuilder>>,
    pub supported_languages: Option<Vec<String>>,
}

impl PromptModule {
    pub fn new(builder: Arc<dyn PromptBuilder>) -> Self {
        Self {
            builder: Some(builder),
            supported_languages: None,
        }
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_languages = Some(languages.into_iter().map(Into::into).collect());
        self
    }

    /// True only when the module declares a language set holding both sides.
    pub fn supports(&self, pair: &LanguagePair) -> bool {
        self.supported_languages.as_ref().is_some_and(|langs| {
            langs.iter().any(|l| *l == pair.source) && langs.iter().any(|l| *l == pair.target)
        })
    }
}

/// Precedence level a builder was found at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Specific,
    Common,
    Generic,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Specific => "specific",
            Self::Common => "common",
            Self::Generic => "generic",
        }
    }

    pub fn registry_path(&self, pair: &LanguagePair, stage: Stage) -> String {
        match self {
            Self::Specific => format!("{}/{}", pair, stage),
            Self::Common => format!("common/{}", stage),
            Self::Generic => format!("generic/{}", stage),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
