//! Prompt module registry
//!
//! Modules are addressed by path: `<source>_<target>/<stage>` for a single
//! language pair, `common/<stage>` for a language group and
//! `generic/<stage>` for the catch-all.

use async_trait::async_trait;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use super::{LanguagePair, Prompt, PromptBuilder, PromptError, PromptModule, Stage};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").unwrap());

const CJK_LANGUAGES: &[&str] = &["ja", "zh", "zh-CN", "zh-TW", "ko"];

#[async_trait]
pub trait PromptRegistry: Send + Sync {
    async fn lookup(&self, path: &str) -> Option<PromptModule>;
}

/// Prompt builder backed by a pair of text templates.
///
/// `{source}` and `{target}` expand to the language codes, `{glossary}` to
/// the glossary context and `{0}`, `{1}`, ... to the positional build
/// arguments. Missing arguments expand to nothing and unknown placeholders
/// are left untouched.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    system: String,
    user: String,
}

impl TemplateBuilder {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    fn render(template: &str, pair: &LanguagePair, args: &[&str], glossary: &str) -> String {
        PLACEHOLDER_RE
            .replace_all(template, |caps: &Captures| {
                let name = &caps[1];
                match name {
                    "source" => pair.source.clone(),
                    "target" => pair.target.clone(),
                    "glossary" => glossary.to_string(),
                    _ => match name.parse::<usize>() {
                        Ok(i) => args.get(i).copied().unwrap_or_default().to_string(),
                        Err(_) => caps[0].to_string(),
                    },
                }
            })
            .into_owned()
    }
}

impl PromptBuilder for TemplateBuilder {
    fn build(&self, pair: &LanguagePair, args: &[&str]) -> Prompt {
        self.build_with_glossary(pair, args, "")
    }

    fn build_with_glossary(&self, pair: &LanguagePair, args: &[&str], glossary: &str) -> Prompt {
        Prompt {
            system: Self::render(&self.system, pair, args, glossary),
            user: Self::render(&self.user, pair, args, glossary),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct TemplateFile {
    #[serde(default)]
    templates: HashMap<String, TemplateDef>,
}

#[derive(Debug, Deserialize)]
struct TemplateDef {
    system: Option<String>,
    user: Option<String>,
    supported_languages: Option<Vec<String>>,
}

impl From<TemplateDef> for PromptModule {
    fn from(def: TemplateDef) -> Self {
        let builder = match (def.system, def.user) {
            (Some(system), Some(user)) => {
                Some(Arc::new(TemplateBuilder::new(system, user)) as Arc<dyn PromptBuilder>)
            }
            _ => None,
        };
        PromptModule {
            builder,
            supported_languages: def.supported_languages,
        }
    }
}

#[derive(Debug, Default)]
pub struct StaticRegistry {
    modules: HashMap<String, PromptModule>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the bundled templates.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        for stage in Stage::ALL {
            let (system, user) = generic_template(stage);
            registry.register(
                format!("generic/{}", stage),
                PromptModule::new(Arc::new(TemplateBuilder::new(system, user))),
            );
        }

        registry.register(
            format!("common/{}", Stage::Translate),
            PromptModule::new(Arc::new(TemplateBuilder::new(
                "You translate East Asian web novels from {source} to {target}. \
                 Keep honorifics and name order as written in the source. \
                 Output only the translation.\n{glossary}",
                "{0}",
            )))
            .with_languages(CJK_LANGUAGES.iter().copied()),
        );

        registry.register(
            format!("ja_en/{}", Stage::Translate),
            PromptModule::new(Arc::new(TemplateBuilder::new(
                "You translate Japanese web novels into natural English. \
                 Keep honorifics such as -san and -sama, render onomatopoeia \
                 in English, and preserve paragraph breaks. \
                 Output only the translation.\n{glossary}",
                "{0}",
            ))),
        );

        registry
    }

    pub fn register(&mut self, path: impl Into<String>, module: PromptModule) {
        self.modules.insert(path.into(), module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Merge template definitions from a TOML file, replacing modules
    /// registered under the same path. Returns the number of modules read.
    pub fn load_overrides<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, PromptError> {
        let content = fs::read_to_string(path.as_ref())?;
        self.merge_toml(&content)
    }

    pub fn merge_toml(&mut self, content: &str) -> Result<usize, PromptError> {
        let file: TemplateFile = toml::from_str(content)?;
        let count = file.templates.len();
        for (path, def) in file.templates {
            if def.system.is_none() || def.user.is_none() {
                tracing::warn!("Prompt module `{}` is missing a system or user template", path);
            }
            self.register(path, def.into());
        }
        Ok(count)
    }
}

#[async_trait]
impl PromptRegistry for StaticRegistry {
    async fn lookup(&self, path: &str) -> Option<PromptModule> {
        self.modules.get(path).cloned()
    }
}

fn generic_template(stage: Stage) -> (&'static str, &'static str) {
    match stage {
        Stage::Segment => (
            "Split the following {source} novel text into chunks suitable for \
             translation. Never split inside a sentence or a dialogue line. \
             Return one chunk per block, separated by a line containing only `---`.",
            "{0}",
        ),
        Stage::Translate => (
            "You are a professional literary translator. Translate the given \
             text from {source} to {target}. Preserve paragraph breaks and \
             dialogue formatting. Output only the translation.\n{glossary}",
            "{0}",
        ),
        Stage::PostEdit => (
            "You are an editor reviewing a {source} to {target} translation. \
             Fix mistranslations, omissions and awkward phrasing while keeping \
             the draft's structure. Output only the revised translation.\n{glossary}",
            "Source:\n{0}\n\nDraft:\n{1}",
        ),
        Stage::GlossaryGenerate => (
            "Extract proper nouns and recurring terms from the following {source} \
             text and propose {target} renderings. Respond with JSON of the form \
             {\"entries\": [{\"keys\": [...], \"value\": \"...\"}]}.",
            "{0}",
        ),
        Stage::GlossaryUpdate => (
            "Update the existing {source} to {target} glossary with new proper \
             nouns and terms found in the text. Keep existing entries unless the \
             text shows they are wrong. Respond with the full glossary as JSON.",
            "Glossary:\n{0}\n\nText:\n{1}",
        ),
    }
}
