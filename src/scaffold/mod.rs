//! Scaffold generation for new project files
//!
//! Renders embedded Tera templates for `fit init` and `fit tpl scaffold`,
//! with hardcoded fallbacks when an embedded template is missing.

use chrono::{DateTime, Utc};
use rust_embed::Embed;
use tera::Tera;
use thiserror::Error;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedScaffolds;

/// Context for scaffold generation
#[derive(Debug, Clone)]
pub struct ScaffoldContext {
    pub site: String,
    pub author: String,
    pub created: DateTime<Utc>,
}

impl ScaffoldContext {
    pub fn new(site: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            author: author.into(),
            created: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("Scaffold template not found: {0}")]
    NotFound(String),

    #[error("Scaffold rendering error: {0}")]
    RenderError(String),
}

/// Scaffold generator using Tera
pub struct ScaffoldGenerator {
    tera: Tera,
}

impl ScaffoldGenerator {
    /// Create a new generator with the embedded templates loaded
    pub fn new() -> Result<Self, ScaffoldError> {
        let mut tera = Tera::default();

        for file in EmbeddedScaffolds::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedScaffolds::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| ScaffoldError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    fn context(ctx: &ScaffoldContext) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("site", &ctx.site);
        context.insert("author", &ctx.author);
        context.insert("created", &ctx.created.to_rfc3339());
        context.insert("created_date", &ctx.created.format("%Y-%m-%d").to_string());
        context
    }

    fn render(&self, name: &str, ctx: &ScaffoldContext) -> Option<Result<String, ScaffoldError>> {
        if self.tera.get_template_names().any(|n| n == name) {
            Some(
                self.tera
                    .render(name, &Self::context(ctx))
                    .map_err(|e| ScaffoldError::RenderError(e.to_string())),
            )
        } else {
            None
        }
    }

    /// Generate the project config file
    pub fn generate_config(&self, ctx: &ScaffoldContext) -> Result<String, ScaffoldError> {
        match self.render("config.yaml.tera", ctx) {
            Some(result) => result,
            None => Ok(self.hardcoded_config(ctx)),
        }
    }

    /// Generate the team roster file
    pub fn generate_team(&self, ctx: &ScaffoldContext) -> Result<String, ScaffoldError> {
        match self.render("team.yaml.tera", ctx) {
            Some(result) => result,
            None => Ok(self.hardcoded_team(ctx)),
        }
    }

    /// Generate a starter category tree for template authoring
    pub fn generate_tree(&self, ctx: &ScaffoldContext) -> Result<String, ScaffoldError> {
        match self.render("tree.yaml.tera", ctx) {
            Some(result) => result,
            None => Ok(self.hardcoded_tree(ctx)),
        }
    }

    fn hardcoded_config(&self, ctx: &ScaffoldContext) -> String {
        format!(
            r#"# FIT project configuration
site: "{site}"
author: "{author}"

workflow:
  # Approver recorded on submit when --approver is not given
  default_approver: ""
  # Seal runs into the archive as soon as they reach done
  auto_archive: true
"#,
            site = ctx.site,
            author = ctx.author,
        )
    }

    fn hardcoded_team(&self, ctx: &ScaffoldContext) -> String {
        format!(
            r#"# Team roster
# Roles: inspector, quality, site_manager, facility_director
members:
  - name: "{author}"
    roles: [inspector, site_manager]
    admin: true
"#,
            author = ctx.author,
        )
    }

    fn hardcoded_tree(&self, ctx: &ScaffoldContext) -> String {
        format!(
            r#"# Inspection category tree for {site}
# major -> middle -> minor, at most 10 entries per level.
# A major name is required; middle and minor names may stay empty.
# "No minors" is written as a single empty string slot.

majors:
  - name: "Electrical"
    middles:
      - name: "Switchgear"
        minors:
          - "Breaker condition"
          - "Cable jacketing"
      - name: ""
        minors:
          - "Panel labeling"
  - name: "Fire Safety"
    middles:
      - name: ""
        minors:
          - ""
"#,
            site = ctx.site,
        )
    }
}

impl Default for ScaffoldGenerator {
    fn default() -> Self {
        Self::new().unwrap_or(Self {
            tera: Tera::default(),
        })
    }
}
