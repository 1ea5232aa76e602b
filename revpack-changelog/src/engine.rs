//! Tera rendering for changelog entries.
//!
//! The entry template is baked into the binary. A workspace may replace it
//! by dropping `changelog.tera` into `<workspace>/templates/`.

use std::path::Path;

use tera::Tera;

use revpack_core::layout::templates_dir;

use crate::entry::ChangelogEntry;
use crate::error::{io_err, ChangelogError};

// ---------------------------------------------------------------------------
// Embedded template
// ---------------------------------------------------------------------------

pub const TEMPLATE_NAME: &str = "changelog.tera";

const DEFAULT_TEMPLATE: &str = include_str!("templates/changelog.tera");

fn load_user_template(dir: &Path) -> Result<Option<String>, ChangelogError> {
    let path = dir.join(TEMPLATE_NAME);
    if !path.is_file() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    tracing::debug!(path = %path.display(), "using changelog template override");
    Ok(Some(contents))
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, ChangelogError> {
    let template = match user_template_dir {
        Some(dir) => load_user_template(dir)?,
        None => None,
    };
    let mut tera = Tera::default();
    tera.add_raw_template(
        TEMPLATE_NAME,
        template.as_deref().unwrap_or(DEFAULT_TEMPLATE),
    )?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// ChangelogRenderer
// ---------------------------------------------------------------------------

/// Renders [`ChangelogEntry`] values into Debian changelog blocks.
///
/// Create once per run and reuse for every project.
pub struct ChangelogRenderer {
    tera: Tera,
}

impl ChangelogRenderer {
    /// Build a renderer from the embedded template, replaced by
    /// `<user_template_dir>/changelog.tera` when that file exists.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, ChangelogError> {
        let tera = build_tera(user_template_dir)?;
        Ok(ChangelogRenderer { tera })
    }

    /// Renderer honouring the override in `<workspace>/templates/`.
    pub fn for_workspace(workspace: &Path) -> Result<Self, ChangelogError> {
        Self::new(Some(&templates_dir(workspace)))
    }

    /// Render one entry block without a trailing newline.
    pub fn render(&self, entry: &ChangelogEntry) -> Result<String, ChangelogError> {
        let ctx = entry.to_tera_context()?;
        let rendered = self.tera.render(TEMPLATE_NAME, &ctx)?;
        let block = rendered.trim_end_matches(['\n', '\r']).to_string();
        if block.trim().is_empty() {
            return Err(ChangelogError::EmptyEntry);
        }
        Ok(block)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
