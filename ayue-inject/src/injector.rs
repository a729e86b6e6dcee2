//! Template injection: splices emitted stylesheets and scripts into a
//! Liquid template.
//!
//! For every manifest entry whose key contains the template's base name, in
//! manifest order, applied to the same buffer:
//!
//! | Step            | Effect                                                        |
//! |-----------------|---------------------------------------------------------------|
//! | import markers  | every `{% liquid … assign isAyueImport = true … %}` removed   |
//! | `.css` entry    | `{%- style -%}…{%- endstyle -%}` prepended to the buffer       |
//! | `.js` entry     | `<script>…</script>` inserted before each `{% schema %}` tag   |
//!
//! Style blocks of several matching entries therefore stack in reverse
//! processing order.

use std::path::{Path, PathBuf};

use regex::{NoExpand, Regex};

use ayue_core::TemplateName;

use crate::error::{io_err, InjectError};
use crate::manifest::{AssetKind, Manifest, ManifestEntry};

/// Directive a template author adds to mark a file for injection.
pub const IMPORT_MARKER_PATTERN: &str =
    r"\{%\s*liquid\s+[^%]*assign\s+isAyueImport\s*=\s*true[^%]*%\}";

const SCHEMA_OPEN_PATTERN: &str = r"\{%\s*schema\s*%\}";
const SCHEMA_OPEN_TAG: &str = "{% schema %}";

/// Wrap stylesheet content in a Liquid style block.
pub fn style_block(css: &str) -> String {
    format!("{{%- style -%}}\n{css}\n{{%- endstyle -%}}\n")
}

/// Wrap script content in an inline script tag.
pub fn script_block(js: &str) -> String {
    format!("<script>\n{js}</script>")
}

/// Rewrites templates against one loaded manifest.
pub struct Injector<'m> {
    manifest: &'m Manifest,
    assets_root: PathBuf,
    template_ext: String,
    marker: Regex,
    schema_open: Regex,
}

impl<'m> Injector<'m> {
    pub fn new(
        manifest: &'m Manifest,
        assets_root: &Path,
        template_ext: &str,
    ) -> Result<Self, InjectError> {
        Ok(Self {
            manifest,
            assets_root: assets_root.to_path_buf(),
            template_ext: template_ext.trim_start_matches('.').to_string(),
            marker: Regex::new(IMPORT_MARKER_PATTERN)?,
            schema_open: Regex::new(SCHEMA_OPEN_PATTERN)?,
        })
    }

    /// Read `template_path`, transform it and write
    /// `<output_dir>/<baseName>.<ext>`. Returns the written path.
    ///
    /// `output_dir` must already exist.
    pub fn inject(&self, template_path: &Path, output_dir: &Path) -> Result<PathBuf, InjectError> {
        let name = TemplateName::from_path(template_path, &self.template_ext);
        let content = std::fs::read_to_string(template_path)
            .map_err(|e| io_err(template_path, e))?;

        let rendered = self.render(template_path, &name, content)?;

        let output = output_dir.join(format!("{name}.{}", self.template_ext));
        std::fs::write(&output, rendered).map_err(|e| io_err(&output, e))?;
        tracing::debug!("injected: {} -> {}", template_path.display(), output.display());
        Ok(output)
    }

    /// Apply every matching manifest entry to `content`.
    pub fn render(
        &self,
        template_path: &Path,
        name: &TemplateName,
        mut content: String,
    ) -> Result<String, InjectError> {
        for (key, entry) in self.manifest.matching(name) {
            content = self.strip_import_markers(&content);
            match entry.kind() {
                AssetKind::Stylesheet => {
                    let css = self.read_asset(template_path, entry)?;
                    content = style_block(&css) + &content;
                }
                AssetKind::Script => {
                    let js = self.read_asset(template_path, entry)?;
                    content = self.insert_before_schema(&content, &script_block(&js));
                }
                AssetKind::Other => {
                    tracing::debug!("{key}: {} is neither css nor js, skipped", entry.file);
                }
            }
            tracing::trace!("{name}: applied manifest entry {key}");
        }
        Ok(content)
    }

    /// Remove every import marker from `content`.
    pub fn strip_import_markers(&self, content: &str) -> String {
        self.marker.replace_all(content, "").into_owned()
    }

    /// Insert `block` immediately before every schema opening tag.
    pub fn insert_before_schema(&self, content: &str, block: &str) -> String {
        let replacement = format!("{block}\n{SCHEMA_OPEN_TAG}");
        self.schema_open
            .replace_all(content, NoExpand(&replacement))
            .into_owned()
    }

    fn read_asset(&self, template: &Path, entry: &ManifestEntry) -> Result<String, InjectError> {
        let asset = entry.asset_path(&self.assets_root);
        std::fs::read_to_string(&asset).map_err(|source| InjectError::MissingAsset {
            template: template.to_path_buf(),
            asset,
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
