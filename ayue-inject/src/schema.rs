//! Schema extraction. Copies the first `{% schema %}` block of a template
//! into `<doc_root>/<relative dir>/<baseName>.json`.

use std::path::{Path, PathBuf};

use regex::Regex;

use ayue_core::TemplateName;

use crate::error::{io_err, InjectError};

const SCHEMA_BLOCK_PATTERN: &str = r"\{% schema %\}((?s:.*?))\{% endschema %\}";

/// Extracts schema blocks into standalone documents.
pub struct SchemaExtractor {
    block: Regex,
    template_ext: String,
}

impl SchemaExtractor {
    pub fn new(template_ext: &str) -> Result<Self, InjectError> {
        Ok(Self {
            block: Regex::new(SCHEMA_BLOCK_PATTERN)?,
            template_ext: template_ext.trim_start_matches('.').to_string(),
        })
    }

    /// Trimmed inner text of the first schema block, if any.
    ///
    /// An empty block (`{% schema %}{% endschema %}`) counts as absent.
    pub fn find<'c>(&self, content: &'c str) -> Option<&'c str> {
        let inner = self.block.captures(content)?.get(1)?.as_str();
        if inner.is_empty() {
            return None;
        }
        Some(inner.trim())
    }

    /// Mirror the template's directory under `doc_root` and write its schema
    /// document there. Returns `Ok(None)` when the template has no schema block.
    ///
    /// Templates outside `source_root` land directly in `doc_root`.
    pub fn extract(
        &self,
        template_path: &Path,
        source_root: &Path,
        doc_root: &Path,
    ) -> Result<Option<PathBuf>, InjectError> {
        let relative_dir = template_path
            .parent()
            .and_then(|dir| dir.strip_prefix(source_root).ok())
            .unwrap_or_else(|| Path::new(""));
        let doc_dir = doc_root.join(relative_dir);
        std::fs::create_dir_all(&doc_dir).map_err(|e| io_err(&doc_dir, e))?;

        let content = std::fs::read_to_string(template_path)
            .map_err(|e| io_err(template_path, e))?;
        let Some(schema) = self.find(&content) else {
            return Ok(None);
        };

        let name = TemplateName::from_path(template_path, &self.template_ext);
        let doc_path = doc_dir.join(format!("{name}.json"));
        std::fs::write(&doc_path, schema).map_err(|e| io_err(&doc_path, e))?;
        tracing::debug!("schema: {}", doc_path.display());
        Ok(Some(doc_path))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
