//! One build pass: schema documents and injected templates for every
//! template under the entry directory.
//!
//! Pass order:
//! 1. enumerate templates (sorted, recursive)
//! 2. recreate `doc_dir` and `build_dir`
//! 3. load the manifest once
//! 4. per template: extract schema, then inject
//!
//! Nothing here returns an error to the caller. Every failure ends up in
//! [`BuildReport::failures`] and in the log; the rest of the pass continues.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use walkdir::WalkDir;

use ayue_core::ThemePaths;
use ayue_inject::{Injector, Manifest, SchemaExtractor};

use crate::error::SyncError;

/// A single recorded failure of a build pass.
#[derive(Debug)]
pub struct BuildFailure {
    pub path: PathBuf,
    pub error: SyncError,
}

/// Everything a build pass produced.
#[derive(Debug)]
pub struct BuildReport {
    /// Templates found under the entry directory, sorted.
    pub templates: Vec<PathBuf>,
    /// Injected templates, sorted.
    pub outputs: Vec<PathBuf>,
    /// Schema documents, sorted.
    pub docs: Vec<PathBuf>,
    pub failures: Vec<BuildFailure>,
    pub finished_at: DateTime<Utc>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Serializable digest with paths shown relative to the project root.
    pub fn summary(&self, paths: &ThemePaths) -> BuildSummary {
        let rel = |p: &PathBuf| paths.display_relative(p);
        BuildSummary {
            templates: self.templates.len(),
            outputs: self.outputs.iter().map(rel).collect(),
            docs: self.docs.iter().map(rel).collect(),
            failures: self
                .failures
                .iter()
                .map(|f| format!("{}: {}", paths.display_relative(&f.path), f.error))
                .collect(),
            finished_at: self.finished_at,
        }
    }
}

/// Wire form of a [`BuildReport`], returned by the daemon's `build` command.
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub templates: usize,
    pub outputs: Vec<String>,
    pub docs: Vec<String>,
    pub failures: Vec<String>,
    pub finished_at: DateTime<Utc>,
}

/// Run one build pass for the project described by `paths`.
pub fn run(paths: &ThemePaths) -> BuildReport {
    let mut failures = Vec::new();

    let templates = match enumerate_templates(paths) {
        Ok(templates) => templates,
        Err(error) => {
            tracing::error!("cannot list templates under {}: {error}", paths.entry_dir.display());
            failures.push(BuildFailure {
                path: paths.entry_dir.clone(),
                error,
            });
            Vec::new()
        }
    };

    for dir in [&paths.doc_dir, &paths.build_dir] {
        if let Err(error) = recreate_dir(dir) {
            tracing::error!("{error}");
            failures.push(BuildFailure {
                path: dir.clone(),
                error,
            });
        }
    }

    let manifest = match Manifest::load(&paths.manifest) {
        Ok(manifest) => Some(manifest),
        Err(err) => {
            tracing::error!("injection skipped: {err}");
            failures.push(BuildFailure {
                path: paths.manifest.clone(),
                error: err.into(),
            });
            None
        }
    };

    let mut outputs = Vec::new();
    let mut docs = Vec::new();

    let injector = manifest.as_ref().and_then(|manifest| {
        match Injector::new(manifest, &paths.assets_dir, &paths.template_ext) {
            Ok(injector) => Some(injector),
            Err(err) => {
                failures.push(BuildFailure {
                    path: paths.manifest.clone(),
                    error: err.into(),
                });
                None
            }
        }
    });

    match SchemaExtractor::new(&paths.template_ext) {
        Ok(extractor) => {
            for template in &templates {
                match extractor.extract(template, &paths.entry_dir, &paths.doc_dir) {
                    Ok(Some(doc)) => docs.push(doc),
                    Ok(None) => {}
                    Err(err) => {
                        tracing::warn!("schema: {err}");
                        failures.push(BuildFailure {
                            path: template.clone(),
                            error: err.into(),
                        });
                        continue;
                    }
                }

                let Some(injector) = &injector else {
                    continue;
                };
                match injector.inject(template, &paths.build_dir) {
                    Ok(output) => outputs.push(output),
                    Err(err) => {
                        tracing::warn!("inject: {err}");
                        failures.push(BuildFailure {
                            path: template.clone(),
                            error: err.into(),
                        });
                    }
                }
            }
        }
        Err(err) => failures.push(BuildFailure {
            path: paths.entry_dir.clone(),
            error: err.into(),
        }),
    }

    outputs.sort();
    docs.sort();
    tracing::info!(
        "build pass: {} template(s), {} output(s), {} doc(s), {} failure(s)",
        templates.len(),
        outputs.len(),
        docs.len(),
        failures.len()
    );

    BuildReport {
        templates,
        outputs,
        docs,
        failures,
        finished_at: Utc::now(),
    }
}

fn enumerate_templates(paths: &ThemePaths) -> Result<Vec<PathBuf>, SyncError> {
    let mut templates = Vec::new();
    for entry in WalkDir::new(&paths.entry_dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && paths.is_template(entry.path()) {
            templates.push(entry.into_path());
        }
    }
    templates.sort();
    Ok(templates)
}

fn recreate_dir(dir: &Path) -> Result<(), SyncError> {
    let recreate = |source| SyncError::DirectoryRecreate {
        path: dir.to_path_buf(),
        source,
    };
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(recreate(err)),
    }
    std::fs::create_dir_all(dir).map_err(recreate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use ayue_core::ThemeConfig;
    use ayue_inject::InjectError;
    use tempfile::TempDir;

    fn project() -> (TempDir, ThemePaths) {
        let root = TempDir::new().unwrap();
        let paths = ThemeConfig::default().resolve(root.path()).unwrap();
        fs::create_dir_all(&paths.entry_dir).unwrap();
        (root, paths)
    }

    #[test]
    fn recreate_clears_stale_outputs() {
        let (_root, paths) = project();
        fs::create_dir_all(&paths.build_dir).unwrap();
        fs::write(paths.build_dir.join("stale.liquid"), "old").unwrap();

        recreate_dir(&paths.build_dir).unwrap();
        assert!(paths.build_dir.is_dir());
        assert!(!paths.build_dir.join("stale.liquid").exists());
    }

    #[test]
    fn missing_manifest_skips_injection_but_extracts_schemas() {
        let (_root, paths) = project();
        fs::write(
            paths.entry_dir.join("home.liquid"),
            "{% schema %}{\"name\":\"Home\"}{% endschema %}",
        )
        .unwrap();

        let report = run(&paths);
        assert!(report.outputs.is_empty());
        assert_eq!(report.docs, vec![paths.doc_dir.join("home.json")]);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            SyncError::Inject(InjectError::ManifestNotFound { .. })
        ));
    }

    #[test]
    fn templates_are_enumerated_recursively_and_sorted() {
        let (_root, paths) = project();
        fs::create_dir_all(paths.entry_dir.join("b")).unwrap();
        fs::write(paths.entry_dir.join("b").join("z.liquid"), "").unwrap();
        fs::write(paths.entry_dir.join("a.liquid"), "").unwrap();
        fs::write(paths.entry_dir.join("a.js"), "").unwrap();

        let found = enumerate_templates(&paths).unwrap();
        assert_eq!(
            found,
            vec![paths.entry_dir.join("a.liquid"), paths.entry_dir.join("b").join("z.liquid")]
        );
    }

    #[test]
    fn summary_shows_project_relative_paths() {
        let (_root, paths) = project();
        fs::create_dir_all(paths.manifest.parent().unwrap()).unwrap();
        fs::write(&paths.manifest, "{}").unwrap();
        fs::write(paths.entry_dir.join("home.liquid"), "<p/>").unwrap();

        let report = run(&paths);
        assert!(report.is_clean());
        let summary = report.summary(&paths);
        assert_eq!(summary.templates, 1);
        assert_eq!(summary.outputs, vec!["ayue_build/home.liquid".to_string()]);
        assert!(summary.docs.is_empty());
    }
}
