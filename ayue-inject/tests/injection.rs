//! End-to-end injection and schema extraction against on-disk fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use ayue_inject::{Injector, InjectError, Manifest, SchemaExtractor};
use rstest::rstest;
use tempfile::TempDir;

const HOME_TEMPLATE: &str = "{% liquid\n  assign isAyueImport = true\n%}\n<section class=\"home\"></section>\n{% schema %}{\"name\":\"Home\"}{% endschema %}\n";

struct Fixture {
    _root: TempDir,
    src: PathBuf,
    assets: PathBuf,
    build: PathBuf,
    docs: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().expect("tempdir");
        let src = root.path().join("src");
        let assets = root.path().join("assets");
        let build = root.path().join("ayue_build");
        let docs = root.path().join("ayue_doc");
        for dir in [&src, &assets, &build, &docs] {
            fs::create_dir_all(dir).expect("mkdir");
        }
        Self {
            _root: root,
            src,
            assets,
            build,
            docs,
        }
    }

    fn template(&self, rel: &str, body: &str) -> PathBuf {
        let path = self.src.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    fn asset(&self, name: &str, body: &str) {
        fs::write(self.assets.join(name), body).unwrap();
    }

    fn inject(&self, manifest: &str, template: &Path) -> Result<String, InjectError> {
        let manifest = Manifest::from_json_str(manifest).expect("manifest json");
        let injector = Injector::new(&manifest, &self.assets, "liquid")?;
        let out = injector.inject(template, &self.build)?;
        Ok(fs::read_to_string(out).unwrap())
    }
}

// ---------------------------------------------------------------------------
// Injection
// ---------------------------------------------------------------------------

#[test]
fn home_scenario_script_before_schema_and_doc_written() {
    let fx = Fixture::new();
    fx.asset("home.abc123.js", "console.log('home');\n");
    let template = fx.template("home.liquid", HOME_TEMPLATE);

    let out = fx
        .inject(r#"{"home": {"file": "home.abc123.js"}}"#, &template)
        .expect("inject");
    assert!(
        out.contains("<script>\nconsole.log('home');\n</script>\n{% schema %}"),
        "script must sit immediately before the schema tag:\n{out}"
    );
    assert!(!out.contains("isAyueImport"), "markers must be gone:\n{out}");

    let extractor = SchemaExtractor::new("liquid").unwrap();
    let doc = extractor
        .extract(&template, &fx.src, &fx.docs)
        .expect("extract")
        .expect("doc written");
    assert_eq!(doc, fx.docs.join("home.json"));
    assert_eq!(fs::read_to_string(doc).unwrap(), r#"{"name":"Home"}"#);
}

#[test]
fn stylesheet_output_begins_with_style_block() {
    let fx = Fixture::new();
    fx.asset("home.css", ".home{color:red}");
    let template = fx.template("home.liquid", HOME_TEMPLATE);

    let out = fx
        .inject(r#"{"frontend/home.scss": {"file": "home.css"}}"#, &template)
        .expect("inject");
    assert!(out.starts_with("{%- style -%}\n.home{color:red}\n{%- endstyle -%}\n"));
    assert!(!out.contains("isAyueImport"));
}

#[test]
fn multiple_matches_compound_in_manifest_order() {
    let fx = Fixture::new();
    fx.asset("a.css", "A");
    fx.asset("b.css", "B");
    fx.asset("home.js", "J");
    let template = fx.template("home.liquid", "<p/>{% schema %}{}{% endschema %}");

    let manifest = r#"{
        "home-a.scss": {"file": "a.css"},
        "home.js": {"file": "home.js"},
        "home-b.scss": {"file": "b.css"}
    }"#;
    let out = fx.inject(manifest, &template).expect("inject");
    assert_eq!(
        out,
        "{%- style -%}\nB\n{%- endstyle -%}\n\
         {%- style -%}\nA\n{%- endstyle -%}\n\
         <p/><script>\nJ</script>\n{% schema %}{}{% endschema %}"
    );
}

#[test]
fn two_script_matches_both_precede_schema() {
    let fx = Fixture::new();
    fx.asset("one.js", "1");
    fx.asset("two.js", "2");
    let template = fx.template("home.liquid", "{% schema %}{% endschema %}");

    let out = fx
        .inject(
            r#"{"home.one": {"file": "one.js"}, "home.two": {"file": "two.js"}}"#,
            &template,
        )
        .expect("inject");
    assert_eq!(
        out,
        "<script>\n1</script>\n<script>\n2</script>\n{% schema %}{% endschema %}"
    );
}

#[test]
fn missing_asset_fails_without_writing_output() {
    let fx = Fixture::new();
    let template = fx.template("home.liquid", HOME_TEMPLATE);

    let err = fx
        .inject(r#"{"home": {"file": "home.missing.js"}}"#, &template)
        .unwrap_err();
    assert!(matches!(err, InjectError::MissingAsset { .. }), "got: {err}");
    assert!(!fx.build.join("home.liquid").exists());
}

#[test]
fn source_template_is_never_modified() {
    let fx = Fixture::new();
    fx.asset("home.js", "x");
    let template = fx.template("home.liquid", HOME_TEMPLATE);
    fx.inject(r#"{"home": {"file": "home.js"}}"#, &template)
        .expect("inject");
    assert_eq!(fs::read_to_string(&template).unwrap(), HOME_TEMPLATE);
}

// ---------------------------------------------------------------------------
// Schema extraction
// ---------------------------------------------------------------------------

#[rstest]
#[case("<div/>")]
#[case("{% schema %}")]
#[case("{%schema%}{}{%endschema%}")]
#[case("{% schema %}{% endschema %}")]
fn no_schema_block_writes_no_doc(#[case] body: &str) {
    let fx = Fixture::new();
    let template = fx.template("sections/plain.liquid", body);
    let extractor = SchemaExtractor::new("liquid").unwrap();
    let doc = extractor.extract(&template, &fx.src, &fx.docs).expect("extract");
    assert!(doc.is_none());
    assert!(!fx.docs.join("sections").join("plain.json").exists());
}

#[rstest]
#[case("{% schema %}{\"a\":1}{% endschema %}", "{\"a\":1}")]
#[case("{% schema %}\n  {\n  \"a\": 1\n  }\n{% endschema %}", "{\n  \"a\": 1\n  }")]
#[case("x{% schema %} first {% endschema %}{% schema %}second{% endschema %}", "first")]
fn doc_equals_trimmed_inner_text(#[case] body: &str, #[case] expected: &str) {
    let fx = Fixture::new();
    let template = fx.template("sections/nested/hero.liquid", body);
    let extractor = SchemaExtractor::new("liquid").unwrap();
    let doc = extractor
        .extract(&template, &fx.src, &fx.docs)
        .expect("extract")
        .expect("doc");
    assert_eq!(doc, fx.docs.join("sections").join("nested").join("hero.json"));
    assert_eq!(fs::read_to_string(doc).unwrap(), expected);
}
