//! Integration tests for batch orchestration.
//!
//! These use a scripted compiler so that behaviour grass cannot exhibit
//! (source maps, arbitrary failures) is covered, and so the importer
//! callback contract can be observed from the compiler's side.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use quarto_scss::{
    CompileOptions, CompileResult, DefaultDocumentFactory, Document, ImportResponse,
    InputPathSelector, OutputStyle, SassCompiler, ScssBatch, keys,
};
use quarto_vfs::MemoryFileStore;

/// Compiler stand-in.
///
/// - source containing `!fail` fails
/// - `@import <spec>` lines are resolved through the importer and the
///   resolved path is echoed as a comment
/// - otherwise the source is returned as CSS, with a map when requested
#[derive(Default)]
struct ScriptedCompiler {
    seen: Mutex<Vec<SeenOptions>>,
}

#[derive(Debug, Clone)]
struct SeenOptions {
    input_path: PathBuf,
    style: OutputStyle,
    source_comments: bool,
    source_map: bool,
    include_paths: Vec<PathBuf>,
}

impl SassCompiler for ScriptedCompiler {
    fn compile(&self, source: &str, options: &CompileOptions<'_>) -> CompileResult {
        self.seen.lock().unwrap().push(SeenOptions {
            input_path: options.input_path.clone(),
            style: options.output_style,
            source_comments: options.source_comments,
            source_map: options.source_map,
            include_paths: options.include_paths.to_vec(),
        });

        if source.contains("!fail") {
            return CompileResult::failure("scripted failure");
        }

        let mut css = String::new();
        for line in source.lines() {
            match line.strip_prefix("@import ") {
                Some(spec) => match options.importer.import(spec.trim(), Path::new("")) {
                    ImportResponse::Resolved(import) => {
                        css.push_str(&format!("/* {} */\n{}\n", import.path.display(), import.contents));
                    }
                    ImportResponse::Defer => return CompileResult::failure(format!("cannot import {spec}")),
                },
                None => {
                    css.push_str(line);
                    css.push('\n');
                }
            }
        }

        let result = CompileResult::success(css);
        if options.source_map {
            result.with_source_map(format!("{{\"file\":\"{}\"}}", options.input_path.display()))
        } else {
            result
        }
    }
}

/// Compiler that succeeds but never produces a map.
struct NoMapCompiler;

impl SassCompiler for NoMapCompiler {
    fn compile(&self, source: &str, _options: &CompileOptions<'_>) -> CompileResult {
        CompileResult::success(source.to_string())
    }
}

fn doc(path: &str, content: &str) -> Document {
    Document::new(content).with_metadata(keys::RELATIVE_FILE_PATH, path)
}

fn write_paths(outputs: &[Document]) -> BTreeSet<String> {
    outputs
        .iter()
        .map(|d| d.get_str(keys::WRITE_PATH).unwrap().to_string())
        .collect()
}

#[test]
fn test_one_css_document_per_success() {
    let store = MemoryFileStore::new();
    let inputs = vec![doc("a.scss", "a {}"), doc("css/b.scss", "b {}"), doc("c.sass", "c")];

    let outputs = ScssBatch::new()
        .with_compiler(ScriptedCompiler::default())
        .execute(&inputs, &store, &DefaultDocumentFactory)
        .unwrap();

    assert_eq!(
        write_paths(&outputs),
        BTreeSet::from(["a.css".to_string(), "css/b.css".to_string(), "c.css".to_string()])
    );
    for output in &outputs {
        assert_eq!(output.get(keys::WRITE_PATH), output.get(keys::RELATIVE_FILE_PATH));
    }
}

#[test]
fn test_failures_are_isolated() {
    let store = MemoryFileStore::new();
    let n = 12;
    for broken in 0..n {
        let inputs: Vec<Document> = (0..n)
            .map(|i| {
                let body = if i == broken { "x { !fail }" } else { "x {}" };
                doc(&format!("doc{i}.scss"), body)
            })
            .collect();

        let outputs = ScssBatch::new()
            .with_compiler(ScriptedCompiler::default())
            .execute(&inputs, &store, &DefaultDocumentFactory)
            .unwrap();

        assert_eq!(outputs.len(), n - 1);
        assert!(!write_paths(&outputs).contains(&format!("doc{broken}.css")));
    }
}

#[test]
fn test_source_map_requires_flag_and_map_text() {
    let store = MemoryFileStore::new();
    let inputs = vec![doc("site.scss", "a {}")];

    // flag off, map available: css only
    let outputs = ScssBatch::new()
        .with_compiler(ScriptedCompiler::default())
        .execute(&inputs, &store, &DefaultDocumentFactory)
        .unwrap();
    assert_eq!(write_paths(&outputs), BTreeSet::from(["site.css".to_string()]));

    // flag on, map available: css + map
    let outputs = ScssBatch::new()
        .generate_source_map(true)
        .with_compiler(ScriptedCompiler::default())
        .execute(&inputs, &store, &DefaultDocumentFactory)
        .unwrap();
    assert_eq!(
        write_paths(&outputs),
        BTreeSet::from(["site.css".to_string(), "site.map".to_string()])
    );
    let map = outputs
        .iter()
        .find(|d| d.get_str(keys::WRITE_PATH) == Some("site.map"))
        .unwrap();
    assert_eq!(map.content(), b"{\"file\":\"site.scss\"}");

    // flag on, no map produced: css only
    let outputs = ScssBatch::new()
        .generate_source_map(true)
        .with_compiler(NoMapCompiler)
        .execute(&inputs, &store, &DefaultDocumentFactory)
        .unwrap();
    assert_eq!(write_paths(&outputs), BTreeSet::from(["site.css".to_string()]));
}

#[test]
fn test_missing_input_path_uses_placeholder() {
    let store = MemoryFileStore::new();
    let inputs = vec![Document::new("a {}"), doc("named.scss", "b {}")];

    let outputs = ScssBatch::new()
        .with_compiler(ScriptedCompiler::default())
        .execute(&inputs, &store, &DefaultDocumentFactory)
        .unwrap();

    assert_eq!(outputs.len(), 2);
    let placeholder = outputs
        .iter()
        .map(|d| d.get_str(keys::WRITE_PATH).unwrap())
        .find(|p| *p != "named.css")
        .unwrap();
    assert!(placeholder.ends_with(".css"));
    assert!(!placeholder.contains('/'));
}

#[test]
fn test_options_reflect_configuration() {
    let store = MemoryFileStore::new();
    let compiler = std::sync::Arc::new(ScriptedCompiler::default());

    struct Shared(std::sync::Arc<ScriptedCompiler>);
    impl SassCompiler for Shared {
        fn compile(&self, source: &str, options: &CompileOptions<'_>) -> CompileResult {
            self.0.compile(source, options)
        }
    }

    ScssBatch::new()
        .with_include_paths(["vendor", "shared"])
        .include_source_comments(false)
        .with_nested_output_style()
        .generate_source_map(true)
        .with_compiler(Shared(compiler.clone()))
        .execute(&[doc("css/site.scss", "a {}")], &store, &DefaultDocumentFactory)
        .unwrap();

    let seen = compiler.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].input_path, PathBuf::from("css/site.scss"));
    assert_eq!(seen[0].style, OutputStyle::Nested);
    assert!(!seen[0].source_comments);
    assert!(seen[0].source_map);
    assert_eq!(
        seen[0].include_paths,
        vec![PathBuf::from("vendor"), PathBuf::from("shared")]
    );
}

#[test]
fn test_importer_is_bound_to_each_document() {
    let store = MemoryFileStore::from_files([
        ("blog/_vars.scss", "$site: blog;"),
        ("docs/_vars.scss", "$site: docs;"),
    ]);
    let inputs = vec![
        doc("blog/site.scss", "@import vars"),
        doc("docs/site.scss", "@import vars"),
    ];

    let outputs = ScssBatch::new()
        .with_compiler(ScriptedCompiler::default())
        .execute(&inputs, &store, &DefaultDocumentFactory)
        .unwrap();

    for output in &outputs {
        let path = output.get_str(keys::WRITE_PATH).unwrap();
        let css = String::from_utf8(output.content().to_vec()).unwrap();
        if path == "blog/site.css" {
            assert!(css.contains("blog/_vars.scss"));
            assert!(css.contains("$site: blog;"));
        } else {
            assert_eq!(path, "docs/site.css");
            assert!(css.contains("$site: docs;"));
        }
    }
    assert_eq!(outputs.len(), 2);
}

#[test]
fn test_custom_selector_and_dedicated_pool() {
    let store = MemoryFileStore::new();
    let inputs: Vec<Document> = (0..20)
        .map(|i| Document::new("a {}").with_metadata("slug", format!("theme-{i}")))
        .collect();

    let outputs = ScssBatch::new()
        .with_input_path_fn(|d| d.get_str("slug").map(|s| PathBuf::from(format!("themes/{s}.scss"))))
        .with_jobs(2)
        .with_compiler(ScriptedCompiler::default())
        .execute(&inputs, &store, &DefaultDocumentFactory)
        .unwrap();

    let expected: BTreeSet<String> = (0..20).map(|i| format!("themes/theme-{i}.css")).collect();
    assert_eq!(write_paths(&outputs), expected);
}

#[test]
fn test_source_selector() {
    let store = MemoryFileStore::new();
    let input = Document::new("a {}").with_source("styles/main.scss");

    let outputs = ScssBatch::new()
        .with_input_path(InputPathSelector::Source)
        .with_compiler(ScriptedCompiler::default())
        .execute(&[input], &store, &DefaultDocumentFactory)
        .unwrap();

    assert_eq!(write_paths(&outputs), BTreeSet::from(["styles/main.css".to_string()]));
}

#[test]
fn test_outputs_keep_parent_metadata() {
    let store = MemoryFileStore::new();
    let input = doc("site.scss", "a {}").with_metadata("title", "Main");

    let outputs = ScssBatch::new()
        .with_compiler(ScriptedCompiler::default())
        .execute(&[input.clone()], &store, &DefaultDocumentFactory)
        .unwrap();

    assert_eq!(outputs[0].get_str("title"), Some("Main"));
    assert_ne!(outputs[0].id(), input.id());
    assert_eq!(outputs[0].content(), b"a {}\n");
}

#[test]
fn test_empty_batch() {
    let store = MemoryFileStore::new();
    let outputs = ScssBatch::new()
        .execute(&[], &store, &DefaultDocumentFactory)
        .unwrap();
    assert!(outputs.is_empty());
}
