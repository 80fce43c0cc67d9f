use std::fs;
use std::path::{Path, PathBuf};
use weave_core::{
    Catalog, GeneratorRegistry, InjectionEngine, RunMode, TaxonomyCategory, TypeDescriptor,
    WeaveConfig, WeaveError,
};

fn engine() -> InjectionEngine {
    let mut one = TaxonomyCategory::new("CategoryOne");
    one.insert("alpha", TypeDescriptor::new().with("name", "alpha")).unwrap();
    one.insert("beta", TypeDescriptor::new().with("name", "beta")).unwrap();
    let mut two = TaxonomyCategory::new("CategoryTwo");
    two.insert("gamma", TypeDescriptor::new().with("name", "gamma")).unwrap();

    let catalog = Catalog::new()
        .with_category(one)
        .unwrap()
        .with_category(two)
        .unwrap();

    let mut builder = GeneratorRegistry::builder();
    builder.register_handlebars("tmpl_x", "GEN({{name}})").unwrap();
    builder.register_handlebars("tmpl_pair", "{{name}}_a\n{{name}}_b\n").unwrap();
    InjectionEngine::new(WeaveConfig::default(), catalog, builder.build()).unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn generate(engine: &InjectionEngine, paths: &[PathBuf]) {
    let report = engine
        .apply_all(paths, false, RunMode::Generate, &mut Vec::new())
        .unwrap();
    assert!(report.is_success(), "{:?}", report.failures);
}

fn clean(engine: &InjectionEngine, paths: &[PathBuf]) {
    let report = engine
        .apply_all(paths, false, RunMode::Clean, &mut Vec::new())
        .unwrap();
    assert!(report.is_success(), "{:?}", report.failures);
}

const SOURCE: &str = "\
cdef class Holder:
    # START INJECTION | tmpl_x(CategoryOne, CategoryTwo)
    stale
    # END INJECTION

def tail():
    # START INJECTION | tmpl_pair(CategoryTwo)
    # END INJECTION
    return None
";

#[test]
fn test_generate_expands_in_catalog_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.pyx", SOURCE);
    let engine = engine();

    generate(&engine, &[path.clone()]);

    let expected = "\
cdef class Holder:
    # START INJECTION | tmpl_x(CategoryOne, CategoryTwo)
GEN(alpha)
GEN(beta)
GEN(gamma)
    # END INJECTION

def tail():
    # START INJECTION | tmpl_pair(CategoryTwo)
gamma_a
gamma_b
    # END INJECTION
    return None
";
    assert_eq!(fs::read_to_string(&path).unwrap(), expected);
}

#[test]
fn test_clean_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.pyx", SOURCE);
    let engine = engine();

    clean(&engine, &[path.clone()]);
    let once = fs::read_to_string(&path).unwrap();
    clean(&engine, &[path.clone()]);
    assert_eq!(fs::read_to_string(&path).unwrap(), once);
    assert!(!once.contains("stale"));
}

#[test]
fn test_clean_after_generate_equals_clean() {
    let dir = tempfile::tempdir().unwrap();
    let generated = write(dir.path(), "a.pyx", SOURCE);
    let cleaned = write(dir.path(), "b.pyx", SOURCE);
    let engine = engine();

    generate(&engine, &[generated.clone()]);
    clean(&engine, &[generated.clone(), cleaned.clone()]);

    assert_eq!(
        fs::read_to_string(&generated).unwrap(),
        fs::read_to_string(&cleaned).unwrap()
    );
}

#[test]
fn test_generate_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.pyx", SOURCE);
    let engine = engine();

    generate(&engine, &[path.clone()]);
    let first = fs::read_to_string(&path).unwrap();

    let report = engine
        .apply_all(&[path.clone()], false, RunMode::Generate, &mut Vec::new())
        .unwrap();
    assert_eq!(report.unchanged, vec![path.clone()]);
    assert_eq!(fs::read_to_string(&path).unwrap(), first);
    assert!(engine.check(&[path]).unwrap().is_clean());
}

#[test]
fn test_file_without_regions_is_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let content = "plain\r\ntext without markers";
    let path = write(dir.path(), "plain.pyx", content);
    let before = fs::metadata(&path).unwrap().modified().unwrap();
    let engine = engine();

    let report = engine
        .apply_all(&[path.clone()], false, RunMode::Generate, &mut Vec::new())
        .unwrap();

    assert_eq!(report.untouched, vec![path.clone()]);
    assert_eq!(fs::read_to_string(&path).unwrap(), content);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
}

#[test]
fn test_unknown_category_aborts_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "a.pyx", SOURCE);
    let bad = write(
        dir.path(),
        "b.pyx",
        "# START INJECTION | tmpl_x(CategoryThree)\nold\n# END INJECTION\n",
    );
    let last = write(dir.path(), "c.pyx", SOURCE);
    let engine = engine();

    let err = engine
        .apply_all(&[last.clone(), bad.clone(), first.clone()], false, RunMode::Generate, &mut Vec::new())
        .unwrap_err();

    assert!(err.is_run_fatal());
    match err {
        WeaveError::InFile { path, source } => {
            assert_eq!(path, bad);
            assert!(matches!(*source, WeaveError::UnknownCategory { ref name, line: 1 } if name == "CategoryThree"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(fs::read_to_string(&first).unwrap(), SOURCE);
    assert_eq!(fs::read_to_string(&last).unwrap(), SOURCE);
}

#[test]
fn test_malformed_file_is_skipped_others_proceed() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "a.pyx", SOURCE);
    let malformed_text = "# START INJECTION | tmpl_x CategoryOne\nkeep\n# END INJECTION\n";
    let malformed = write(dir.path(), "b.pyx", malformed_text);
    let engine = engine();

    let report = engine
        .apply_all(&[good.clone(), malformed.clone()], false, RunMode::Generate, &mut Vec::new())
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, malformed);
    assert!(matches!(report.failures[0].1, WeaveError::MalformedDirective { line: 1, .. }));
    assert_eq!(report.rewritten, vec![good.clone()]);
    assert_eq!(fs::read_to_string(&malformed).unwrap(), malformed_text);
    assert!(fs::read_to_string(&good).unwrap().contains("GEN(alpha)"));
}

#[test]
fn test_clean_accepts_malformed_annotations() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.pyx", "# START INJECTION | tmpl_x CategoryOne\nkeep\n# END INJECTION\n");
    let engine = engine();

    clean(&engine, &[path.clone()]);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# START INJECTION | tmpl_x CategoryOne\n# END INJECTION\n"
    );
}

#[test]
fn test_dry_run_matches_real_run_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.pyx", SOURCE);
    let engine = engine();

    let mut preview = Vec::new();
    let report = engine
        .apply_all(&[path.clone()], true, RunMode::Generate, &mut preview)
        .unwrap();
    assert_eq!(report.previewed, vec![path.clone()]);
    assert_eq!(fs::read_to_string(&path).unwrap(), SOURCE);

    generate(&engine, &[path.clone()]);
    let expected = format!("{}\n{}", path.display(), fs::read_to_string(&path).unwrap());
    assert_eq!(String::from_utf8(preview).unwrap(), expected);
}

#[test]
fn test_unterminated_region_keeps_tail() {
    let dir = tempfile::tempdir().unwrap();
    let content = "# START INJECTION | tmpl_x(CategoryTwo)\nold\n# END INJECTION\n# START INJECTION | tmpl_x(CategoryOne)\nkept\n";
    let path = write(dir.path(), "a.pyx", content);
    let engine = engine();

    let report = engine
        .apply_all(&[path.clone()], false, RunMode::Generate, &mut Vec::new())
        .unwrap();

    assert_eq!(report.unterminated, vec![(path.clone(), 4)]);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# START INJECTION | tmpl_x(CategoryTwo)\nGEN(gamma)\n# END INJECTION\n# START INJECTION | tmpl_x(CategoryOne)\nkept\n"
    );
}

#[test]
fn test_crlf_line_endings_survive() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "a.pyx",
        "a\r\n# START INJECTION | tmpl_x(CategoryTwo)\r\nold\r\n# END INJECTION\r\nb",
    );
    let engine = engine();

    generate(&engine, &[path.clone()]);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "a\r\n# START INJECTION | tmpl_x(CategoryTwo)\r\nGEN(gamma)\r\n# END INJECTION\r\nb"
    );
}

#[test]
fn test_check_reports_stale_files() {
    let dir = tempfile::tempdir().unwrap();
    let stale = write(dir.path(), "a.pyx", SOURCE);
    let plain = write(dir.path(), "b.pyx", "nothing here\n");
    let engine = engine();

    let report = engine.check(&[stale.clone(), plain.clone()]).unwrap();
    assert_eq!(report.stale, vec![stale]);
    assert_eq!(report.fresh, vec![plain]);
    assert!(!report.is_clean());
}

#[test]
fn test_first_error_in_file_decides_its_scope() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "a.pyx", SOURCE);
    let mixed_text = "\
# START INJECTION | tmpl_x(
# END INJECTION
# START INJECTION | tmpl_x(CategoryThree)
# END INJECTION
";
    let mixed = write(dir.path(), "b.pyx", mixed_text);
    let engine = engine();

    let report = engine
        .apply_all(&[good.clone(), mixed.clone()], false, RunMode::Generate, &mut Vec::new())
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].1, WeaveError::MalformedDirective { line: 1, .. }));
    assert_eq!(report.rewritten, vec![good]);
    assert_eq!(fs::read_to_string(&mixed).unwrap(), mixed_text);
}
