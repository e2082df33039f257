use fileref_check::{placeholders, JsonCheck, Report, Resolver, ResolveError, Settings};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn home_with_config(config: &str) -> (TempDir, std::path::PathBuf) {
    let home = TempDir::new().unwrap();
    let cfg = home.path().join(".config/opencode/opencode.json");
    fs::create_dir_all(cfg.parent().unwrap()).unwrap();
    fs::write(&cfg, config).unwrap();
    (home, cfg)
}

#[test]
fn multiline_file_becomes_escaped_json_string() {
    let (home, cfg) = home_with_config(r#"{"key": "{file:~/.foo}"}"#);
    fs::write(home.path().join(".foo"), "line1\nline2").unwrap();
    let settings = Settings { home: Some(home.path().display().to_string()), ..Default::default() };
    let home_dir = settings.home_dir(None);
    assert_eq!(settings.document_path(&home_dir), cfg);

    let report = Report::load(&cfg, &settings.resolver(&home_dir), settings.context_radius(), None).unwrap();
    assert_eq!(report.resolved_text, r#"{"key": "line1\nline2"}"#);
    assert_eq!(report.original, JsonCheck::Valid);
    assert_eq!(report.resolved, JsonCheck::Valid);
    assert!(report.unresolved.is_empty());
    assert!(report.is_clean());

    let value: serde_json::Value = serde_json::from_str(&report.resolved_text).unwrap();
    assert_eq!(value["key"], "line1\nline2");
}

#[test]
fn prompt_file_with_quotes_and_nested_reference_round_trips() {
    let (home, cfg) = home_with_config(r#"{"agent": {"prompt": "{file:~/prompts/main.md}"}}"#);
    fs::create_dir_all(home.path().join("prompts")).unwrap();
    fs::write(home.path().join("prompts/main.md"), "Be \"terse\".\n\t{file:~/prompts/footer.md}\n").unwrap();
    fs::write(home.path().join("prompts/footer.md"), "C:\\tmp").unwrap();
    let resolver = Resolver::new(home.path().display().to_string());

    let report = Report::load(&cfg, &resolver, 50, None).unwrap();
    assert!(report.resolved.is_valid(), "{report}");
    let value: serde_json::Value = serde_json::from_str(&report.resolved_text).unwrap();
    // inner content was escaped once by its own level, so one layer of escaping survives parsing
    assert_eq!(value["agent"]["prompt"], "Be \"terse\".\n\tC:\\\\tmp\n");
}

#[test]
fn missing_reference_is_reported_not_fatal() {
    let (_home, cfg) = home_with_config(r#"{"a": "{file:/missing/path}"}"#);
    let report = Report::load(&cfg, &Resolver::new("/unused"), 50, None).unwrap();
    assert_eq!(report.resolved_text, r#"{"a": "{file:/missing/path}"}"#);
    assert!(report.resolved.is_valid());
    assert_eq!(report.unresolved, placeholders(&report.resolved_text));
    assert!(report.to_string().contains("Unresolved references: 1"));
}

#[test]
fn reference_outside_string_breaks_json_and_is_located() {
    let (home, cfg) = home_with_config("{\"n\": {file:~/n.txt}}");
    fs::write(home.path().join("n.txt"), "oops").unwrap();
    let report = Report::load(&cfg, &Resolver::new(home.path().display().to_string()), 5, None).unwrap();
    assert!(!report.original.is_valid());
    assert_eq!(report.resolved_text, "{\"n\": oops}");
    let JsonCheck::Invalid(e) = &report.resolved else { panic!("expected invalid resolved json: {report}") };
    assert_eq!(e.offset, 6);
    assert_eq!(e.context, "\"n\": oops}");
}

#[test]
fn missing_top_level_document_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = Report::load(&dir.path().join("nope.json"), &Resolver::new("/unused"), 50, None).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn unreadable_reference_aborts_the_pass() {
    let (home, cfg) = home_with_config(r#"{"a": "{file:~/adir}"}"#);
    fs::create_dir(home.path().join("adir")).unwrap();
    let err = Report::load(&cfg, &Resolver::new(home.path().display().to_string()), 50, None).unwrap_err();
    assert!(err.chain().any(|c| matches!(c.downcast_ref::<ResolveError>(), Some(ResolveError::Read { .. }))));
}
