use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_osdoc")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// A command running in a scratch directory with its own type dictionary.
fn scratch_cmd(dir: &TempDir) -> assert_cmd::Command {
    let mut c = cmd();
    c.current_dir(dir.path())
        .args(["--types-map", dir.path().join("map.json").to_str().unwrap()]);
    c
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

// -- markdown (default) --

#[test]
fn documents_library_as_markdown() {
    let dir = TempDir::new().unwrap();
    let assert = scratch_cmd(&dir)
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing: Acme.Lib"));
    let output = stdout_of(&assert);

    assert!(output.starts_with("# Acme.Lib\n"));
    assert!(output.contains("* [Работа с файлами](#работа-с-файлами)"));
    assert!(output.contains("КопироватьФайл(source: Строка, overwrite?: Булево)"));
    assert!(output.contains("## Виджет\n"));
    assert!(output.contains("A configurable widget.\n\nWidgets are built by"));
    assert!(output.contains("* **Размер** (Size), _Чтение_: Current size."));
    assert!(output.contains("Построить(): [Виджет](#виджет)"));
    assert!(output.contains("Creates a widget."));
    assert!(output.contains(
        "Заполнить(values: System.Collections.Generic.Dictionary{Строка,Число})"
    ));
    assert!(output.contains("#### По умолчанию"));
    assert!(output.contains("#### По размеру"));
    assert!(output.contains("Новый Виджет(size: Число)"));
    assert!(output.contains("## СтатусВиджета"));
    assert!(output.contains("* **Закрыт** (Closed): The widget is closed."));
}

#[test]
fn unmarked_members_are_not_documented() {
    let dir = TempDir::new().unwrap();
    let assert = scratch_cmd(&dir)
        .arg(fixture_path("lib/Acme.Lib.meta.json"))
        .assert()
        .success();
    let output = stdout_of(&assert);
    assert!(!output.contains("Helper"));
    assert!(!output.contains("Internal"));
    assert!(!output.contains("Hidden"));
}

// -- json --

#[test]
fn json_attaches_comments_by_generic_key() {
    let dir = TempDir::new().unwrap();
    let assert = scratch_cmd(&dir)
        .args(["-f", "json"])
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .success();
    let json: Value = serde_json::from_str(&stdout_of(&assert)).unwrap();

    let nodes = json["libraries"][0]["nodes"].as_array().unwrap();
    let kinds: Vec<&str> = nodes.iter().map(|n| n["kind"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["global-context", "class", "enum"]);

    let widget = &nodes[1];
    assert_eq!(widget["key"], "T:Acme.Lib.Widget");
    let fill = widget["methods"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["identity"]["alias"] == "Fill")
        .unwrap();
    assert_eq!(
        fill["key"],
        "M:Acme.Lib.Widget.Fill(System.Collections.Generic.Dictionary{System.String,System.Int32})"
    );
    assert_eq!(
        fill["comment"]["description"]["content"][0]["text"],
        "Fills the widget from a map."
    );
    assert_eq!(
        fill["params"][0]["type"],
        "System.Collections.Generic.Dictionary{System.String,System.Int32}"
    );

    let size = &widget["properties"][0];
    assert_eq!(size["access"]["readable"], true);
    assert_eq!(size["access"]["writeable"], false);
}

// -- xml and html --

#[test]
fn xml_format_uses_oscript_docs_layout() {
    let dir = TempDir::new().unwrap();
    scratch_cmd(&dir)
        .args(["-f", "xml"])
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .success()
        .stdout(predicate::str::contains("<oscript-docs>"))
        .stdout(predicate::str::contains("<global-context"))
        .stdout(predicate::str::contains("<name>Виджет</name>"))
        .stdout(predicate::str::contains("<category>Работа с файлами</category>"));
}

#[test]
fn html_format_is_standalone_page() {
    let dir = TempDir::new().unwrap();
    scratch_cmd(&dir)
        .args(["--format", "html"])
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<!DOCTYPE html>"))
        .stdout(predicate::str::contains("<title>Acme.Lib</title>"));
}

#[test]
fn unknown_format_fails() {
    let dir = TempDir::new().unwrap();
    scratch_cmd(&dir)
        .args(["-f", "pdf"])
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: pdf"));
}

// -- library-level failures --

#[test]
fn mismatched_comment_file_skips_library() {
    let dir = TempDir::new().unwrap();
    let assert = scratch_cmd(&dir)
        .arg(fixture_path("mismatch/Wrong.Lib.meta.json"))
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "mismatch assembly names. Expected Wrong.Lib, found in XML Other.Lib",
        ));
    let output = stdout_of(&assert);
    assert!(!output.contains("Wrong.Lib"));
    assert!(!output.contains("Штука"));
    assert!(output.contains("# Acme.Lib"));
}

#[test]
fn unresolved_reference_is_reported() {
    let dir = TempDir::new().unwrap();
    scratch_cmd(&dir)
        .arg(fixture_path("unresolved/Needy.dll"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Missing.Dependency"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn missing_library_is_reported() {
    let dir = TempDir::new().unwrap();
    scratch_cmd(&dir)
        .arg(fixture_path("lib/Nope.dll"))
        .assert()
        .success()
        .stderr(predicate::str::contains("failed to load Nope"));
}

#[test]
fn directory_input_skips_libraries_without_xml_doc() {
    let dir = TempDir::new().unwrap();
    scratch_cmd(&dir)
        .arg(fixture_path("lib"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Missing xml-doc"))
        .stderr(predicate::str::contains("ScriptEngine.xml"))
        .stdout(predicate::str::contains("# Acme.Lib"));
}

#[test]
fn quiet_suppresses_logs() {
    let dir = TempDir::new().unwrap();
    scratch_cmd(&dir)
        .arg("-q")
        .arg(fixture_path("lib"))
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn no_libraries_is_an_error() {
    cmd()
        .arg("--no-types-map")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no libraries given"));
}

// -- type dictionary --

#[test]
fn type_map_is_written_once_and_stable() {
    let dir = TempDir::new().unwrap();
    let map = dir.path().join("map.json");

    scratch_cmd(&dir)
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Added 3 types"));
    let first = fs::read_to_string(&map).unwrap();
    let entries: Value = serde_json::from_str(&first).unwrap();
    let widget = entries
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["fullName"] == "Acme.Lib.Widget")
        .unwrap();
    assert_eq!(widget["nameRus"], "Виджет");
    assert_eq!(widget["nameEng"], "Widget");
    assert_eq!(widget["ShortName"], "Widget");

    scratch_cmd(&dir)
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Added").not());
    assert_eq!(fs::read_to_string(&map).unwrap(), first);
}

#[test]
fn no_types_map_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .arg("--no-types-map")
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .success()
        .stdout(predicate::str::contains("[Виджет](#виджет)"));
    assert!(!dir.path().join("map.json").exists());
}

// -- output and project file --

#[test]
fn output_file_is_created_with_parents() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs/api/stdlib.md");
    scratch_cmd(&dir)
        .args(["-o", out.to_str().unwrap()])
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("# Acme.Lib"));
}

#[test]
fn output_directory_gets_default_file_name() {
    let dir = TempDir::new().unwrap();
    scratch_cmd(&dir)
        .args(["-f", "json", "-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .success();
    assert!(dir.path().join("stdlib.json").is_file());
}

#[test]
fn project_file_supplies_defaults() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("osdoc.json");
    let body = serde_json::json!({
        "libraries": [fixture_path("lib/Acme.Lib.dll")],
        "output": "out/stdlib.xml",
        "format": "xml",
        "typesMap": "types.json"
    });
    fs::write(&project, body.to_string()).unwrap();

    cmd()
        .args(["--project", project.to_str().unwrap()])
        .assert()
        .success();
    let written = fs::read_to_string(dir.path().join("out/stdlib.xml")).unwrap();
    assert!(written.contains("<oscript-docs>"));
    assert!(dir.path().join("types.json").is_file());
}

#[test]
fn base_url_prefixes_links() {
    let dir = TempDir::new().unwrap();
    scratch_cmd(&dir)
        .args(["--base-url", "/stdlib"])
        .arg(fixture_path("lib/Acme.Lib.dll"))
        .assert()
        .success()
        .stdout(predicate::str::contains("[Виджет](/stdlib#виджет)"));
}
