use std::path::PathBuf;

use tempfile::tempdir;

use super::{InputFormat, load_file, parse_documents};
use crate::error::InputError;
use crate::template::{Source, Value};

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: std::future::Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

#[test]
fn format_follows_extension() -> Result<(), String> {
    let cases = [
        ("a.json", InputFormat::Json),
        ("a.JSONL", InputFormat::JsonLines),
        ("a.yaml", InputFormat::Yaml),
        ("dir/a.yml", InputFormat::Yaml),
    ];
    for (path, expected) in cases {
        let format = InputFormat::from_path(&PathBuf::from(path)).map_err(|err| err.to_string())?;
        if format != expected {
            return Err(format!("{}: got {:?}", path, format));
        }
    }
    match InputFormat::from_path(&PathBuf::from("a.txt")) {
        Err(InputError::UnsupportedFormat { extension }) if extension == "txt" => Ok(()),
        other => Err(format!("Expected unsupported format, got {:?}", other)),
    }
}

#[test]
fn json_document_applies_defaults() -> Result<(), String> {
    let source = Source::File(PathBuf::from("/tmp/req.json"));
    let templates = parse_documents(r#"{"query": {"a": 1}}"#, InputFormat::Json, &source)
        .map_err(|err| err.to_string())?;
    let template = templates.first().ok_or("Expected one template")?;
    if template.method != "GET" || template.path != Value::from("") {
        return Err(format!("Unexpected defaults: {:?}", template));
    }
    if template.source != source {
        return Err("Source was not attached".to_owned());
    }
    Ok(())
}

#[test]
fn yaml_documents_become_separate_templates() -> Result<(), String> {
    let data = "method: GET\npath: /a\n---\nmethod: POST\npath: !concat ['/b', '/c']\n---\n";
    let templates = parse_documents(data, InputFormat::Yaml, &Source::Stdin)
        .map_err(|err| err.to_string())?;
    if templates.len() != 2 {
        return Err(format!("Expected 2 templates, got {}", templates.len()));
    }
    let second = templates.get(1).ok_or("Missing second template")?;
    let expected: Value = serde_json::from_str(r#"{"!concat": ["/b", "/c"]}"#)
        .map_err(|err| err.to_string())?;
    if second.method != "POST" || second.path != expected {
        return Err(format!("Unexpected second template: {:?}", second));
    }
    Ok(())
}

#[test]
fn malformed_yaml_document_fails_file() -> Result<(), String> {
    let data = "path: /a\n---\npath: [unclosed\n";
    match parse_documents(data, InputFormat::Yaml, &Source::Stdin) {
        Err(InputError::ParseYaml { .. }) => {}
        other => return Err(format!("Expected YAML error, got {:?}", other)),
    }
    match parse_documents("", InputFormat::Yaml, &Source::Stdin) {
        Err(InputError::EmptyYaml) => Ok(()),
        other => Err(format!("Expected empty YAML error, got {:?}", other)),
    }
}

#[test]
fn json_lines_build_dictionary_columns() -> Result<(), String> {
    let data = r#"
# requests
{"method": "POST", "path": "/a", "user": "amy"}
not json
// another comment
{"path": "/b"}
{"path": "/c", "user": "cal"}
"#;
    let templates = parse_documents(data, InputFormat::JsonLines, &Source::Stdin)
        .map_err(|err| err.to_string())?;
    let template = templates.first().ok_or("Expected one template")?;
    if template.method != "POST" || template.path != Value::from("/a") {
        return Err(format!("Unexpected base: {:?}", template));
    }
    let column = |name: &str| template.dictionary.get(name).cloned();
    let expected_paths: Value = serde_json::from_str(r#"["/a", "/b", "/c"]"#)
        .map_err(|err| err.to_string())?;
    let expected_users: Value = serde_json::from_str(r#"["amy", null, "cal"]"#)
        .map_err(|err| err.to_string())?;
    let expected_methods: Value = serde_json::from_str(r#"["POST", null, null]"#)
        .map_err(|err| err.to_string())?;
    if column("path") != Some(expected_paths) {
        return Err(format!("Unexpected path column: {:?}", column("path")));
    }
    if column("user") != Some(expected_users) {
        return Err(format!("Unexpected user column: {:?}", column("user")));
    }
    if column("method") != Some(expected_methods) {
        return Err(format!("Unexpected method column: {:?}", column("method")));
    }
    Ok(())
}

#[test]
fn json_lines_without_objects_fail() -> Result<(), String> {
    match parse_documents("# only\n\n[1, 2]\n", InputFormat::JsonLines, &Source::Stdin) {
        Err(InputError::EmptyJsonLines) => Ok(()),
        other => Err(format!("Expected EmptyJsonLines, got {:?}", other)),
    }
}

#[test]
fn stdin_detection() -> Result<(), String> {
    let cases = [
        (r#"{"path": "/a"}"#, InputFormat::Json),
        ("{\n  \"path\": \"/a\"\n}\n", InputFormat::Json),
        ("{\"path\": \"/a\"}\n{\"path\": \"/b\"}\n", InputFormat::JsonLines),
        ("# c\n{\"path\": \"/a\"}\n", InputFormat::JsonLines),
        ("method: GET\npath: /a\n", InputFormat::Yaml),
        ("{{{", InputFormat::Json),
    ];
    for (data, expected) in cases {
        let detected = InputFormat::detect(data);
        if detected != expected {
            return Err(format!("{:?}: detected {:?}", data, detected));
        }
    }
    Ok(())
}

#[test]
fn load_file_tags_source() -> Result<(), String> {
    run_async_test(async {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let path = dir.path().join("req.yaml");
        tokio::fs::write(&path, "path: /x\n")
            .await
            .map_err(|err| format!("write failed: {}", err))?;
        let templates = load_file(&path).await.map_err(|err| err.to_string())?;
        let template = templates.first().ok_or("Expected one template")?;
        if template.source.path() != Some(path.as_path()) {
            return Err(format!("Unexpected source: {:?}", template.source));
        }
        match load_file(&dir.path().join("missing.json")).await {
            Err(InputError::Read { .. }) => Ok(()),
            other => Err(format!("Expected read error, got {:?}", other)),
        }
    })
}
