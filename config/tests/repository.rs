//! End-to-end tests for materializing configurations into a model
//! repository with relative symlinks.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value, json};
use tempfile::tempdir;

use modelrepo_config::{CONFIG_FILE_NAME, ConfigError, ModelConfig, copy_tree};

fn as_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn sample_config() -> Map<String, Value> {
    as_map(json!({
        "name": "resnet50",
        "platform": "tensorflow_graphdef",
        "max_batch_size": 8,
        "instance_group": [{ "count": 1, "kind": "KIND_GPU" }]
    }))
}

/// Lay out a source model directory: one version directory, a labels
/// file, and the config itself.
fn stage_source_model(root: &Path) -> std::path::PathBuf {
    let source = root.join("model");
    fs::create_dir_all(source.join("1")).unwrap();
    fs::write(source.join("1").join("model.savedmodel"), b"weights").unwrap();
    fs::write(source.join("output0_labels.txt"), b"cat\ndog\n").unwrap();
    fs::write(source.join(CONFIG_FILE_NAME), b"name: \"resnet50\"\n").unwrap();
    source
}

#[test]
fn test_symlinks_go_through_previous_target() {
    let dir = tempdir().unwrap();
    let source = stage_source_model(dir.path());
    let target = dir.path().join("output").join("model_config_1");
    let previous = dir.path().join("output").join("model_config_0");

    let config = ModelConfig::new(sample_config());
    config
        .write_to_repository(&target, &source, Some(&previous))
        .unwrap();

    // Stored link targets route through the previous run's directory,
    // so the whole output tree can be relocated as a unit.
    assert_eq!(
        fs::read_link(target.join("1")).unwrap(),
        Path::new("../model_config_0/1")
    );
    assert_eq!(
        fs::read_link(target.join("output0_labels.txt")).unwrap(),
        Path::new("../model_config_0/output0_labels.txt")
    );
}

#[test]
fn test_symlinks_resolve_relative_to_source_on_first_run() {
    let dir = tempdir().unwrap();
    let source = stage_source_model(dir.path());
    let target = dir.path().join("output").join("model_config_0");

    let config = ModelConfig::new(sample_config());
    config.write_to_repository(&target, &source, None).unwrap();

    let link = fs::read_link(target.join("1")).unwrap();
    assert!(link.is_relative(), "stored target must be relative: {link:?}");
    // The link must actually reach the source artifacts.
    let staged = fs::read(target.join("1").join("model.savedmodel")).unwrap();
    assert_eq!(staged, b"weights");
}

#[test]
fn test_written_config_reloads_equal() {
    let dir = tempdir().unwrap();
    let source = stage_source_model(dir.path());
    let target = dir.path().join("output").join("model_config_0");

    let config = ModelConfig::new(sample_config());
    config.write_to_repository(&target, &source, None).unwrap();

    let reloaded = ModelConfig::from_model_directory(&target).unwrap();
    assert_eq!(reloaded.get_config(), config.get_config());
}

#[test]
fn test_non_version_directories_are_copied() {
    let dir = tempdir().unwrap();
    let source = stage_source_model(dir.path());
    fs::create_dir_all(source.join("custom_ops")).unwrap();
    fs::write(source.join("custom_ops").join("op.so"), b"\x7fELF").unwrap();
    let target = dir.path().join("output").join("model_config_0");

    let config = ModelConfig::new(sample_config());
    config.write_to_repository(&target, &source, None).unwrap();

    let staged = target.join("custom_ops");
    assert!(!staged.is_symlink());
    assert!(staged.is_dir());
    assert_eq!(fs::read(staged.join("op.so")).unwrap(), b"\x7fELF");
}

#[test]
fn test_config_file_itself_is_not_linked() {
    let dir = tempdir().unwrap();
    let source = stage_source_model(dir.path());
    let target = dir.path().join("output").join("model_config_0");

    let config = ModelConfig::new(sample_config());
    config.write_to_repository(&target, &source, None).unwrap();

    // The written config is a regular file carrying this record's
    // mapping, not a link back to the source's config.
    let written = target.join(CONFIG_FILE_NAME);
    assert!(!written.is_symlink());
    let reloaded = ModelConfig::from_model_directory(&target).unwrap();
    assert_eq!(reloaded.get_config()["max_batch_size"], 8);
}

#[test]
fn test_from_model_directory_missing_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("no_such_model");
    let err = ModelConfig::from_model_directory(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::MissingModelPath(_)));
}

#[test]
fn test_from_model_directory_rejects_plain_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("model");
    fs::write(&file, b"not a directory").unwrap();
    let err = ModelConfig::from_model_directory(&file).unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory(_)));
}

#[test]
fn test_copy_tree_recurses() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("a").join("b")).unwrap();
    fs::write(src.join("a").join("b").join("leaf.txt"), b"leaf").unwrap();

    let dst = dir.path().join("dst");
    copy_tree(&src, &dst).unwrap();
    assert_eq!(
        fs::read(dst.join("a").join("b").join("leaf.txt")).unwrap(),
        b"leaf"
    );
}
