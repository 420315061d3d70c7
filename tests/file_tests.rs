//! Integration tests for file I/O operations.

use flate2::write::GzEncoder;
use flate2::Compression;
use hclquill::config::Config;
use hclquill::file::loader::{load_hcl_file, load_hcl_from_reader};
use hclquill::file::saver::{save_hcl_file, write_hcl};
use hclquill::hclpath::{get_value, set_value, ValueType};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_edit_save_reload() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "obj {{\n  val = 56\n}}\n").unwrap();

    let mut tree = load_hcl_file(temp_file.path()).unwrap();
    set_value(&mut tree, "obj.val", "57", ValueType::Int).unwrap();
    save_hcl_file(temp_file.path(), &tree, &Config::default()).unwrap();

    assert_eq!(
        fs::read_to_string(temp_file.path()).unwrap(),
        "obj {\n  val = 57\n}\n"
    );

    let reloaded = load_hcl_file(temp_file.path()).unwrap();
    let mut out = Vec::new();
    get_value(&reloaded, "obj.val", &mut out).unwrap();
    assert_eq!(out, b"57\n");
}

#[test]
fn test_gzip_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.nomad.gz");

    let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(b"job \"web\" {\n  count = 1\n}\n").unwrap();
    encoder.finish().unwrap();

    let mut tree = load_hcl_file(&path).unwrap();
    set_value(&mut tree, "job[web].count", "3", ValueType::Int).unwrap();
    save_hcl_file(&path, &tree, &Config::default()).unwrap();

    let reloaded = load_hcl_file(&path).unwrap();
    let mut out = Vec::new();
    get_value(&reloaded, "job[web].count", &mut out).unwrap();
    assert_eq!(out, b"3\n");
}

#[test]
fn test_write_hcl_to_sink() {
    let tree = load_hcl_from_reader("foo   =   true\n".as_bytes()).unwrap();
    let mut out = Vec::new();
    write_hcl(&mut out, &tree, &Config::default()).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "foo = true\n");
}

#[test]
fn test_backup_keeps_previous_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("agent.hcl");
    fs::write(&path, "log_level = \"INFO\"\n").unwrap();

    let mut tree = load_hcl_file(&path).unwrap();
    set_value(&mut tree, "log_level", "DEBUG", ValueType::String).unwrap();
    let config = Config {
        create_backup: true,
        ..Config::default()
    };
    save_hcl_file(&path, &tree, &config).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "log_level = \"DEBUG\"\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("agent.hcl.bak")).unwrap(),
        "log_level = \"INFO\"\n"
    );
}
