// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration loading as the CLI performs it: file first, flags last.

use std::io::Write;

use omics_wes::commands::load_config;
use omics_wes_core::domain::config::{BackendKind, ConfigOverrides};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn test_flags_override_file_values() {
    let file = write_config(
        "role_arn: arn:aws:iam::1:role/file\noutput_uri: s3://file-bucket/out\nport: 8081\n",
    );

    let config = load_config(
        Some(file.path().to_path_buf()),
        ConfigOverrides {
            port: Some(9090),
            backend: Some(BackendKind::InMemory),
            ..ConfigOverrides::default()
        },
    )
    .expect("config loads");

    assert_eq!(config.port, 9090);
    assert_eq!(config.backend, BackendKind::InMemory);
    assert_eq!(config.output_uri, "s3://file-bucket/out");
    assert!(config.validate().is_ok());
}

#[test]
fn test_data_locations_json_is_accepted() {
    let file = write_config(
        r#"{"output_bucket_uri": "s3://results/", "source_uris": ["s3://reads/2024/"]}"#,
    );

    let config = load_config(Some(file.path().to_path_buf()), ConfigOverrides::default())
        .expect("config loads");

    assert_eq!(config.output_uri, "s3://results/");
    assert_eq!(config.source_uris, vec!["s3://reads/2024/".to_string()]);
}

#[test]
fn test_unreadable_config_path_fails() {
    let result = load_config(
        Some("/nonexistent/omics-wes.yaml".into()),
        ConfigOverrides::default(),
    );
    assert!(result.is_err());
}
