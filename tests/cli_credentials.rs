//! Malformed credentials are a defined, fatal, descriptive error.

mod common;

use common::env::TestEnv;
use std::fs;

#[test]
fn test_malformed_credentials_line_is_rejected_with_location() {
    let env = TestEnv::new();
    fs::write(
        env.path("lempkit.env"),
        "DB_ROOT_PASSWORD=r\njunk without equals\n",
    )
    .unwrap();

    let result = env.run(&["render"]);

    assert!(!result.success);
    assert_eq!(result.exit_code, 1);
    let output = result.combined_output();
    assert!(
        output.contains("lempkit.env:2") && output.contains("junk without equals"),
        "error should name the file, line, and content; got:\n{output}"
    );
}

#[test]
fn test_missing_credential_key_is_rejected_by_name() {
    let env = TestEnv::new();
    fs::write(
        env.path("lempkit.env"),
        "DB_ROOT_PASSWORD=r\nDB_DATABASE=d\nDB_USERNAME=u\n",
    )
    .unwrap();

    let result = env.run(&["render"]);

    assert!(!result.success);
    assert!(
        result.combined_output().contains("DB_PASSWORD"),
        "error should name the missing key; got:\n{}",
        result.combined_output()
    );
}

#[test]
fn test_comments_and_extra_keys_are_tolerated() {
    let env = TestEnv::new();
    fs::write(
        env.path("lempkit.env"),
        "# generated by hand\nDB_ROOT_PASSWORD=r\nDB_DATABASE=d\nDB_USERNAME=u\nDB_PASSWORD=p\nDB_PORT=3306\n",
    )
    .unwrap();

    let result = env.run(&["render"]);

    assert!(result.success, "{}", result.combined_output());
}
