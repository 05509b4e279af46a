use super::Config;

#[test]
fn test_empty_config_uses_defaults() {
    let config = Config::from_toml("");

    assert_eq!(config.file_extensions, vec!["patch".to_string()]);
    assert_eq!(config.columns, 3);
}

#[test]
fn test_config_overrides() {
    let config = Config::from_toml("file_extensions = [\"patch\", \"txt\"]\ncolumns = 2\n");

    assert_eq!(
        config.file_extensions,
        vec!["patch".to_string(), "txt".to_string()]
    );
    assert_eq!(config.columns, 2);
}

#[test]
fn test_malformed_config_falls_back() {
    let config = Config::from_toml("columns = \"many\"");

    assert_eq!(config.columns, 3);
}
