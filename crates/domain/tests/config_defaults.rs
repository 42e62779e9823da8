use lq_domain::config::Config;

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn empty_file_yields_full_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.server.context_route, "/context");
    assert_eq!(config.budget.soft_max_chars, 100_000);
    assert_eq!(config.inference.max_attempts, 3);
    assert!(config.snapshot.refresh_interval_secs.is_none());
}

#[test]
fn sections_parse_independently() {
    let toml_str = r#"
[discovery]
known_endpoints = ["192.168.1.40"]
probe_model = "qwen2.5:0.5b"

[inference]
primary_model = "llama3.1:8b"
alternate_models = ["llama3.2:1b"]

[budget]
soft_max_chars = 50000

[stub]
enabled = false
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.discovery.known_endpoints, vec!["192.168.1.40".to_string()]);
    assert_eq!(config.discovery.probe_model, "qwen2.5:0.5b");
    assert_eq!(config.inference.primary_model, "llama3.1:8b");
    assert_eq!(config.inference.alternate_models.len(), 1);
    assert_eq!(config.budget.soft_max_chars, 50_000);
    assert_eq!(config.budget.hard_max_chars, 4_000_000);
    assert!(!config.stub.enabled);
}

#[test]
fn loopback_only_discovery_warns() {
    let toml_str = r#"
[discovery]
scan_interfaces = false
include_private_guesses = false
alternate_hosts = []
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(config
        .validate()
        .iter()
        .any(|issue| issue.field == "discovery"));
}
