use lq_domain::config::{Config, ConfigSeverity};

/// Print every validation issue. Returns false when any is an error.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();
    if issues.is_empty() {
        println!("{config_path}: no issues");
        return true;
    }

    let (errors, warnings): (Vec<_>, Vec<_>) = issues
        .iter()
        .partition(|i| i.severity == ConfigSeverity::Error);

    for issue in errors.iter().chain(warnings.iter()) {
        println!("{issue}");
    }
    println!(
        "\n{config_path}: {} error(s), {} warning(s)",
        errors.len(),
        warnings.len()
    );

    errors.is_empty()
}

/// Render the resolved config, defaults filled in, as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| anyhow::anyhow!("serializing config: {e}"))?;
    print!("{rendered}");
    Ok(())
}
