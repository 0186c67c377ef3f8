use clap::Parser;
use shop_journey::cli::commands::{cmd_personas, format_personas};
use shop_journey::cli::config::{
    Cli, Commands, DEFAULT_BASE_URL, JourneyConfig, ReportFormat, apply_overrides, load_config,
    log_directive, normalize_base_url,
};
use shop_journey::flow::tolerance::{ExpectedDeviation, ToleranceTable};
use shop_journey::model::persona::Persona;

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn parses_run_with_global_flags() {
    let cli = Cli::try_parse_from([
        "shop-journey",
        "-vv",
        "--base-url",
        "http://localhost:3000",
        "run",
        "--scenario",
        "scenarios/",
        "--format",
        "json",
        "--parallel",
        "4",
    ])
    .unwrap();

    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.base_url.as_deref(), Some("http://localhost:3000"));
    match cli.command {
        Commands::Run {
            scenario,
            format,
            output,
            parallel,
        } => {
            assert_eq!(scenario, "scenarios/");
            assert_eq!(format, Some(ReportFormat::Json));
            assert_eq!(output, None);
            assert_eq!(parallel, Some(4));
        }
        other => panic!("expected run, got {:?}", other),
    }
}

#[test]
fn run_requires_a_scenario() {
    assert!(Cli::try_parse_from(["shop-journey", "run"]).is_err());
}

#[test]
fn parses_personas_and_log_json() {
    let cli = Cli::try_parse_from(["shop-journey", "personas", "--log-json"]).unwrap();
    assert!(cli.log_json);
    assert!(matches!(cli.command, Commands::Personas));
}

#[test]
fn verbosity_maps_to_log_level() {
    assert_eq!(log_directive(0), "warn");
    assert_eq!(log_directive(1), "info");
    assert_eq!(log_directive(2), "debug");
    assert_eq!(log_directive(9), "trace");
}

// ============================================================================
// Config file
// ============================================================================

#[test]
fn missing_config_gives_defaults() {
    let config = load_config(Some("does/not/exist.yaml"));
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.timeouts.short_ms, 5_000);
    assert_eq!(config.timeouts.long_ms, 12_000);
    assert_eq!(config.timeouts.poll_ms, 100);
    assert_eq!(config.report.format, ReportFormat::Console);
    assert_eq!(config.parallel, 1);
}

#[test]
fn partial_config_keeps_other_defaults() {
    let yaml = r#"
base_url: http://localhost:8080/
timeouts:
  long_ms: 20000
browser:
  node_binary: /usr/bin/node
report:
  format: json
"#;
    let config: JourneyConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.base_url, "http://localhost:8080/");
    assert_eq!(config.timeouts.long_ms, 20_000);
    assert_eq!(config.timeouts.short_ms, 5_000);
    assert_eq!(config.browser.node_binary, "/usr/bin/node");
    assert!(config.browser.server_script.ends_with("server.js"));
    assert_eq!(config.report.format, ReportFormat::Json);
}

#[test]
fn malformed_config_falls_back_to_defaults() {
    let path = std::env::temp_dir().join(format!("shop-journey-bad-{}.yaml", std::process::id()));
    std::fs::write(&path, "timeouts: [not, a, map").unwrap();
    let config = load_config(path.to_str());
    assert_eq!(config.timeouts.short_ms, 5_000);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn cli_base_url_overrides_file_and_gains_trailing_slash() {
    let cli = Cli::try_parse_from([
        "shop-journey",
        "--base-url",
        "http://localhost:3000",
        "personas",
    ])
    .unwrap();
    let config = apply_overrides(JourneyConfig::default(), &cli);
    assert_eq!(config.base_url, "http://localhost:3000/");
    assert_eq!(normalize_base_url("http://x/"), "http://x/");
}

// ============================================================================
// personas
// ============================================================================

#[test]
fn personas_lists_every_persona() {
    let out = cmd_personas();
    for persona in Persona::ALL {
        assert!(out.contains(persona.username()), "missing {}", persona);
    }
    assert!(out.contains("login in (2000ms, 7000ms]"));
    let locked = out.lines().find(|l| l.starts_with("locked_out_user")).unwrap();
    assert!(locked.contains("Sorry, this user has been locked out."));
}

#[test]
fn personas_reflects_table_extensions() {
    let table =
        ToleranceTable::storefront().with(Persona::Visual, ExpectedDeviation::IdenticalImages);
    let out = format_personas(&table);
    let visual = out.lines().find(|l| l.starts_with("visual_user")).unwrap();
    assert!(visual.contains("all catalog images identical"));
}
