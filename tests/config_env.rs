//! Configuration precedence: defaults, then environment overrides

use mitm_analyser::config::AppConfig;
use serial_test::serial;

fn clear_mitm_env() {
    for key in [
        "MITM_BROWSER_FILE",
        "MITM_MITM_FILE",
        "MITM_BAD_HEADER_FILE",
        "MITM_LOADER_URL",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_apply_without_config() {
    clear_mitm_env();
    let config = AppConfig::load().unwrap();
    assert_eq!(config.fingerprints.browser_file, "fingerprints/browser.sig");
    assert_eq!(config.fingerprints.mitm_file, "fingerprints/mitm.sig");
    assert_eq!(config.fingerprints.bad_header_file, "fingerprints/badheader.sig");
    assert_eq!(config.loader.base_url, None);
    assert!(config.build_loader().unwrap().is_none());
}

#[test]
#[serial]
fn test_environment_overrides_defaults() {
    clear_mitm_env();
    std::env::set_var("MITM_BROWSER_FILE", "/srv/sigs/browser.sig");
    std::env::set_var("MITM_LOADER_URL", "https://sigs.example.test/corpus");

    let config = AppConfig::load().unwrap();
    assert_eq!(config.fingerprints.browser_file, "/srv/sigs/browser.sig");
    assert_eq!(
        config.loader.base_url.as_deref(),
        Some("https://sigs.example.test/corpus")
    );
    assert!(config.build_loader().unwrap().is_some());

    clear_mitm_env();
}
