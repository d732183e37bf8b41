use super::*;

#[test]
fn defaults_match_the_published_contract() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert!(settings.server.public_url.is_none());
    assert_eq!(settings.cache.max_age_seconds.get(), 3600);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.max_entries.get(), 64);
    assert_eq!(settings.feed.source_name, "RottenTomatoes");
    assert!(!settings.feed.stamp_fetch_time);
    assert!(settings.upstream.timeout.is_none());
    assert_eq!(
        settings.upstream.movies_url.as_str(),
        DEFAULT_MOVIES_URL
    );
    assert_eq!(
        settings.upstream.shows_url.as_str(),
        DEFAULT_SHOWS_URL
    );
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.cache.max_age_seconds = Some(60);

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        cache_max_age_seconds: Some(120),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.cache.max_age_seconds.get(), 120);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_cache_lifetime_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.max_age_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero max age");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.max_age_seconds",
            ..
        }
    ));
}

#[test]
fn zero_upstream_timeout_is_rejected() {
    let mut raw = RawSettings::default();
    raw.upstream.timeout_seconds = Some(0);

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn upstream_urls_must_be_http() {
    let mut raw = RawSettings::default();
    raw.upstream.movies_url = Some("ftp://example.com/list".to_string());

    let err = Settings::from_raw(raw).expect_err("ftp scheme");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "upstream.movies_url",
            ..
        }
    ));
}

#[test]
fn blank_public_url_means_derive_from_request() {
    let mut raw = RawSettings::default();
    raw.server.public_url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.server.public_url.is_none());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["hotfeed"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "hotfeed",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--public-url",
        "https://feeds.example.com",
        "--cache-enabled",
        "false",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.public_url.as_deref(),
                Some("https://feeds.example.com")
            );
            assert_eq!(serve.overrides.cache_enabled, Some(false));
        }
    }
}
