use glossy_travel::config::{AppConfig, LogFormat};
use serial_test::serial;
use std::env;
use std::io::Write;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    // SAFETY: env-touching tests run under #[serial].
    unsafe {
        for name in [
            "GLOSSY_SERVER__PORT",
            "GLOSSY_GENAI__VOICE",
            "GLOSSY_LOGGING__FORMAT",
            "CONFIG_FILE",
            "PORT",
            "HOST",
            "STATIC_DIR",
            "LOG_FORMAT",
            "GEMINI_CHAT_MODEL",
            "GEMINI_API_KEY",
            "API_KEY",
        ] {
            env::remove_var(name);
        }
    }
}

fn yaml_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["glossy-travel"]).expect("defaults load");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.static_dir, "static");
    assert_eq!(config.genai.chat_model, "gemini-2.5-flash");
    assert_eq!(config.genai.voice, "Kore");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.genai.api_key.is_none());
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    // SAFETY: env-touching tests run under #[serial].
    unsafe {
        env::set_var("GLOSSY_SERVER__PORT", "9090");
        env::set_var("GLOSSY_GENAI__VOICE", "Puck");
        env::set_var("GLOSSY_LOGGING__FORMAT", "json");
    }

    let config = AppConfig::load_from_args(["glossy-travel"]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.genai.voice, "Puck");
    assert_eq!(config.logging.format, LogFormat::Json);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let file = yaml_file(
        r#"
server:
  port: 7070
genai:
  image_model: custom-image
"#,
    );
    let path = file.path().to_str().expect("utf-8 temp path");

    let config = AppConfig::load_from_args(["glossy-travel", "--config", path])
        .expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.genai.image_model, "custom-image");
    // Untouched keys keep their defaults.
    assert_eq!(config.genai.speech_model, "gemini-2.5-flash-preview-tts");
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["glossy-travel", "--config", "/nonexistent/glossy.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_api_key_fallback() {
    clear_env_vars();
    // SAFETY: env-touching tests run under #[serial].
    unsafe {
        env::set_var("API_KEY", "from-api-key");
    }
    let config = AppConfig::load_from_args(["glossy-travel"]).expect("config");
    assert_eq!(config.genai.api_key.as_deref(), Some("from-api-key"));

    // SAFETY: env-touching tests run under #[serial].
    unsafe {
        env::set_var("GEMINI_API_KEY", "from-gemini");
    }
    let config = AppConfig::load_from_args(["glossy-travel"]).expect("config");
    assert_eq!(config.genai.api_key.as_deref(), Some("from-gemini"));
    assert!(!format!("{:?}", config.genai).contains("from-gemini"));

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_takes_precedence() {
    clear_env_vars();
    // SAFETY: env-touching tests run under #[serial].
    unsafe {
        env::set_var("GLOSSY_SERVER__PORT", "9090");
    }
    let file = yaml_file("server:\n  port: 7070\n");
    let path = file.path().to_str().expect("utf-8 temp path");

    let config = AppConfig::load_from_args([
        "glossy-travel",
        "--config",
        path,
        "--port",
        "8181",
        "--chat-model",
        "gemini-2.5-pro",
        "--log-format",
        "json",
    ])
    .expect("config");
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.genai.chat_model, "gemini-2.5-pro");
    assert_eq!(config.logging.format, LogFormat::Json);

    clear_env_vars();
}
