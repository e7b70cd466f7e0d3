use clap::Parser;
use serde_json::Value;
use shield_oauth_cli::cli::Args;
use shield_identity_oauth2::IdentityError;
use shield_oauth_cli::error::ToolError;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(dir: &Path, provider_base: &str) -> PathBuf {
    let config_path = dir.join("shield-oauth.toml");
    let contents = format!(
        r#"
[oauth]
application_name = "CliTest"
base_url = "https://app.example.com"

[oauth.providers.github]
client_id = "cli_client_id"
client_secret = "cli_secret"
authorization_endpoint = "{base}/login/oauth/authorize"
token_endpoint = "{base}/login/oauth/access_token"
userinfo_endpoint = "{base}/user"
email_list_endpoint = "{base}/user/emails"

[oauth.users_columns_name]
first_name = "firstName"
last_name = "lastName"
avatar = "avatarUrl"
"#,
        base = provider_base
    );
    std::fs::write(&config_path, contents).unwrap();
    config_path
}

fn config_with(provider_base: &str) -> (TempDir, String) {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), provider_base);
    let path = path.to_str().unwrap().to_string();
    (dir, path)
}

async fn mount_github(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(header("User-Agent", "CliTest/1.0"))
        .and(body_string_contains("code=cli_code"))
        .and(body_string_contains(
            "redirect_uri=https%3A%2F%2Fapp.example.com%2Foauth%2Fcallback",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "access_token": "cli_token" })),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("Authorization", "Bearer cli_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "login": "octocat",
            "email": null,
            "name": "The Octocat",
            "avatar_url": "https://avatars.example.com/octocat.png"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "email": "old@example.com", "primary": false, "verified": true },
            { "email": "octocat@example.com", "primary": true, "verified": true }
        ])))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_link_with_explicit_state() {
    let (_dir, config) = config_with("https://github.example.com");

    let args = Args::try_parse_from([
        "shield-oauth",
        "--config",
        config.as_str(),
        "link",
        "--provider",
        "github",
        "--state",
        "xyz",
    ])
    .unwrap();
    let output = args.run().await.unwrap();
    let output: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(output["provider"], "github");
    assert_eq!(output["state"], "xyz");

    let url = output["url"].as_str().unwrap();
    assert!(url.starts_with("https://github.example.com/login/oauth/authorize?"));
    assert!(url.contains("client_id=cli_client_id"));
    assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Foauth%2Fcallback"));
    assert!(url.contains("response_type=code"));
    assert!(url.ends_with("state=xyz"));
    assert!(!url.contains("cli_secret"));
}

#[tokio::test]
async fn test_link_generates_state() {
    let (_dir, config) = config_with("https://github.example.com");

    let args =
        Args::try_parse_from(["shield-oauth", "-c", config.as_str(), "link", "-p", "github"]).unwrap();
    let output: Value = serde_json::from_str(&args.run().await.unwrap()).unwrap();

    let state = output["state"].as_str().unwrap();
    assert!(uuid_like(state), "expected a UUID state, got {}", state);
    assert!(output["url"].as_str().unwrap().contains(state));
}

fn uuid_like(value: &str) -> bool {
    value.len() == 36 && value.chars().filter(|c| *c == '-').count() == 4
}

#[tokio::test]
async fn test_complete_new_user() {
    let server = MockServer::start().await;
    mount_github(&server).await;
    let (_dir, config) = config_with(&server.uri());

    let args = Args::try_parse_from([
        "shield-oauth",
        "--config",
        config.as_str(),
        "complete",
        "--provider",
        "github",
        "--code",
        "cli_code",
    ])
    .unwrap();
    let output: Value = serde_json::from_str(&args.run().await.unwrap()).unwrap();

    let identity = &output["identity"];
    assert_eq!(identity["provider_id"], "github");
    assert_eq!(identity["login_handle"], "octocat");
    assert_eq!(identity["email"], "octocat@example.com");

    let fields = &output["fields"];
    assert_eq!(fields["username"], "octocat");
    assert_eq!(fields["email"], "octocat@example.com");
    assert_eq!(fields["active"], true);
    assert_eq!(fields["firstName"], "The Octocat");
    assert_eq!(fields["lastName"], "The Octocat");
    assert_eq!(fields["avatarUrl"], "https://avatars.example.com/octocat.png");
    assert_eq!(fields["password"], "********");
}

#[tokio::test]
async fn test_complete_syncing_user_info() {
    let server = MockServer::start().await;
    mount_github(&server).await;
    let (_dir, config) = config_with(&server.uri());

    let args = Args::try_parse_from([
        "shield-oauth",
        "--config",
        config.as_str(),
        "complete",
        "--provider",
        "github",
        "--code",
        "cli_code",
        "--mode",
        "syncingUserInfo",
    ])
    .unwrap();
    let output: Value = serde_json::from_str(&args.run().await.unwrap()).unwrap();

    let fields = output["fields"].as_object().unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields["firstName"], "The Octocat");
    assert!(!fields.contains_key("email"));
    assert!(!fields.contains_key("password"));
}

#[tokio::test]
async fn test_complete_unknown_mode_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (_dir, config) = config_with(&server.uri());

    let args = Args::try_parse_from([
        "shield-oauth",
        "--config",
        config.as_str(),
        "complete",
        "--provider",
        "github",
        "--code",
        "cli_code",
        "--mode",
        "deleteUser",
    ])
    .unwrap();

    let err = args.run().await.unwrap_err();
    assert!(matches!(err, ToolError::UnknownMode(mode) if mode == "deleteUser"));
}

#[tokio::test]
async fn test_unconfigured_provider() {
    let (_dir, config) = config_with("https://github.example.com");

    let args =
        Args::try_parse_from(["shield-oauth", "-c", config.as_str(), "link", "-p", "google"]).unwrap();

    let err = args.run().await.unwrap_err();
    assert!(matches!(err, ToolError::Identity(_)));
    assert!(err.to_string().contains("google"));
}

#[tokio::test]
async fn test_providers_listing() {
    let (_dir, config) = config_with("https://github.example.com");

    let args = Args::try_parse_from(["shield-oauth", "-c", config.as_str(), "providers"]).unwrap();
    assert_eq!(args.run().await.unwrap(), "github");
}

#[tokio::test]
async fn test_invalid_config_reports_configuration_error() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("broken.toml");
    std::fs::write(
        &config_path,
        r#"
[oauth]
base_url = "https://app.example.com"

[oauth.providers.github]
client_id = "id"
client_secret = ""
"#,
    )
    .unwrap();

    let args = Args::try_parse_from([
        "shield-oauth",
        "--config",
        config_path.to_str().unwrap(),
        "providers",
    ])
    .unwrap();

    let err = args.run().await.unwrap_err();
    assert!(matches!(err, ToolError::Configuration(_)));
    assert!(!err.to_string().contains("cli_secret"));
}

#[test]
fn test_complete_requires_code() {
    let result = Args::try_parse_from(["shield-oauth", "complete", "--provider", "github"]);
    assert!(result.is_err());
}

#[tokio::test]
async fn test_complete_with_callback_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (_dir, config) = config_with(&server.uri());

    let args = Args::try_parse_from([
        "shield-oauth",
        "--config",
        config.as_str(),
        "complete",
        "--provider",
        "github",
        "--error",
        "access_denied",
        "--error-description",
        "The user has denied your application access.",
        "--state",
        "xyz",
    ])
    .unwrap();

    let err = args.run().await.unwrap_err();
    match err {
        ToolError::Identity(IdentityError::Callback(message)) => {
            assert!(message.starts_with("access_denied"))
        }
        other => panic!("Expected Callback error, got: {:?}", other),
    }
}

#[test]
fn test_error_description_requires_error() {
    let result = Args::try_parse_from([
        "shield-oauth",
        "complete",
        "--provider",
        "github",
        "--code",
        "c",
        "--error-description",
        "denied",
    ]);
    assert!(result.is_err());
}
