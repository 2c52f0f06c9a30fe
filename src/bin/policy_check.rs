//! Policy Check CLI
//!
//! Evaluates a request against a policy file, optionally taking attributes
//! from a verified identity token. Also issues tokens and secret handles.

use access_policy::{
    sign, verify, Context, DataContext, Decision, EngineConfig, Policy, PolicyEngine,
    SecretHandle, UnresolvedPolicy,
};
use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "policy-check")]
#[command(about = "Evaluate attribute-based access policies")]
struct Args {
    /// Engine configuration file (TOML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide whether a request is allowed (exit 0 = allow, 1 = deny)
    Check {
        /// Policy file (.json or .toml)
        #[arg(short = 'p', long)]
        policy: PathBuf,

        /// Requested action
        #[arg(short = 'a', long)]
        action: String,

        /// Requested resource (fully resolved)
        #[arg(short = 'r', long)]
        resource: String,

        /// Request attributes as a JSON object
        #[arg(short = 'd', long)]
        data: Option<String>,

        /// Identity token whose claims are added to the attributes
        #[arg(long, requires = "secret")]
        token: Option<String>,

        /// Secret handle used to verify --token
        #[arg(long)]
        secret: Option<String>,

        /// Fail on `${key}` placeholders missing from the attributes
        #[arg(long)]
        strict_placeholders: bool,
    },

    /// Issue a signed identity token
    Sign {
        /// Secret handle (UUID-v4)
        #[arg(long)]
        secret: String,

        /// Identity payload as a JSON object
        #[arg(long)]
        payload: String,

        /// Token lifetime in seconds (defaults to the configured TTL)
        #[arg(long)]
        ttl_secs: Option<u64>,
    },

    /// Generate a new secret handle
    NewSecret,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn request_data(data: Option<&str>, token: Option<&str>, secret: Option<&str>) -> Result<DataContext> {
    let mut attributes = DataContext::new();

    if let Some(token) = token {
        let secret = secret.unwrap_or_default();
        let claims = verify(token, secret).context("token verification failed")?;
        attributes.extend(claims.to_data_context());
        debug!("Added {} attributes from token", attributes.len());
    }

    if let Some(raw) = data {
        let value: serde_json::Value =
            serde_json::from_str(raw).context("--data is not valid JSON")?;
        attributes.extend(DataContext::from_json(&value)?);
    }

    Ok(attributes)
}

fn run(args: Args) -> Result<bool> {
    let mut config = load_config(args.config.as_ref())?;

    match args.command {
        Command::Check {
            policy,
            action,
            resource,
            data,
            token,
            secret,
            strict_placeholders,
        } => {
            if strict_placeholders {
                config.unresolved_placeholders = UnresolvedPolicy::Fail;
            }

            let loaded = Policy::load(&policy)
                .with_context(|| format!("failed to load policy {}", policy.display()))?;
            let attributes = request_data(data.as_deref(), token.as_deref(), secret.as_deref())?;
            let context = Context::new(action, resource);

            let engine = PolicyEngine::new(config);
            let decision = engine.authorize(loaded.statements(), &context, &attributes)?;

            let report = match decision {
                Decision::Allow { matched } => json!({ "allowed": true, "matched": matched }),
                Decision::Deny(reason) => {
                    json!({ "allowed": false, "reason": format!("{:?}", reason) })
                }
            };
            println!("{}", report);

            Ok(decision.is_allowed())
        }
        Command::Sign {
            secret,
            payload,
            ttl_secs,
        } => {
            let payload: serde_json::Value =
                serde_json::from_str(&payload).context("--payload is not valid JSON")?;
            let ttl = ttl_secs.map(Duration::from_secs).unwrap_or(config.token_ttl());
            if ttl.is_zero() {
                bail!("--ttl-secs must be greater than zero");
            }

            let token = sign(&payload, &secret, Some(ttl))?;
            info!("Issued token valid for {:?}", ttl);
            println!("{}", token);
            Ok(true)
        }
        Command::NewSecret => {
            println!("{}", SecretHandle::generate().as_str());
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let result = run(args);

    if let Err(e) = &result {
        eprintln!("error: {:#}", e);
    }

    ExitCode::from(exit_status(&result))
}

/// 0 = allowed (or command succeeded), 1 = denied, 2 = error
fn exit_status(result: &Result<bool>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SECRET: &str = "ae333df7-3dc4-4c3f-bdcf-a6220a8529ae";

    fn policy_file() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(
            br#"[
                { "action": "GET", "resource": "/user/${id}" },
                { "action": "DELETE", "resource": "/user/${id}",
                  "restriction": { "equals": { "role": "admin" } } }
            ]"#,
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    fn check(policy: &NamedTempFile, extra: &[&str]) -> Result<bool> {
        let path = policy.path().to_str().unwrap();
        let mut argv = vec!["policy-check", "check", "--policy", path];
        argv.extend_from_slice(extra);
        run(Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_exit_status_mapping() {
        assert_eq!(exit_status(&Ok(true)), 0);
        assert_eq!(exit_status(&Ok(false)), 1);
        assert_eq!(exit_status(&Err(anyhow::anyhow!("boom"))), 2);
    }

    #[test]
    fn test_check_allow_and_deny() {
        let policy = policy_file();

        let allowed = check(
            &policy,
            &["-a", "GET", "-r", "/user/7", "-d", r#"{"id": "7", "role": "member"}"#],
        );
        assert_eq!(exit_status(&allowed), 0);

        let denied = check(
            &policy,
            &["-a", "DELETE", "-r", "/user/7", "-d", r#"{"id": "7", "role": "member"}"#],
        );
        assert_eq!(exit_status(&denied), 1);
    }

    #[test]
    fn test_check_errors_exit_2() {
        let policy = policy_file();

        let bad_data = check(&policy, &["-a", "GET", "-r", "/user/7", "-d", "[1, 2]"]);
        assert_eq!(exit_status(&bad_data), 2);

        let strict = check(
            &policy,
            &["-a", "GET", "-r", "/user/7", "--strict-placeholders"],
        );
        assert_eq!(exit_status(&strict), 2);

        let args = Args::try_parse_from([
            "policy-check", "check", "--policy", "/no/such/policy.json", "-a", "GET", "-r", "/x",
        ])
        .unwrap();
        assert_eq!(exit_status(&run(args)), 2);
    }

    #[test]
    fn test_explicit_data_overrides_token_claims() {
        let token = sign(&json!({ "id": "7", "role": "admin" }), SECRET, None).unwrap();

        let attrs = request_data(Some(r#"{"role": "member"}"#), Some(&token), Some(SECRET)).unwrap();
        assert_eq!(attrs.get("role").and_then(|v| v.as_str()), Some("member"));
        assert_eq!(attrs.get("id").and_then(|v| v.as_str()), Some("7"));
        assert!(attrs.get("exp").is_some());
    }

    #[test]
    fn test_token_claims_drive_check() {
        let policy = policy_file();
        let token = sign(&json!({ "id": "7", "role": "admin" }), SECRET, None).unwrap();

        let allowed = check(
            &policy,
            &["-a", "DELETE", "-r", "/user/7", "--token", token.as_str(), "--secret", SECRET],
        );
        assert_eq!(exit_status(&allowed), 0);

        let wrong_secret = check(
            &policy,
            &[
                "-a", "DELETE", "-r", "/user/7", "--token", token.as_str(),
                "--secret", "00000000-0000-4000-8000-000000000000",
            ],
        );
        assert_eq!(exit_status(&wrong_secret), 2);
    }

    #[test]
    fn test_token_requires_secret_flag() {
        let parsed = Args::try_parse_from([
            "policy-check", "check", "-p", "p.json", "-a", "GET", "-r", "/x", "--token", "t",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_sign_rejects_zero_ttl() {
        let args = Args::try_parse_from([
            "policy-check", "sign", "--secret", SECRET, "--payload", r#"{"id": "7"}"#,
            "--ttl-secs", "0",
        ])
        .unwrap();
        assert!(run(args).is_err());
    }
}
