//! Doctor command - validate configuration and show status
//!
//! Nothing here calls the model API or the secret store.

use anyhow::Result;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::commands::invoke::build_secret_store;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    llm: CheckResult,
    credential: CheckResult,
    server: CheckResult,
    overall: CheckStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Ok,
    Warn,
    Error,
}

impl CheckStatus {
    fn symbol(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::Warn => "⚠",
            Self::Error => "✗",
        }
    }
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: CheckStatus,
    message: String,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warn,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            message: message.into(),
        }
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let report = match AppConfig::load(config_path.as_deref()) {
        Ok(config) => build_report(&config),
        Err(e) => DoctorReport {
            config: CheckResult::error(format!("Failed to load config: {:#}", e)),
            llm: CheckResult::error("Not checked"),
            credential: CheckResult::error("Not checked"),
            server: CheckResult::error("Not checked"),
            overall: CheckStatus::Error,
        },
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == CheckStatus::Error {
        std::process::exit(1);
    }

    Ok(())
}

fn build_report(config: &AppConfig) -> DoctorReport {
    let mut report = DoctorReport {
        config: CheckResult::ok("Configuration loaded successfully"),
        llm: check_llm(config),
        credential: check_credential(config),
        server: check_server(config),
        overall: CheckStatus::Ok,
    };

    let checks = [&report.config, &report.llm, &report.credential, &report.server];
    report.overall = if checks.iter().any(|c| c.status == CheckStatus::Error) {
        CheckStatus::Error
    } else if checks.iter().all(|c| c.status == CheckStatus::Ok) {
        CheckStatus::Ok
    } else {
        CheckStatus::Warn
    };

    report
}

fn check_llm(config: &AppConfig) -> CheckResult {
    let models = &config.llm.models;
    if models.image.trim().is_empty() || models.document.trim().is_empty() {
        return CheckResult::error("Both llm.models.image and llm.models.document must be set");
    }

    match config.llm.provider.as_str() {
        "mistral" => {
            if config.llm.base_url.trim().is_empty() {
                return CheckResult::error("llm.base_url is empty");
            }
            CheckResult::ok(format!(
                "Provider: mistral ({}), image model: {}, document model: {}",
                config.llm.base_url, models.image, models.document
            ))
        }
        "stub" => CheckResult::warn("Provider: stub (offline, canned answers)"),
        other => CheckResult::error(format!("Unknown provider: {}", other)),
    }
}

fn check_credential(config: &AppConfig) -> CheckResult {
    if config.llm.provider == "stub" {
        return CheckResult::ok("Not required for stub provider");
    }

    let env_var = &config.llm.api_key_env;
    if let Ok(value) = std::env::var(env_var) {
        if !value.trim().is_empty() {
            return CheckResult::ok(format!("API key: {} (set)", env_var));
        }
    }

    match build_secret_store(config) {
        Ok(Some(store)) => {
            if command_exists(&config.secrets.command) {
                CheckResult::ok(format!(
                    "API key: {} (not set), falling back to {}",
                    env_var,
                    store.describe()
                ))
            } else {
                CheckResult::warn(format!(
                    "API key: {} (not set), {} needs '{}' on PATH",
                    env_var,
                    store.describe(),
                    config.secrets.command
                ))
            }
        }
        Ok(None) => CheckResult::error(format!(
            "API key: {} (not set) and secret store disabled",
            env_var
        )),
        Err(e) => CheckResult::error(e.to_string()),
    }
}

fn check_server(config: &AppConfig) -> CheckResult {
    match config.server.bind.parse::<SocketAddr>() {
        Ok(addr) => CheckResult::ok(format!("Bind address: {}", addr)),
        Err(_) => CheckResult::warn(format!(
            "Bind address '{}' is not a socket address; it will be resolved at startup",
            config.server.bind
        )),
    }
}

fn command_exists(command: &str) -> bool {
    let path = std::path::Path::new(command);
    if path.components().count() > 1 {
        return path.is_file();
    }

    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };

    std::env::split_paths(&paths).any(|dir| dir.join(command).is_file())
}

fn print_report(report: &DoctorReport) {
    println!("expense-ocr Doctor Report");
    println!("=========================");
    println!();

    print_check("Config", &report.config);
    print_check("LLM Provider", &report.llm);
    print_check("Credential", &report.credential);
    print_check("Server", &report.server);

    println!();
    println!(
        "{} Overall: {}",
        report.overall.symbol(),
        format!("{:?}", report.overall).to_uppercase()
    );
}

fn print_check(name: &str, result: &CheckResult) {
    println!("{} {}: {}", result.status.symbol(), name, result.message);
}
