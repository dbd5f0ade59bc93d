//! Invoke command - one-shot invocation

use anyhow::{Context, Result, bail};
use expense_ocr_adapters::{
    llm::{LlmConfig as AdapterLlmConfig, MistralAnalyzer, StubAnalyzer},
    secrets::{ApiKeyResolver, AwsCliSecretStore, SecretStoreKind},
};
use expense_ocr_domain::usecases::{InvocationConfig, InvocationEvent, InvocationHandler};
use expense_ocr_domain::{DocumentAnalyzer, SecretStore};
use std::io::{self, Read};
use std::path::PathBuf;

use crate::args::InvokeArgs;
use crate::config::AppConfig;

pub type Handler = InvocationHandler<Box<dyn DocumentAnalyzer>>;

pub async fn execute(args: InvokeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let handler = build_handler(&config)?;

    let result = match (&args.url, &args.content_type) {
        (Some(url), Some(content_type)) => {
            handler
                .handle(InvocationEvent::new(url.clone(), content_type.clone()))
                .await
        }
        _ => {
            let payload = read_event(&args)?;
            handler.handle_json(&payload).await
        }
    };

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .context("Failed to serialize response envelope")?;
    println!("{}", output);

    Ok(())
}

pub(crate) fn build_handler(config: &AppConfig) -> Result<Handler> {
    let analyzer = build_analyzer(config)?;
    Ok(InvocationHandler::new(
        analyzer,
        InvocationConfig {
            models: config.llm.models.clone(),
            echo_input: config.general.echo_input,
        },
    ))
}

pub(crate) fn build_analyzer(config: &AppConfig) -> Result<Box<dyn DocumentAnalyzer>> {
    match config.llm.provider.as_str() {
        "mistral" => {
            let resolver =
                ApiKeyResolver::new(config.llm.api_key_env.clone(), build_secret_store(config)?);
            let analyzer = MistralAnalyzer::new(
                resolver,
                AdapterLlmConfig {
                    base_url: config.llm.base_url.clone(),
                    timeout_secs: config.llm.timeout_secs,
                },
            )
            .context("Failed to configure Mistral client")?;

            tracing::debug!(
                base_url = %config.llm.base_url,
                credential = %analyzer.credential_source(),
                "Mistral analyzer ready"
            );
            Ok(Box::new(analyzer))
        }
        "stub" => Ok(Box::new(StubAnalyzer::canned())),
        other => bail!("Unknown LLM provider: {}", other),
    }
}

pub(crate) fn build_secret_store(config: &AppConfig) -> Result<Option<Box<dyn SecretStore>>> {
    let kind = match config.secrets.store.as_str() {
        "none" | "" => return Ok(None),
        "ssm" => SecretStoreKind::Ssm,
        "secrets_manager" => SecretStoreKind::SecretsManager,
        other => bail!("Unknown secret store: {}", other),
    };

    Ok(Some(Box::new(AwsCliSecretStore::new(
        kind,
        config.secrets.name.clone(),
        config.secrets.region.clone(),
        config.secrets.command.clone(),
        config.secrets.timeout_secs,
    ))))
}

fn read_event(args: &InvokeArgs) -> Result<Vec<u8>> {
    if let Some(ref path) = args.event {
        if path.as_os_str() != "-" {
            return std::fs::read(path)
                .with_context(|| format!("Failed to read event file: {}", path.display()));
        }
    }

    // Default to stdin if no event file specified
    let mut payload = Vec::new();
    io::stdin()
        .read_to_end(&mut payload)
        .context("Failed to read event from stdin")?;
    Ok(payload)
}
