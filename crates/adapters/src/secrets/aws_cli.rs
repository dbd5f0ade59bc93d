//! Secret store backed by the `aws` command line tool

use async_trait::async_trait;
use expense_ocr_domain::{SecretError, SecretStore};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Which AWS service holds the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretStoreKind {
    /// SSM Parameter Store, decrypted `SecureString`
    Ssm,
    SecretsManager,
}

/// Fetches a secret by shelling out to the AWS CLI.
pub struct AwsCliSecretStore {
    kind: SecretStoreKind,
    name: String,
    region: String,
    command: String,
    timeout: Duration,
}

impl AwsCliSecretStore {
    pub fn new(
        kind: SecretStoreKind,
        name: impl Into<String>,
        region: impl Into<String>,
        command: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            region: region.into(),
            command: command.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = match self.kind {
            SecretStoreKind::Ssm => vec![
                "ssm".into(),
                "get-parameter".into(),
                "--name".into(),
                self.name.clone(),
                "--with-decryption".into(),
                "--query".into(),
                "Parameter.Value".into(),
            ],
            SecretStoreKind::SecretsManager => vec![
                "secretsmanager".into(),
                "get-secret-value".into(),
                "--secret-id".into(),
                self.name.clone(),
                "--query".into(),
                "SecretString".into(),
            ],
        };
        args.extend([
            "--region".to_string(),
            self.region.clone(),
            "--output".to_string(),
            "text".to_string(),
        ]);
        args
    }
}

#[async_trait]
impl SecretStore for AwsCliSecretStore {
    async fn fetch(&self) -> Result<SecretString, SecretError> {
        let mut child = Command::new(&self.command)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SecretError::Unavailable(format!("Failed to spawn {}: {}", self.command, e))
            })?;

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(result) => result.map_err(|e| SecretError::Unavailable(e.to_string()))?,
            Err(_) => {
                let _ = child.kill().await;
                return Err(SecretError::Timeout);
            }
        };

        let mut stdout = String::new();
        if let Some(mut out) = child.stdout.take() {
            out.read_to_string(&mut stdout)
                .await
                .map_err(|e| SecretError::Unavailable(e.to_string()))?;
        }

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut err) = child.stderr.take() {
                let _ = err.read_to_string(&mut stderr).await;
            }
            if stderr.contains("ParameterNotFound") || stderr.contains("ResourceNotFoundException")
            {
                return Err(SecretError::NotFound(self.name.clone()));
            }
            return Err(SecretError::Unavailable(format!(
                "{} exited with {}: {}",
                self.command,
                status,
                stderr.trim()
            )));
        }

        let value = stdout.trim();
        if value.is_empty() {
            return Err(SecretError::NotFound(self.name.clone()));
        }

        Ok(SecretString::new(value.into()))
    }

    fn describe(&self) -> String {
        let service = match self.kind {
            SecretStoreKind::Ssm => "ssm",
            SecretStoreKind::SecretsManager => "secretsmanager",
        };
        format!("{}:{}/{}", service, self.region, self.name)
    }
}
