//! Command handlers.
//!
//! Each handler is a thin async function over the composed context; all
//! sync logic lives in the core services.

use anyhow::{Context as _, Result, bail};

use mcpsync_core::domain::{mask_document, unmask_document};
use mcpsync_core::ports::FileBridgeError;
use mcpsync_core::services::SyncReport;

use crate::bootstrap::SyncContext;
use crate::commands::TokenCommand;

/// Read the authoritative document; an absent file is the empty document.
async fn read_document(ctx: &SyncContext) -> Result<String> {
    match ctx.bridge.read(&ctx.settings.config_file).await {
        Ok(text) => Ok(text),
        Err(FileBridgeError::NotFound(_)) => Ok("{}".to_string()),
        Err(e) => Err(e).context("failed to read server definitions"),
    }
}

fn print_report(report: &SyncReport) {
    if report.connections_written {
        println!("Updated tool-server connections.");
    }
    if report.models_updated > 0 {
        println!("Updated {} model(s).", report.models_updated);
    }
    if !report.connections_written && report.models_updated == 0 {
        println!("Already in sync.");
    }
}

/// `show [--reveal]` — print the document, secrets masked by default.
pub async fn handle_show(ctx: &SyncContext, reveal: bool) -> Result<()> {
    let text = read_document(ctx).await?;
    if reveal {
        println!("{text}");
    } else {
        println!("{}", mask_document(&text).text);
    }
    Ok(())
}

/// `apply <file>` — write an edited document, restart the proxy, reconcile.
///
/// The edited text may still carry placeholders from a masked `show`;
/// those are restored from the current document before writing, so an
/// edit-without-retyping-secrets round trip works.
pub async fn handle_apply(ctx: &SyncContext, file: &str) -> Result<()> {
    let edited = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read '{file}'"))?;

    // Format check before any write or network call
    if !serde_json::from_str::<serde_json::Value>(&edited)
        .map(|v| v.is_object())
        .unwrap_or(false)
    {
        bail!("'{file}' is not a JSON object");
    }

    let current = read_document(ctx).await?;
    let secrets = mask_document(&current).secrets;
    let restored =
        unmask_document(&edited, &secrets).context("failed to restore masked values")?;

    ctx.bridge
        .write(&ctx.settings.config_file, &restored)
        .await
        .context("failed to write server definitions")?;
    ctx.restart
        .restart()
        .await
        .context("definitions written, but the proxy restart failed")?;

    let report = ctx.reconciler.reconcile(&restored).await?;
    println!("Applied {file}.");
    print_report(&report);
    Ok(())
}

/// `sync` — one reconciliation pass from the current document.
pub async fn handle_sync(ctx: &SyncContext) -> Result<()> {
    let text = read_document(ctx).await?;
    let report = ctx.reconciler.reconcile(&text).await?;
    print_report(&report);
    Ok(())
}

/// `ensure-connection` — register the local inference endpoint.
pub async fn handle_ensure_connection(ctx: &SyncContext) -> Result<()> {
    if ctx.ensurer.ensure().await? {
        println!("Registered {} in Open WebUI.", ctx.settings.openai_url);
    } else {
        println!("{} is already registered.", ctx.settings.openai_url);
    }
    Ok(())
}

/// `token set/status/clear` — credential store access.
pub async fn handle_token(ctx: &SyncContext, command: &TokenCommand) -> Result<()> {
    match command {
        TokenCommand::Set { token } => {
            ctx.credentials.set_token(token).await?;
            println!("Token stored.");
        }
        TokenCommand::Status => match ctx.credentials.get_token().await? {
            Some(_) => println!("A token is configured."),
            None => println!("No token is configured. Run 'mcpsync token set <token>'."),
        },
        TokenCommand::Clear => {
            ctx.credentials.clear_token().await?;
            println!("Token cleared.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use mcpsync_core::credentials::MemoryCredentialStore;
    use mcpsync_core::ports::NoopRestart;
    use mcpsync_core::services::{ConnectionEnsurer, PassQueue, Reconciler};
    use mcpsync_core::settings::SyncSettings;
    use mcpsync_docker::{DockerFileBridge, FixedStack, ShellRunner};
    use mcpsync_openwebui::WebUiClient;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> SyncContext {
        let settings = SyncSettings::with_defaults();
        let bridge = Arc::new(DockerFileBridge::new(
            Arc::new(ShellRunner::new()),
            Arc::new(FixedStack::new("test", dir.path())),
        ));
        let credentials = Arc::new(MemoryCredentialStore::new());
        // Port 9 is never listened on; these tests stay off the network
        let api =
            Arc::new(WebUiClient::new("http://127.0.0.1:9", credentials.clone()).unwrap());
        let queue = Arc::new(PassQueue::new());
        SyncContext {
            settings: settings.clone(),
            bridge,
            credentials,
            restart: Arc::new(NoopRestart),
            reconciler: Reconciler::new(api.clone(), queue.clone(), settings.clone()),
            ensurer: ConnectionEnsurer::new(api, queue, settings),
        }
    }

    #[tokio::test]
    async fn missing_document_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        assert_eq!(read_document(&ctx).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn apply_rejects_a_non_object_document() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        let edited = dir.path().join("edited.json");
        std::fs::write(&edited, "[1, 2, 3]").unwrap();

        let err = handle_apply(&ctx, edited.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[tokio::test]
    async fn apply_restores_placeholders_from_the_current_document() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        let current = r#"{
  "mcpServers": {
    "github": {
      "command": "npx",
      "env": {
        "GITHUB_TOKEN": "ghp_secret123"
      }
    }
  }
}"#;
        std::fs::write(dir.path().join("config.json"), current).unwrap();

        // Edit made against the masked form, placeholder untouched
        let masked = mask_document(current);
        assert!(masked.text.contains("********"));
        let edited = dir.path().join("edited.json");
        std::fs::write(&edited, masked.text.replace("npx", "npx2")).unwrap();

        // Reconciliation fails (no token), but the write happens first
        let _ = handle_apply(&ctx, edited.to_str().unwrap()).await;

        let written = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        assert!(written.contains("ghp_secret123"));
        assert!(written.contains("npx2"));
        assert!(!written.contains("********"));
    }
}
