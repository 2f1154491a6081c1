use super::ui;
use crate::core::{ClientError, LinkApi, LinkController, LinkSession, LinkStatus};
use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

const CANCELLED_MESSAGE: &str = "Bank linking was closed before an account was connected";

pub fn describe_session(session: &LinkSession) -> String {
    match session.status {
        LinkStatus::Connected => format!(
            "{} (item {})",
            ui::style_text("Bank account connected", ui::StyleType::Success),
            session.item_id.as_deref().unwrap_or("unknown")
        ),
        LinkStatus::Failed => ui::style_text(
            &format!(
                "Linking failed: {}",
                session.error.as_deref().unwrap_or("unknown error")
            ),
            ui::StyleType::Error,
        ),
        other => format!("Link session is {other}"),
    }
}

/// Reads the public token handed back by the linking widget.
fn prompt_public_token(link_token: &str) -> Result<String> {
    let term = console::Term::stdout();
    term.write_line(&format!(
        "Open the bank linking widget with this link token:\n\n  {}\n",
        ui::style_text(link_token, ui::StyleType::TotalLabel)
    ))?;
    term.write_line(&ui::style_text(
        "Paste the public token from the widget (leave empty to cancel):",
        ui::StyleType::Subtle,
    ))?;
    let line = term.read_line().context("Failed to read public token")?;
    Ok(line.trim().to_string())
}

/// Waits for the prompt on its blocking thread. An interrupt counts as an
/// empty answer; the blocked read is left behind.
async fn answer_or_interrupt<I, T>(
    prompt: JoinHandle<Result<String>>,
    interrupt: I,
) -> Result<String>
where
    I: Future<Output = T>,
{
    tokio::select! {
        answer = prompt => answer.context("Public token prompt failed")?,
        _ = interrupt => Ok(String::new()),
    }
}

pub async fn run(
    api: Arc<dyn LinkApi>,
    user_id: &str,
    public_token: Option<String>,
    institution_id: &str,
) -> Result<()> {
    let controller = LinkController::new(api, user_id);

    let pb = ui::new_spinner("Requesting link token...");
    let link_token = controller.request_link_token().await;
    pb.finish_and_clear();
    let link_token = link_token.context("Failed to create link token")?;

    let public_token = match public_token {
        Some(token) => token,
        None => {
            let shown = link_token.clone();
            answer_or_interrupt(
                tokio::task::spawn_blocking(move || prompt_public_token(&shown)),
                tokio::signal::ctrl_c(),
            )
            .await?
        }
    };

    if public_token.trim().is_empty() {
        controller.cancel(CANCELLED_MESSAGE).await;
        println!("{}", describe_session(&controller.session().await));
        return Err(ClientError::Cancelled(CANCELLED_MESSAGE.to_string()).into());
    }

    let pb = ui::new_spinner("Linking bank account...");
    let outcome = tokio::select! {
        res = controller.link(&public_token, institution_id) => res.map_err(anyhow::Error::from),
        _ = tokio::signal::ctrl_c() => {
            controller.cancel("Interrupted while linking").await;
            Err(anyhow!("Linking interrupted"))
        }
    };
    pb.finish_and_clear();

    let session = controller.session().await;
    println!("{}", describe_session(&session));
    outcome.context("Failed to link bank account")?;

    info!(user_id, "Bank account linked");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[tokio::test]
    async fn test_interrupt_while_waiting_for_input() {
        let (release, parked) = mpsc::channel::<()>();
        let prompt = tokio::task::spawn_blocking(move || {
            // Stands in for a terminal read that never completes
            let _ = parked.recv();
            Ok("public-late".to_string())
        });

        let answer = answer_or_interrupt(prompt, async {}).await.unwrap();
        assert!(answer.is_empty());
        drop(release);
    }

    #[tokio::test]
    async fn test_answer_before_interrupt() {
        let prompt = tokio::task::spawn_blocking(|| Ok("public-sandbox-1".to_string()));
        let answer = answer_or_interrupt(prompt, std::future::pending::<()>())
            .await
            .unwrap();
        assert_eq!(answer, "public-sandbox-1");
    }

    #[test]
    fn test_describe_failed_session() {
        let session = LinkSession {
            status: LinkStatus::Failed,
            token: None,
            access_token: None,
            item_id: None,
            error: Some("Not authenticated".into()),
        };
        assert!(describe_session(&session).contains("Linking failed: Not authenticated"));
    }
}
