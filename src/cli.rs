use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::models::Session;
use crate::services::agent;
use crate::state::AppState;

/// Line-based chat over any reader/writer pair. Ends on an exit phrase, on
/// end of input, or when `interrupt` resolves, including mid-turn.
pub async fn run_chat_loop<R, W, I>(
    state: &AppState,
    input: R,
    mut output: W,
    interrupt: I,
) -> anyhow::Result<Session>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    I: Future<Output = ()>,
{
    let greeting = agent::greeting(&state.config.document_title);
    let mut session = Session::with_greeting(&greeting);
    tracing::info!(session = %session.id, "chat session started");

    write_line(&mut output, &format!("AI: {greeting}")).await?;

    let mut lines = input.lines();
    tokio::pin!(interrupt);

    loop {
        output.write_all(b"You: ").await?;
        output.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut interrupt => None,
        };

        let Some(line) = line else {
            write_line(&mut output, &format!("\nAI: {}", agent::INTERRUPTED)).await?;
            break;
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        if agent::is_exit_phrase(text) {
            session.record_exchange(text, agent::FAREWELL);
            write_line(&mut output, &format!("AI: {}", agent::FAREWELL)).await?;
            break;
        }

        let turn = tokio::select! {
            result = agent::process_message(state, &mut session, text) => Some(result),
            _ = &mut interrupt => None,
        };

        let Some(result) = turn else {
            tracing::info!(session = %session.id, "interrupted during a turn");
            write_line(&mut output, &format!("\nAI: {}", agent::INTERRUPTED)).await?;
            break;
        };

        match result {
            Ok(reply) => write_line(&mut output, &format!("AI: {reply}")).await?,
            Err(e) => {
                tracing::error!(session = %session.id, error = %e, "unexpected error");
                write_line(&mut output, &format!("AI: An unexpected error occurred: {e}")).await?;
            }
        }
    }

    Ok(session)
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> std::io::Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
