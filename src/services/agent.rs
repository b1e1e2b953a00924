use chrono::{Local, NaiveDateTime};

use crate::models::Session;
use crate::services::ai::Message;
use crate::services::dates::format_date;
use crate::services::tools::{self, ToolContext};
use crate::state::AppState;

pub const FAREWELL: &str = "Thank you for chatting. Goodbye!";
pub const INTERRUPTED: &str = "Chatbot terminated by user. Goodbye!";
pub const ROUNDS_EXHAUSTED: &str =
    "I'm sorry, I couldn't finish that request. Could you rephrase it?";

const SYSTEM_PROMPT: &str = r#"You are a helpful assistant designed to gather user information, answer questions about {document}, and book appointment dates.

Guidelines:
- Use search_document to answer questions about {document}. Base your answer on the returned excerpts and say so when they do not cover the question.
- Whenever the user shares their name, phone number or email, call store_user_info with just those fields, then tell the user what is still missing.
- Before booking, turn whatever date the user gave into YYYY-MM-DD with parse_date, then call book_appointment with that value.
- A booking needs the user's name, phone number and email. If book_appointment reports missing information, ask the user for it.
- Never invent tool results. Keep replies short and friendly.

Today's date is {today}."#;

pub fn greeting(document_title: &str) -> String {
    format!(
        "Hello! I'm here to help you. I can provide information from {document_title} or set an appointment date for you."
    )
}

pub fn is_exit_phrase(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "exit" | "quit" | "bye")
}

fn system_prompt(document_title: &str, now: NaiveDateTime) -> String {
    SYSTEM_PROMPT
        .replace("{document}", document_title)
        .replace("{today}", &format!("{} ({})", format_date(now.date()), now.format("%A")))
}

pub async fn process_message(
    state: &AppState,
    session: &mut Session,
    message: &str,
) -> anyhow::Result<String> {
    let now = Local::now().naive_local();
    process_message_at(state, session, message, now).await
}

/// Runs one user turn: the model may call capabilities for a bounded number
/// of rounds before it must answer. `now` anchors relative dates.
pub async fn process_message_at(
    state: &AppState,
    session: &mut Session,
    message: &str,
    now: NaiveDateTime,
) -> anyhow::Result<String> {
    session.history.push(Message::user(message));
    session.touch();

    let system = system_prompt(&state.config.document_title, now);
    let specs = tools::tool_specs(&state.config.document_title);

    for round in 1..=state.config.max_tool_rounds {
        let reply = state.llm.chat(&system, &session.history, &specs).await?;

        if reply.tool_calls.is_empty() {
            let text = reply.content.unwrap_or_default();
            session.history.push(Message::assistant(&text));
            return Ok(text);
        }

        let calls = reply.tool_calls.clone();
        session
            .history
            .push(Message::tool_request(reply.content, reply.tool_calls));

        for call in calls {
            tracing::info!(session = %session.id, tool = %call.name, round, "tool call");
            let output = {
                let mut ctx = ToolContext {
                    session: &mut *session,
                    retriever: state.retriever.as_ref(),
                    retrieval_limit: state.config.retrieval_limit,
                    now,
                };
                tools::dispatch(&mut ctx, &call.name, &call.arguments).await
            };
            tracing::debug!(tool = %call.name, output = %output, "tool result");
            session.history.push(Message::tool_result(&call.id, &output));
        }
    }

    tracing::warn!(session = %session.id, "tool round limit reached");
    session.history.push(Message::assistant(ROUNDS_EXHAUSTED));
    Ok(ROUNDS_EXHAUSTED.to_string())
}
