//! Capabilities offered to the language model.
//!
//! Each capability has a name, a JSON schema for its input and a typed
//! argument struct. Dispatch always yields text: recoverable failures are
//! rendered as sentences for the model rather than raised.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{ProfileUpdate, Session};
use crate::services::ai::ToolSpec;
use crate::services::dates::{format_date, resolve_date};
use crate::services::retrieval::{render_excerpts, Retriever};
use crate::services::{booking, profile, validation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    StoreUserInfo,
    ParseDate,
    BookAppointment,
    SearchDocument,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::SearchDocument,
        Capability::BookAppointment,
        Capability::StoreUserInfo,
        Capability::ParseDate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Capability::StoreUserInfo => "store_user_info",
            Capability::ParseDate => "parse_date",
            Capability::BookAppointment => "book_appointment",
            Capability::SearchDocument => "search_document",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn spec(&self, document_title: &str) -> ToolSpec {
        let (description, parameters) = match self {
            Capability::StoreUserInfo => (
                "Store user information such as name, phone number, and email. Only pass the fields the user has just provided.".to_string(),
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "The user's full name"},
                        "phone_no": {"type": "string", "description": "10 digit phone number starting with 98 or 97"},
                        "email": {"type": "string", "description": "The user's email address"},
                    },
                }),
            ),
            Capability::ParseDate => (
                "Parses the user-provided date phrase (for example 'next Friday') into YYYY-MM-DD.".to_string(),
                json!({
                    "type": "object",
                    "properties": {
                        "input_date": {"type": "string", "description": "The date as the user said it"},
                    },
                    "required": ["input_date"],
                }),
            ),
            Capability::BookAppointment => (
                "Check if the entered date is already booked and book it for an appointment.".to_string(),
                json!({
                    "type": "object",
                    "properties": {
                        "date": {"type": "string", "description": "The date in the format YYYY-MM-DD"},
                    },
                    "required": ["date"],
                }),
            ),
            Capability::SearchDocument => (
                format!("Searches and returns excerpts from {document_title}."),
                json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "What to look up"},
                    },
                    "required": ["query"],
                }),
            ),
        };

        ToolSpec {
            name: self.name(),
            description,
            parameters,
        }
    }
}

pub fn tool_specs(document_title: &str) -> Vec<ToolSpec> {
    Capability::ALL
        .iter()
        .map(|c| c.spec(document_title))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParseDateArgs {
    input_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BookAppointmentArgs {
    date: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchDocumentArgs {
    query: String,
}

/// Everything a capability may touch during one turn.
pub struct ToolContext<'a> {
    pub session: &'a mut Session,
    pub retriever: &'a dyn Retriever,
    pub retrieval_limit: usize,
    pub now: NaiveDateTime,
}

pub async fn dispatch(ctx: &mut ToolContext<'_>, name: &str, arguments: &Value) -> String {
    let Some(capability) = Capability::from_name(name) else {
        tracing::warn!(tool = name, "model requested unknown tool");
        return format!("Unknown tool '{name}'.");
    };

    match capability {
        Capability::StoreUserInfo => match parse_args::<ProfileUpdate>(arguments) {
            Ok(update) if update.is_empty() => "No information provided to update.".to_string(),
            Ok(update) => match profile::update_profile(ctx.session, &update) {
                Ok(message) => message,
                Err(e) => format!("Validation failed: {e}"),
            },
            Err(e) => e,
        },
        Capability::ParseDate => match parse_args::<ParseDateArgs>(arguments) {
            Ok(args) => match resolve_date(&args.input_date, ctx.now) {
                Ok(date) => format!("Date parsed successfully: {}", format_date(date)),
                Err(e) => e.to_string(),
            },
            Err(e) => e,
        },
        Capability::BookAppointment => match parse_args::<BookAppointmentArgs>(arguments) {
            Ok(args) => match validation::validate_date(args.date.trim()) {
                Ok(date) => match booking::book_date(ctx.session, date) {
                    Ok(outcome) => outcome.to_string(),
                    Err(e) => e.to_string(),
                },
                Err(e) => e.to_string(),
            },
            Err(e) => e,
        },
        Capability::SearchDocument => match parse_args::<SearchDocumentArgs>(arguments) {
            Ok(args) => match ctx.retriever.search(&args.query, ctx.retrieval_limit).await {
                Ok(excerpts) => render_excerpts(&excerpts),
                Err(e) => {
                    tracing::error!(error = %e, "document search failed");
                    "The document search is unavailable right now.".to_string()
                }
            },
            Err(e) => e,
        },
    }
}

/// Null arguments are treated as an empty object.
fn parse_args<T: DeserializeOwned>(arguments: &Value) -> Result<T, String> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments.clone()
    };
    serde_json::from_value(arguments).map_err(|e| format!("Invalid arguments: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Excerpt;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct FixedRetriever;

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn search(&self, query: &str, _limit: usize) -> anyhow::Result<Vec<Excerpt>> {
            Ok(vec![Excerpt {
                id: 1,
                source: "guide".to_string(),
                position: 0,
                content: format!("excerpt about {query}"),
            }])
        }
    }

    struct BrokenRetriever;

    #[async_trait]
    impl Retriever for BrokenRetriever {
        async fn search(&self, _query: &str, _limit: usize) -> anyhow::Result<Vec<Excerpt>> {
            anyhow::bail!("index offline")
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 6)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    async fn call(session: &mut Session, name: &str, args: Value) -> String {
        let mut ctx = ToolContext {
            session,
            retriever: &FixedRetriever,
            retrieval_limit: 4,
            now: now(),
        };
        dispatch(&mut ctx, name, &args).await
    }

    #[test]
    fn test_names_round_trip() {
        for capability in Capability::ALL {
            assert_eq!(Capability::from_name(capability.name()), Some(capability));
        }
        assert_eq!(Capability::from_name("delete_everything"), None);
    }

    #[test]
    fn test_specs_describe_document() {
        let specs = tool_specs("the FastAPI book");
        assert_eq!(specs.len(), 4);
        let search = specs.iter().find(|s| s.name == "search_document").unwrap();
        assert!(search.description.contains("the FastAPI book"));
        assert_eq!(search.parameters["required"][0], "query");
    }

    #[tokio::test]
    async fn test_store_user_info() {
        let mut session = Session::new();
        let out = call(&mut session, "store_user_info", json!({"name": "Sita", "phone_no": "9812345678"})).await;
        assert_eq!(out, "The user is missing the following information: Email.");
        assert_eq!(session.profile.phone.as_deref(), Some("9812345678"));
    }

    #[tokio::test]
    async fn test_store_user_info_empty_and_invalid() {
        let mut session = Session::new();
        assert_eq!(
            call(&mut session, "store_user_info", json!({})).await,
            "No information provided to update."
        );
        assert_eq!(
            call(&mut session, "store_user_info", json!({"name": null})).await,
            "No information provided to update."
        );

        let out = call(&mut session, "store_user_info", json!({"name": "Sita", "email": "not-an-email"})).await;
        assert!(out.starts_with("Validation failed: Invalid email"));
        assert_eq!(session.profile.name, None);
    }

    #[tokio::test]
    async fn test_parse_date() {
        let mut session = Session::new();
        assert_eq!(
            call(&mut session, "parse_date", json!({"input_date": "next friday"})).await,
            "Date parsed successfully: 2024-03-08"
        );
        assert_eq!(
            call(&mut session, "parse_date", json!({"input_date": ""})).await,
            "Could not parse the date: ''."
        );
    }

    #[tokio::test]
    async fn test_book_appointment_flow() {
        let mut session = Session::new();
        let out = call(&mut session, "book_appointment", json!({"date": "2024-03-08"})).await;
        assert!(out.starts_with("The user is missing the following information"));
        assert!(session.appointment.is_empty());

        call(
            &mut session,
            "store_user_info",
            json!({"name": "Sita", "phone_no": "9812345678", "email": "sita@example.com"}),
        )
        .await;

        let out = call(&mut session, "book_appointment", json!({"date": "2024-03-08"})).await;
        assert_eq!(out, "The day 2024-03-08 has been booked.");
        let out = call(&mut session, "book_appointment", json!({"date": "2024-03-08"})).await;
        assert_eq!(out, "The day is already booked.");
        assert_eq!(session.appointment.len(), 1);
    }

    #[tokio::test]
    async fn test_book_appointment_rejects_loose_date() {
        let mut session = Session::new();
        let out = call(&mut session, "book_appointment", json!({"date": "March 8"})).await;
        assert!(out.contains("'March 8'"));
    }

    #[tokio::test]
    async fn test_search_document() {
        let mut session = Session::new();
        let out = call(&mut session, "search_document", json!({"query": "routing"})).await;
        assert_eq!(out, "excerpt about routing");
    }

    #[tokio::test]
    async fn test_search_failure_is_rendered() {
        let mut session = Session::new();
        let mut ctx = ToolContext {
            session: &mut session,
            retriever: &BrokenRetriever,
            retrieval_limit: 4,
            now: now(),
        };
        let out = dispatch(&mut ctx, "search_document", &json!({"query": "routing"})).await;
        assert!(out.contains("unavailable"));
    }

    #[tokio::test]
    async fn test_bad_arguments_and_unknown_tool() {
        let mut session = Session::new();
        let out = call(&mut session, "parse_date", json!({"when": "friday"})).await;
        assert!(out.starts_with("Invalid arguments"));
        let out = call(&mut session, "parse_date", Value::String("{not json".to_string())).await;
        assert!(out.starts_with("Invalid arguments"));
        let out = call(&mut session, "launch_rocket", json!({})).await;
        assert_eq!(out, "Unknown tool 'launch_rocket'.");
    }
}
