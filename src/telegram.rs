//! Telegram front-end.
//!
//! Long-polls the Bot API (`getUpdates`) and replies with `sendMessage`.
//! Every incoming update is handled on its own task, so slow model calls in
//! one chat do not hold up other chats. The retrieval index is shared by all
//! tasks and built on the first question.
//!
//! # Commands
//!
//! | Message | Behaviour |
//! |---------|-----------|
//! | `/start`, `/help` | Reset the chat history and send the welcome text |
//! | anything else | Answer from the document |
//!
//! Any failure while answering is logged and replaced by a generic apology;
//! the polling loop keeps running.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use docchat_core::{DocumentSource, Retriever};

use crate::answer::answer_question;
use crate::config::{Config, TelegramConfig};
use crate::conversation::{Conversations, Turn};
use crate::llm::ChatModel;

pub const WELCOME_TEXT: &str = "Hola, soy tu chatbot RAG para NT.\n\
    Puedo responder preguntas basadas en el contenido del PDF cargado.\n\n\
    Escríbeme una pregunta sobre el documento.";

pub const APOLOGY_TEXT: &str = "Ocurrió un error interno al procesar tu pregunta.";

/// Pause after a failed `getUpdates` before polling again.
const POLL_ERROR_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    reply_to_message_id: i64,
}

/// Minimal Bot API client.
pub struct TelegramApi {
    client: reqwest::Client,
    base: String,
    poll_timeout_secs: u64,
}

impl TelegramApi {
    pub fn new(api_url: &str, token: &str, poll_timeout_secs: u64) -> Result<Self> {
        // The HTTP timeout must outlast the long-poll timeout.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 10))
            .build()?;
        Ok(Self {
            client,
            base: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout_secs,
        })
    }

    /// Build a client from config, reading the token from the environment.
    pub fn from_config(config: &TelegramConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("{} environment variable not set", config.token_env))?;
        Self::new(&config.api_url, &token, config.poll_timeout_secs)
    }

    /// Fetch updates with `update_id >= offset`, waiting up to the poll timeout.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message"],
        });
        let resp: ApiResponse<Vec<Update>> = self
            .client
            .post(format!("{}/getUpdates", self.base))
            .json(&body)
            .send()
            .await
            .context("getUpdates request failed")?
            .json()
            .await
            .context("getUpdates returned invalid JSON")?;
        unwrap_response(resp, "getUpdates")
    }

    /// Send `text` to `chat_id` as a reply to `reply_to`.
    pub async fn send_message(&self, chat_id: i64, reply_to: i64, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id,
            text,
            reply_to_message_id: reply_to,
        };
        let resp: ApiResponse<serde_json::Value> = self
            .client
            .post(format!("{}/sendMessage", self.base))
            .json(&body)
            .send()
            .await
            .context("sendMessage request failed")?
            .json()
            .await
            .context("sendMessage returned invalid JSON")?;
        unwrap_response(resp, "sendMessage").map(|_| ())
    }
}

fn unwrap_response<T>(resp: ApiResponse<T>, method: &str) -> Result<T> {
    if !resp.ok {
        bail!(
            "Telegram {} failed: {}",
            method,
            resp.description.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    resp.result
        .ok_or_else(|| anyhow::anyhow!("Telegram {} returned no result", method))
}

/// Chat logic independent of the transport.
pub struct Bot<S> {
    retriever: Arc<Retriever<S>>,
    model: Arc<dyn ChatModel>,
    conversations: Conversations,
    top_k: usize,
}

impl<S: DocumentSource> Bot<S> {
    pub fn new(retriever: Arc<Retriever<S>>, model: Arc<dyn ChatModel>, top_k: usize) -> Self {
        Self {
            retriever,
            model,
            conversations: Conversations::new(),
            top_k,
        }
    }

    pub fn conversations(&self) -> &Conversations {
        &self.conversations
    }

    /// Produce the reply for one incoming text message.
    pub async fn handle_text(&self, chat_id: i64, text: &str) -> String {
        let text = text.trim();
        if is_command(text, "start") || is_command(text, "help") {
            self.conversations.reset(chat_id);
            return WELCOME_TEXT.to_string();
        }

        self.conversations.push(chat_id, Turn::user(text));
        let history = self.conversations.history(chat_id);

        let reply = match answer_question(
            &self.retriever,
            self.model.as_ref(),
            text,
            &history,
            self.top_k,
        )
        .await
        {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(chat_id, error = %format!("{:#}", e), "failed to answer");
                APOLOGY_TEXT.to_string()
            }
        };

        self.conversations.push(chat_id, Turn::assistant(&reply));
        reply
    }
}

/// `/name` or `/name@botname`, optionally followed by arguments.
fn is_command(text: &str, name: &str) -> bool {
    let Some(first) = text.split_whitespace().next() else {
        return false;
    };
    let Some(cmd) = first.strip_prefix('/') else {
        return false;
    };
    cmd.split('@').next() == Some(name)
}

/// Poll forever, answering every text message.
pub async fn run_bot<S>(api: Arc<TelegramApi>, bot: Arc<Bot<S>>) -> Result<()>
where
    S: DocumentSource + 'static,
{
    tracing::info!("Telegram bot started, waiting for messages");
    let mut offset = 0;

    loop {
        let updates = match api.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "polling failed");
                tokio::time::sleep(POLL_ERROR_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text.clone() else {
                continue;
            };

            let api = Arc::clone(&api);
            let bot = Arc::clone(&bot);
            tokio::spawn(async move {
                let reply = bot.handle_text(message.chat.id, &text).await;
                if let Err(e) = api
                    .send_message(message.chat.id, message.message_id, &reply)
                    .await
                {
                    tracing::warn!(
                        chat_id = message.chat.id,
                        error = %format!("{:#}", e),
                        "failed to send reply"
                    );
                }
            });
        }
    }
}

/// CLI entry point for `docchat serve telegram`.
pub async fn run_telegram(config: &Config) -> Result<()> {
    let api = Arc::new(TelegramApi::from_config(&config.telegram)?);
    let model = crate::llm::OpenAiCompatClient::from_config(&config.llm)?;
    let retriever = Arc::new(crate::answer::retriever_from_config(config)?);
    let bot = Arc::new(Bot::new(retriever, Arc::new(model), config.retrieval.top_k));
    run_bot(api, bot).await
}
