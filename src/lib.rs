//! # docchat
//!
//! Chat with one document. Questions are answered by a hosted language model
//! that only sees the document fragments a local, embedding-free retriever
//! ranks as relevant.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────┐   ┌──────────────┐
//! │  Telegram /  │──▶│  docchat-core        │──▶│  Hosted LLM  │
//! │  CLI (ask)   │   │  chunk+tokenize+rank │   │  (Groq API)  │
//! └──────────────┘   └──────────┬───────────┘   └──────────────┘
//!                               │ first request
//!                               ▼
//!                        ┌──────────────┐
//!                        │ PDF / text   │
//!                        │ extraction   │
//!                        └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docchat --document documento.pdf stats
//! docchat --document documento.pdf context "¿De qué trata?" --explain
//! GROQ_API_KEY=... docchat --document documento.pdf ask "¿De qué trata?"
//! GROQ_API_KEY=... TELEGRAM_BOT_TOKEN=... docchat serve telegram
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`extract`] | PDF/text extraction, on-disk document source |
//! | [`llm`] | Chat model trait and OpenAI-compatible client |
//! | [`answer`] | Prompt assembly and the answer pipeline |
//! | [`conversation`] | Per-chat message history |
//! | [`telegram`] | Telegram long-polling front-end |
//! | [`stats`] | Index statistics |

pub mod answer;
pub mod config;
pub mod conversation;
pub mod extract;
pub mod llm;
pub mod stats;
pub mod telegram;
