//! # FAQ Bot
//!
//! A question-answering chatbot over a CSV file of question/answer pairs.
//!
//! A query is answered directly when it matches a corpus question exactly
//! (ignoring case, punctuation, and surrounding whitespace). Otherwise the
//! bot suggests related corpus questions ranked by a configurable scorer,
//! and, when nothing is related, asks a generation model for follow-up
//! questions. The bot is served as an HTML form and a JSON API.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌────────────────┐
//! │ CSV corpus │──▶│  AppContext  │◀──│ Embedding /    │
//! │            │   │ corpus+scorer│   │ generation API │
//! └────────────┘   └──────┬───────┘   └────────────────┘
//!                         │
//!               ┌─────────┴─────────┐
//!               ▼                   ▼
//!          ┌──────────┐       ┌──────────┐
//!          │   CLI    │       │   HTTP   │
//!          │ (faqbot) │       │ form+API │
//!          └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! faqbot check                         # validate config and corpus
//! faqbot ask "What is the GPA requirement?"
//! faqbot serve                         # http://0.0.0.0:5000
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`corpus`] | CSV corpus loading |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`generation`] | Follow-up question generation |
//! | [`http`] | Model API calls with retry |
//! | [`context`] | One-time startup initialization |
//! | [`chat`] | The per-query chat flow |
//! | [`page`] | HTML rendering |
//! | [`server`] | HTTP server |
//!
//! Matching and ranking live in the `faqbot-core` crate.

pub mod chat;
pub mod config;
pub mod context;
pub mod corpus;
pub mod embedding;
pub mod generation;
pub mod http;
pub mod page;
pub mod server;
