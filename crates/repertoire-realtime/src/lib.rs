//! Repertoire: real-time notification of finished indexing work.
//!
//! The search engine calls back when an asynchronous indexing task ends.
//! The [`webhook::IndexingWebhookReceiver`] classifies the callback, looks
//! up which user caused the task and asks the [`notifier::RealtimeNotifier`]
//! to tell that user's clients their cached search results are stale.

pub mod broker;
pub mod notifier;
pub mod token;
pub mod webhook;
