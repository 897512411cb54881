//! Client side of the asynchronous image-generation flow.
//!
//! Provides the REST client for the ModelScope inference gateway, a
//! cancellable polling loop that drives a task to a terminal state, the
//! best-effort persister that records finished artifacts, and the
//! [`service::GenerationService`] tying the three together.

pub mod api;
pub mod gateway;
pub mod messages;
pub mod persister;
pub mod poller;
pub mod service;
