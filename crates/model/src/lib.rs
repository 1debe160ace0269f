//! The protocol between a conversation client and its completion backend.
//!
//! This crate describes what travels over the wire (messages and the
//! completion request) and the contract a completion backend must fulfil.
//! Backends such as an HTTP route or a scripted fake for tests implement
//! [`CompletionProvider`], so the conversation controller never needs to
//! know which one it talks to.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod message;
mod provider;

pub use error::*;
pub use message::*;
pub use provider::*;
