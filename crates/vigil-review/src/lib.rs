//! The Vigil review pipeline: fetch a pull request's diff, generate LLM
//! feedback per file, anchor it to diff positions, and publish it back.
//!
//! Components run strictly forward: GitHub fetcher, review generator,
//! position mapper, publisher. No component calls back into an earlier one.

pub mod github;
pub mod llm;
pub mod pipeline;
pub mod position;
pub mod prompt;
