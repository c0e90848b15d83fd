// One module per task kind. Each defines its result shapes, its `Task` impl
// (prompt building + normalization) and its orchestrator.
// All model calls go through the pipeline; no direct provider calls here.

pub mod analytics;
pub mod communication;
pub mod handlers;
pub mod insights;
pub mod prompts;
pub mod questions;
