//! Prompt builders for the experimental "Labs" tools. Pure functions only;
//! the routes own the model calls.

pub mod eli5;
pub mod stoic;
