//! Prompt domain
//!
//! Templates for the conversation prompt and the progressive summary used
//! by memory compaction.

mod template;

pub use template::PromptTemplate;
