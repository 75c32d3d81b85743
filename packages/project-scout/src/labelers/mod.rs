//! Attribute labelers used when a page carries no structured attributes.

pub mod rules;
pub mod seeded;

pub use rules::RuleLabeler;
pub use seeded::SeededLabeler;
