//! The three specialized agents.

pub mod assessor;
pub mod coach;
pub mod matcher;

pub use assessor::AssessorAgent;
pub use coach::CoachAgent;
pub use matcher::MatcherAgent;
