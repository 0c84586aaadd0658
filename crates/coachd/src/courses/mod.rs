//! Course catalog loading, skill-gap matching and learning-path assembly.

pub mod catalog;
pub mod matching;
pub mod path;
