//! Business logic services

pub mod branches;
pub mod durations;
pub mod geo;
pub mod matching;
pub mod routing;
