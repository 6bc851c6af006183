// Domain layer - Core types and pure rules

pub mod errors;
pub mod model;
pub mod rules;
