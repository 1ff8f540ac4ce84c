pub mod cache;
pub mod edges;
pub mod flat;
pub mod nested;
pub mod node;
pub mod pipeline;
pub mod scale;
pub mod strategy;
