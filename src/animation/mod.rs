pub mod animator;
pub mod deferred;
pub mod ease;
pub mod sampler;
