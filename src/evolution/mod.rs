pub mod renderer;
pub mod session;
