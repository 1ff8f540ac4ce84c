pub mod headless;
pub mod objects;
pub mod proxy;
