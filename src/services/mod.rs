pub mod recommendations;
pub mod resolver;
pub mod scoring;

pub use recommendations::recommend;
pub use resolver::{resolve_title, resolve_title_cached};
