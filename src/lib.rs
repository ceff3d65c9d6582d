pub mod config;
pub mod extract;
pub mod fetch;
pub mod groups;
pub mod http;
pub mod normalize;
pub mod template;
pub mod usage;
