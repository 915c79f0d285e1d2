mod resolver;
mod strategy;

pub use resolver::FetchResolver;
pub use strategy::{Strategy, default_strategies};
