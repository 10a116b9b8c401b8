pub mod analyzers;
pub mod clean;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod render;
