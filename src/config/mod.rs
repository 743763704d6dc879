pub mod generator;
pub mod pipeline;

pub use generator::GeneratorConfig;
pub use pipeline::PipelineConfig;
