pub mod runner;

pub use runner::WorkflowRunner;
