pub mod logger;
pub mod model;
pub mod prompt;
pub mod report;
pub mod runner;
pub mod worker;

pub use model::{Config, Outcome, Summary, Target, WorkerReport};
pub use runner::run;
