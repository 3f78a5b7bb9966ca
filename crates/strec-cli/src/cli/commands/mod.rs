mod clean;
mod run;
mod streams;

pub use clean::run_clean;
pub use run::run_capture;
pub use streams::run_streams;
