pub mod cancel;
pub mod capture;
pub mod config;
pub mod job;
pub mod logging;
pub mod naming;
pub mod reaper;
pub mod schedule;
pub mod supervisor;
