//! Core services: attempt lifecycle, answer flagging, scoring, adaptive
//! question materialization, completion rollup, and the expiry scheduler.

pub mod cohort;
pub mod completion;
pub mod flagger;
pub mod lifecycle;
pub mod materializer;
pub mod scheduler;
pub mod scorer;
