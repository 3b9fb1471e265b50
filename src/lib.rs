//! Trigger content analysis service.
//!
//! Narrative text is split into chunks and a generative model judges each
//! chunk against a fixed set of sensitive content categories. The per-chunk
//! verdicts are folded into a per-category report.

pub mod api;
pub mod app;
pub mod model;
pub mod service;
