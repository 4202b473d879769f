//! Question answering over the course catalog, with sources.
//!
//! [`RagEngine`] wraps the orchestrator: it runs the question and returns the
//! answer together with the sources that request's tools cited.

mod response;

pub use response::{course_tools, Answer, RagEngine};
