//! Interview core: phase machine, response classifier, topic extractor,
//! prompt assembler, and the orchestrator that ties them together, plus the
//! HTTP handlers and the persistence sink.
//!
//! The classifier, phase machine, topic extractor, and prompt assembler are
//! pure and synchronous; the orchestrator is async only because it awaits the
//! generation seam, and `handlers`/`persistence` own all I/O.

pub mod bank;
pub mod classifier;
pub mod handlers;
pub mod orchestrator;
pub mod persistence;
pub mod phase;
pub mod prompts;
pub mod session;
pub mod topics;
