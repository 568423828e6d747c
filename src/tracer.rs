//! Photon transport. A `Job` describes one thread's share of a render, a `Worker` simulates it
//! and a `Tracer` runs that worker on its own thread.

pub mod job;
#[allow(clippy::module_inception)]
mod tracer;
pub mod worker;

pub use self::job::{Job, JobProducer};
pub use self::tracer::Tracer;
pub use self::worker::Worker;
