use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::surface::cpu::CpuSurface;
use crate::tracer::job::Job;
use crate::tracer::worker::Worker;

/// Each `Tracer` runs on its own thread. The `Simulator` interacts with the Tracer object, which
/// in turn interacts with the underlying thread.
pub struct Tracer {
    id: usize,
    photons_to_trace: usize,
    remaining: Arc<AtomicUsize>,
    handle: JoinHandle<CpuSurface>,
}

impl Tracer {
    /// Creates the tracer and starts running.
    pub fn new(id: usize, job: Job) -> io::Result<Tracer> {
        let photons_to_trace = job.photons_to_trace;
        // Counts down from the full budget, so a tracer never reads as done before it started.
        let remaining = Arc::new(AtomicUsize::new(photons_to_trace));

        let remaining_clone = remaining.clone();
        let handle = thread::Builder::new()
            .name(format!("tracer-{}", id))
            .spawn(move || run_tracer(job, remaining_clone))?;

        Ok(Tracer {
            id: id,
            photons_to_trace: photons_to_trace,
            remaining: remaining,
            handle: handle,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn photons_to_trace(&self) -> usize {
        self.photons_to_trace
    }

    /// Share of the budget still in flight, from 1 down to 0.
    pub fn remaining_fraction(&self) -> f64 {
        if self.photons_to_trace == 0 {
            return 0.0;
        }
        self.remaining() as f64 / self.photons_to_trace as f64
    }

    /// True once every photon is gone. Joining is then bounded by the thread returning its
    /// surface.
    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }

    /// Waits for the thread and hands back its surface. A tracer that panicked has nothing to
    /// give back.
    pub fn join(self) -> Option<CpuSurface> {
        match self.handle.join() {
            Ok(surface) => Some(surface),
            Err(_) => {
                error!("tracer {} panicked, its photons are lost", self.id);
                None
            }
        }
    }
}

/// Zeroes the remaining count when the tracer thread ends, including when it unwinds, so a
/// panicked tracer still reads as done and gets joined.
struct Finished(Arc<AtomicUsize>);

impl Drop for Finished {
    fn drop(&mut self) {
        self.0.store(0, Ordering::Release);
    }
}

/// Main tracer function, running on the tracer thread.
fn run_tracer(job: Job, remaining: Arc<AtomicUsize>) -> CpuSurface {
    let _finished = Finished(remaining.clone());
    let surface = CpuSurface::new(job.width, job.height);
    let photons = job.photons_to_trace;
    let surface = Worker::new(job, surface, remaining).execute();
    debug!("{} finished {} photons", thread::current().name().unwrap_or("tracer"), photons);
    surface
}
