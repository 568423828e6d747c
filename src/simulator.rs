//! Batch rendering: splits a photon budget across tracer threads and gathers what they draw.

pub mod preview;

use std::io;
use std::mem;
use std::sync::Arc;

use image::RgbImage;
use log::{info, warn};

use crate::common::scene::Space;
use crate::surface::cpu::CpuSurface;
use crate::surface::Surface;
use crate::tracer::{JobProducer, Tracer};

use self::preview::PreviewCache;

/// Everything needed to kick off a render, with the values a driver starts from.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub width: usize,
    pub height: usize,
    pub photons: usize,
    pub threads: usize,
    pub exposure: f64,
    /// Fixes the tracers' random streams. `None` draws them from entropy.
    pub seed: Option<u64>,
}

impl Default for RenderSettings {
    fn default() -> RenderSettings {
        RenderSettings {
            width: 800,
            height: 600,
            photons: 1_000_000,
            threads: 4,
            exposure: 1.0,
            seed: None,
        }
    }
}

/// Owns the accumulated image and the tracers currently adding to it.
///
/// Starting a render while another is still in flight is not checked here; both would merge into
/// the same buffer. `Session` guards against it.
pub struct Simulator {
    pixels: CpuSurface,
    tracers: Vec<Tracer>,
    /// Tracer count at the start of the render. Progress is averaged over this, not over the
    /// tracers still running, so it never goes backwards.
    initial_tracer_count: usize,
    exposure_multiplier: f64,
    dirty: bool,
    preview: PreviewCache,
    jobs: JobProducer,
}

impl Simulator {
    pub fn new(width: usize, height: usize) -> Simulator {
        Simulator {
            pixels: CpuSurface::new(width, height),
            tracers: Vec::new(),
            initial_tracer_count: 0,
            exposure_multiplier: 1.0,
            dirty: true,
            preview: PreviewCache::new(),
            jobs: JobProducer::new(),
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Simulator {
        let mut simulator = Simulator::new(settings.width, settings.height);
        simulator.set_exposure_multiplier(settings.exposure);
        simulator.set_seed(settings.seed);
        simulator
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    /// The raw accumulated radiance.
    pub fn pixels(&self) -> &CpuSurface {
        &self.pixels
    }

    /// Splits `photons` evenly over `thread_count` tracers (dropping the remainder) and starts
    /// them. A count of 0 is treated as 1.
    pub fn start_rendering(&mut self, scene: &Arc<Space>, photons: usize, thread_count: usize) -> io::Result<()> {
        let thread_count = if thread_count == 0 {
            warn!("asked to render on 0 threads, using 1");
            1
        } else {
            thread_count
        };

        let jobs = self.jobs.split(scene, photons, thread_count, self.width(), self.height());
        let per_tracer = photons / thread_count;
        info!(
            "rendering {} photons on {} threads ({} each) at {}x{}",
            per_tracer * thread_count,
            thread_count,
            per_tracer,
            self.width(),
            self.height()
        );

        self.initial_tracer_count = self.tracers.len() + thread_count;
        for (id, job) in jobs.into_iter().enumerate() {
            match Tracer::new(id, job) {
                Ok(tracer) => self.tracers.push(tracer),
                Err(err) => {
                    // The tracers already started run to completion and are merged as usual.
                    self.initial_tracer_count = self.tracers.len();
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.tracers.is_empty()
    }

    /// Merges every finished tracer into the image and returns the fraction of the render done,
    /// from 0 to 1. Meant to be polled; only blocks to join tracers that already finished.
    pub fn update(&mut self) -> f64 {
        if self.initial_tracer_count == 0 {
            return 1.0;
        }

        let mut remaining = 0.0;
        for tracer in mem::replace(&mut self.tracers, Vec::new()) {
            // One read decides both the progress and whether to merge, so a render that reports
            // done has also reported 1.0.
            let fraction = tracer.remaining_fraction();
            if fraction > 0.0 {
                remaining += fraction;
                self.tracers.push(tracer);
            } else {
                self.merge(tracer);
            }
        }

        if self.tracers.is_empty() {
            info!("render finished");
        }
        1.0 - remaining / self.initial_tracer_count as f64
    }

    fn merge(&mut self, tracer: Tracer) {
        let id = tracer.id();
        let surface = match tracer.join() {
            Some(surface) => surface,
            None => return,
        };
        match self.pixels.merge(&surface) {
            Ok(()) => {
                self.mark_dirty();
                info!("merged tracer {}", id);
            }
            Err(err) => warn!("dropping tracer {} after a resize: {}", id, err),
        }
    }

    /// Tone maps the whole image into `width` x `height` with nearest neighbour sampling. A zero
    /// dimension means the image's own resolution.
    pub fn draw(&self, width: u32, height: u32) -> RgbImage {
        let (width, height) = if width == 0 || height == 0 {
            (self.width() as u32, self.height() as u32)
        } else {
            (width, height)
        };
        preview::resample(&self.pixels, width, height, self.exposure_multiplier)
    }

    /// A `width` x `height` view of the image magnified by `zoom`, cached until something changes.
    /// The view always starts at the image's top left corner; placing it inside a larger target
    /// is up to the caller. A zoom that is not a positive number is treated as 1.
    pub fn draw_preview(&mut self, width: u32, height: u32, zoom: f64) -> &RgbImage {
        let zoom = if zoom > 0.0 && zoom.is_finite() { zoom } else { 1.0 };
        if self.dirty {
            self.preview.invalidate();
            self.dirty = false;
        }
        self.preview.render(&self.pixels, width, height, zoom, self.exposure_multiplier)
    }

    /// The largest zoom at which the whole image fits in `width` x `height`.
    pub fn fit_zoom(&self, width: u32, height: u32) -> f64 {
        if self.width() == 0 || self.height() == 0 {
            return 1.0;
        }
        (width as f64 / self.width() as f64).min(height as f64 / self.height() as f64)
    }

    /// Reallocates the image if the resolution changed. Tracers already running keep their own
    /// resolution and are dropped at merge time.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width() && height == self.height() {
            return;
        }
        self.pixels = CpuSurface::new(width, height);
        self.mark_dirty();
    }

    pub fn clear(&mut self) {
        self.pixels.clear();
        self.mark_dirty();
    }

    pub fn exposure_multiplier(&self) -> f64 {
        self.exposure_multiplier
    }

    pub fn set_exposure_multiplier(&mut self, exposure: f64) {
        self.exposure_multiplier = exposure;
        self.mark_dirty();
    }

    /// Seeds future renders. Takes effect at the next `start_rendering`.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.jobs = match seed {
            Some(seed) => JobProducer::with_seed(seed),
            None => JobProducer::new(),
        };
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
