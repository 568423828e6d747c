use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::color::Color;
use crate::common::scene::{Space, Spawner, SpawnerKind};
use crate::common::simulation::{random_in_unit_disk, random_unit_vector, Photon};
use crate::common::vector::{lerp, Vector2};

/// Represents a unit of work for a single tracer to process.
#[derive(Clone, Debug)]
pub struct Job {
    /// The scene at the time the Job was created. Shared with the other tracers of the render.
    pub scene: Arc<Space>,

    /// The number of photons this Job is budgeted for. Spawner rounding may seed fewer.
    pub photons_to_trace: usize,

    /// Resolution of the surface the photons are drawn onto.
    pub width: usize,
    pub height: usize,

    /// Seeds the tracer's private random stream.
    pub seed: u64,
}

impl Job {
    /// Emits this job's photons from the scene's spawners. Each spawner gets
    /// `floor(ratio * photons_to_trace)` photons, so the rounding remainder is never emitted.
    pub fn seed_photons<R: Rng>(&self, rng: &mut R) -> Vec<Photon> {
        let mut photons = Vec::with_capacity(self.photons_to_trace);
        for spawner in self.scene.spawners.iter() {
            let amount = (spawner.ratio * self.photons_to_trace as f64) as usize;
            for _ in 0..amount {
                photons.push(emit(spawner, rng));
            }
        }
        photons
    }
}

fn emit<R: Rng>(spawner: &Spawner, rng: &mut R) -> Photon {
    let position = match spawner.kind {
        SpawnerKind::Square => {
            let half = spawner.size * 0.5;
            Vector2::new(
                rng.gen_range((spawner.position.x - half.x)..=(spawner.position.x + half.x)),
                rng.gen_range((spawner.position.y - half.y)..=(spawner.position.y + half.y)),
            )
        }
        SpawnerKind::Circle => spawner.position + random_in_unit_disk(rng) * spawner.size.x,
    };

    // Partial spreads are deliberately left unnormalised.
    let mut direction = random_unit_vector(rng);
    if spawner.spread < 1.0 {
        direction = lerp(spawner.direction, direction, spawner.spread);
    }

    let color = match spawner.wavelength {
        Some((min, max)) => spawner.color * Color::from_wavelength(rng.gen_range(min..=max)),
        None => spawner.color,
    };

    Photon::new(position, direction, color)
}

/// Creates jobs for the pool of tracers to process.
pub struct JobProducer {
    seeds: StdRng,
}

impl JobProducer {
    pub fn new() -> JobProducer {
        JobProducer {
            seeds: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> JobProducer {
        JobProducer {
            seeds: StdRng::seed_from_u64(seed),
        }
    }

    /// Splits `total_photons` evenly across `tracer_count` jobs. The remainder of the division is
    /// dropped.
    pub fn split(
        &mut self,
        scene: &Arc<Space>,
        total_photons: usize,
        tracer_count: usize,
        width: usize,
        height: usize,
    ) -> Vec<Job> {
        let per_tracer = total_photons / tracer_count.max(1);
        (0..tracer_count)
            .map(|_| Job {
                scene: scene.clone(),
                photons_to_trace: per_tracer,
                width: width,
                height: height,
                seed: self.seeds.gen(),
            })
            .collect()
    }
}

impl Default for JobProducer {
    fn default() -> JobProducer {
        JobProducer::new()
    }
}
