use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::common::scene::Space;
use crate::common::simulation::{random_unit_vector, LightSegment, Photon};
use crate::common::vector::{lerp, reflect, Vector2};
use crate::surface::Surface;
use crate::tracer::job::Job;

/// Closer than this to a surface, a photon is considered to have landed on it.
pub const SURFACE_EPSILON: f64 = 1e-10;

/// Closer than this to a surface, a photon bounces off it.
pub const CONTACT_DISTANCE: f64 = 0.1;

/// Offset along the normal used to find which side of a surface a photon is on.
const NORMAL_PROBE: f64 = 0.05;

/// Simulates one job's photons from emission to extinction, drawing every step onto its own
/// surface. Nothing here is shared with other workers except the read-only scene.
pub struct Worker<S: Surface> {
    job: Job,
    photons: Vec<Photon>,
    surface: S,
    rng: SmallRng,
    remaining: Arc<AtomicUsize>,
}

impl<S: Surface> Worker<S> {
    pub fn new(job: Job, surface: S, remaining: Arc<AtomicUsize>) -> Worker<S> {
        let rng = SmallRng::seed_from_u64(job.seed);
        Worker {
            job: job,
            photons: Vec::new(),
            surface: surface,
            rng: rng,
            remaining: remaining,
        }
    }

    /// Seeds the photons and steps until every one of them is gone.
    pub fn execute(mut self) -> S {
        self.seed();
        while !self.photons.is_empty() {
            self.step();
        }
        self.surface
    }

    pub fn seed(&mut self) {
        self.photons = self.job.seed_photons(&mut self.rng);
        self.retire();
    }

    /// Advances every live photon once, then drops the ones that left the scene or faded out.
    pub fn step(&mut self) {
        let space: &Space = &self.job.scene;
        let scale = Vector2::new(
            self.surface.width() as f64 / space.size.x,
            self.surface.height() as f64 / space.size.y,
        );
        // An empty scene has no distance field; step by the raster width instead.
        let open_step = self.surface.width() as f64;

        for photon in self.photons.iter_mut() {
            let from = photon.position;
            if !advance(photon, space, open_step, &mut self.rng) {
                continue;
            }
            self.surface.draw_segment(&LightSegment {
                from: from * scale,
                to: photon.position * scale,
                color: photon.color,
            });
        }

        self.retire();
    }

    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn retire(&mut self) {
        let space: &Space = &self.job.scene;
        self.photons.retain(|p| !p.is_extinguished() && space.contains(p.position));
        self.remaining.store(self.photons.len(), Ordering::Release);
    }
}

/// Moves `photon` one distance field step, bouncing it off whatever it is touching. Returns
/// false when the photon landed exactly on a surface and was extinguished instead.
pub fn advance<R: Rng>(photon: &mut Photon, space: &Space, open_step: f64, rng: &mut R) -> bool {
    let (closest, distance) = match space.closest_object(photon.position) {
        (Some(index), distance) => (Some(index), distance),
        (None, _) => (None, open_step),
    };

    if distance < SURFACE_EPSILON {
        photon.extinguish();
        return false;
    }

    if let Some(index) = closest {
        if distance < CONTACT_DISTANCE && photon.last_collision != Some(index) {
            let object = &space.objects[index];
            let normal = object.shape.normal_at(photon.position);

            photon.color = photon.color * object.material.reflectivity;
            photon.direction = reflect(photon.direction, normal);

            let roughness = object.material.roughness;
            if roughness != 0.0 {
                // The shape's normal has a fixed orientation; point it away from the surface.
                let probe = object.shape.distance_to(photon.position + normal * NORMAL_PROBE);
                let outward = if probe < distance { -normal } else { normal };
                let scattered = (outward + random_unit_vector(rng)).normalize();
                photon.direction = lerp(photon.direction, scattered, roughness).normalize();
            }

            photon.last_collision = Some(index);
        }
    }

    photon.position += photon.direction * distance;
    true
}
