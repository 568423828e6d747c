use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use crate::common::scene::Space;
use crate::error::SessionError;
use crate::loader;
use crate::simulator::{RenderSettings, Simulator};

/// What a driver holds on to: the current scene and the simulator rendering it. Scene changes
/// and new renders are refused while a render is in flight, since tracers share the scene and
/// merge into the simulator's image.
pub struct Session {
    scene: Arc<Space>,
    simulator: Simulator,
    settings: RenderSettings,
}

impl Session {
    pub fn new(settings: RenderSettings) -> Session {
        Session {
            scene: Arc::new(Space::default()),
            simulator: Simulator::from_settings(&settings),
            settings: settings,
        }
    }

    pub fn scene(&self) -> &Space {
        &self.scene
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.simulator
    }

    pub fn is_rendering(&self) -> bool {
        !self.simulator.is_done()
    }

    /// Replaces the scene with `source`. On any error the current scene is kept as it was.
    pub fn load_scene(&mut self, source: &str) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let scene = loader::load_scene(source).map_err(|err| {
            warn!("scene rejected: {}", err);
            err
        })?;
        self.replace_scene(scene);
        Ok(())
    }

    pub fn load_scene_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let scene = loader::load_scene_file(path.as_ref()).map_err(|err| {
            warn!("scene rejected: {}", err);
            err
        })?;
        info!("loaded scene {}", path.as_ref().display());
        self.replace_scene(scene);
        Ok(())
    }

    /// Sets a scene built in code.
    pub fn set_scene(&mut self, scene: Space) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.replace_scene(scene);
        Ok(())
    }

    /// Clears the image and starts rendering the current scene with the session's settings.
    pub fn start_render(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.simulator.resize(self.settings.width, self.settings.height);
        self.simulator.clear();
        self.simulator
            .start_rendering(&self.scene, self.settings.photons, self.settings.threads)
            .map_err(SessionError::Spawn)
    }

    /// Polls the simulator; see `Simulator::update`.
    pub fn update(&mut self) -> f64 {
        self.simulator.update()
    }

    /// Writes the image at full resolution. The format follows the file extension.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<(), SessionError> {
        let path = path.as_ref();
        self.simulator.draw(0, 0).save(path).map_err(|source| SessionError::Export {
            path: path.to_path_buf(),
            source: source,
        })?;
        info!("exported {}", path.display());
        Ok(())
    }

    fn replace_scene(&mut self, scene: Space) {
        self.scene = Arc::new(scene);
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.is_rendering() {
            return Err(SessionError::Busy);
        }
        Ok(())
    }
}
