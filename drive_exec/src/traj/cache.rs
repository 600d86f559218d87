//! On-disk trajectory cache
//!
//! Generating a trajectory can be slow, so generated trajectories are written
//! to `<dir>/<key>.wpilib.json` where `<key>` is the spec's cache key. Later
//! requests for the same spec load the file instead.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;

use super::{TrajError, Trajectory, TrajectoryGenerator, TrajectorySpec};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct TrajectoryCache {
    dir: PathBuf,
    generator: Box<dyn TrajectoryGenerator>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryCache {
    pub fn new<P: Into<PathBuf>>(dir: P, generator: Box<dyn TrajectoryGenerator>) -> Self {
        Self {
            dir: dir.into(),
            generator,
        }
    }

    /// Path of the cache file for the given spec.
    pub fn path_for(&self, spec: &TrajectorySpec) -> PathBuf {
        self.dir.join(format!("{}.wpilib.json", spec.cache_key()))
    }
}

impl TrajectoryGenerator for TrajectoryCache {
    /// Load the trajectory from the cache, or generate and cache it.
    ///
    /// A cache file which can't be read is regenerated and overwritten. A
    /// failure to write the cache isn't an error, the trajectory is still
    /// returned.
    fn generate(&self, spec: &TrajectorySpec) -> Result<Trajectory, TrajError> {
        let path = self.path_for(spec);

        if path.exists() {
            match Trajectory::load(&path) {
                Ok(t) => return Ok(t),
                Err(e) => warn!(
                    "Could not load cached trajectory {}, regenerating: {}",
                    path.display(),
                    e
                ),
            }
        }
        else {
            info!("Trajectory {} not cached, generating", path.display());
        }

        let start = Instant::now();
        let trajectory = self.generator.generate(spec)?;

        match trajectory.save(&path) {
            Ok(_) => info!(
                "Generated and cached trajectory in {} ms",
                start.elapsed().as_millis()
            ),
            Err(e) => warn!("Could not cache trajectory at {}: {}", path.display(), e),
        }

        Ok(trajectory)
    }
}
