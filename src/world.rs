use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::api::{BroadphaseApi, Updatable};
use crate::config::WorldConfig;
use crate::error::{PhysicsError, Result};
use crate::grid::{GridStats, SpatialGrid};
use crate::object::{ObjectDesc, SpatialObject};
use crate::positional::Positions;
use crate::shape::{Aabb, Shape};
use crate::spatial::{CollisionBox, SpatialId};
use crate::types::*;

/// Categories stepped by [`World::update`], in order.
pub const UPDATE_ORDER: [SpatialCategory; 4] = [
    SpatialCategory::DynamicEnv,
    SpatialCategory::Living,
    SpatialCategory::Projectile,
    SpatialCategory::Particle,
];

/// Owns every spatial, the position arena and the broad-phase grid.
///
/// Environment boxes (static or dynamic) block movers; objects move each
/// tick and are resolved against the environment only. Dynamic environment
/// moves first, by the velocity set with [`World::set_environment_motion`],
/// and is never swept.
pub struct World {
    cfg: WorldConfig,
    positions: Positions,
    grid: SpatialGrid,
    environment: HashMap<SpatialId, CollisionBox>,
    objects: HashMap<SpatialId, SpatialObject>,
    env_motion: HashMap<SpatialId, Vector>,
    categories: HashMap<SpatialCategory, Vec<SpatialId>>,
    tick: u64,
}

impl World {
    pub fn new(cfg: WorldConfig) -> Result<Self> {
        let grid = SpatialGrid::from_config(&cfg)?;
        debug!("world {:?}..{:?}, cell size {}", cfg.bounds_min, cfg.bounds_max, cfg.cell_size);
        Ok(Self {
            cfg,
            positions: Positions::new(),
            grid,
            environment: HashMap::new(),
            objects: HashMap::new(),
            env_motion: HashMap::new(),
            categories: HashMap::new(),
            tick: 0,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.cfg
    }

    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn grid_stats(&self) -> GridStats {
        self.grid.stats()
    }

    /// Completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Adds immovable level geometry.
    pub fn add_static(&mut self, shape: Shape) -> SpatialId {
        self.add_environment(shape, SpatialCategory::StaticEnv)
    }

    /// Adds environment geometry that may be moved between ticks.
    pub fn add_dynamic(&mut self, shape: Shape) -> SpatialId {
        self.add_environment(shape, SpatialCategory::DynamicEnv)
    }

    /// Adds a mover. Environment categories go through [`World::add_static`]
    /// or [`World::add_dynamic`] instead.
    pub fn add_object(&mut self, desc: ObjectDesc) -> Result<SpatialId> {
        if desc.category.is_environment() {
            return Err(PhysicsError::WrongCategory(desc.category));
        }
        let obj = SpatialObject::new(&mut self.positions, desc)?;
        let id = obj.id();
        self.grid.register(id, &obj.bounds());
        self.categories.entry(obj.spatial.category).or_default().push(id);
        debug!("object {} added as {:?}", id, obj.spatial.category);
        self.objects.insert(id, obj);
        Ok(id)
    }

    /// Drops a spatial, its position subtree and its grid entries.
    pub fn remove(&mut self, id: SpatialId) -> Result<()> {
        let spatial = if let Some(obj) = self.objects.remove(&id) {
            obj.spatial
        } else if let Some(cb) = self.environment.remove(&id) {
            cb.spatial
        } else {
            return Err(PhysicsError::SpatialNotFound(id));
        };
        if spatial.tracking {
            self.grid.unregister(id, &spatial.bounds());
        }
        self.positions.remove(spatial.position)?;
        self.env_motion.remove(&id);
        if let Some(list) = self.categories.get_mut(&spatial.category) {
            list.retain(|&other| other != id);
        }
        debug!("spatial {} removed", id);
        Ok(())
    }

    pub fn contains(&self, id: SpatialId) -> bool {
        self.objects.contains_key(&id) || self.environment.contains_key(&id)
    }

    pub fn object(&self, id: SpatialId) -> Option<&SpatialObject> {
        self.objects.get(&id)
    }

    pub fn environment(&self, id: SpatialId) -> Option<&CollisionBox> {
        self.environment.get(&id)
    }

    /// Ids in `category`, in insertion order.
    pub fn in_category(&self, category: SpatialCategory) -> &[SpatialId] {
        self.categories.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn position_of(&self, id: SpatialId) -> Result<Point> {
        if let Some(obj) = self.objects.get(&id) {
            obj.position(&self.positions)
        } else if let Some(cb) = self.environment.get(&id) {
            cb.spatial.position(&self.positions)
        } else {
            Err(PhysicsError::SpatialNotFound(id))
        }
    }

    pub fn set_motion(&mut self, id: SpatialId, motion: Vector) -> Result<()> {
        self.object_mut(id)?.motion = motion;
        Ok(())
    }

    pub fn set_object_position(&mut self, id: SpatialId, p: Point) -> Result<()> {
        let obj = self.objects.get_mut(&id).ok_or(PhysicsError::SpatialNotFound(id))?;
        obj.set_position(&mut self.positions, &mut self.grid, p)
    }

    /// Moves an environment box by `v`. No sweep is done.
    pub fn move_environment(&mut self, id: SpatialId, v: Vector) -> Result<()> {
        let cb = self.environment.get_mut(&id).ok_or(PhysicsError::SpatialNotFound(id))?;
        let old = cb.bounds();
        if cb.spatial.tracking {
            self.grid.update_moved(id, &old, &old.translated(v));
        }
        cb.move_by(&mut self.positions, v)
    }

    /// Velocity applied to a dynamic environment box at the start of each tick.
    pub fn set_environment_motion(&mut self, id: SpatialId, motion: Vector) -> Result<()> {
        let cb = self.environment.get(&id).ok_or(PhysicsError::SpatialNotFound(id))?;
        if cb.spatial.category != SpatialCategory::DynamicEnv {
            return Err(PhysicsError::WrongCategory(cb.spatial.category));
        }
        if motion == Vector::ZERO {
            self.env_motion.remove(&id);
        } else {
            self.env_motion.insert(id, motion);
        }
        Ok(())
    }

    /// Enables or disables narrow-phase tests against an environment box.
    pub fn set_active(&mut self, id: SpatialId, active: bool) -> Result<()> {
        let cb = self.environment.get_mut(&id).ok_or(PhysicsError::SpatialNotFound(id))?;
        cb.active = active;
        Ok(())
    }

    /// Adds or drops a spatial from the broad-phase index.
    pub fn set_tracking(&mut self, id: SpatialId, tracking: bool) -> Result<()> {
        let spatial = if let Some(obj) = self.objects.get_mut(&id) {
            &mut obj.spatial
        } else if let Some(cb) = self.environment.get_mut(&id) {
            &mut cb.spatial
        } else {
            return Err(PhysicsError::SpatialNotFound(id));
        };
        match (spatial.tracking, tracking) {
            (false, true) => self.grid.register(id, &spatial.bounds()),
            (true, false) => self.grid.unregister(id, &spatial.bounds()),
            _ => {}
        }
        spatial.tracking = tracking;
        Ok(())
    }

    /// Tracked spatials whose bounds overlap `bounds`, sorted.
    pub fn query(&self, bounds: &Aabb) -> Vec<SpatialId> {
        let mut out: Vec<SpatialId> = self
            .grid
            .get_within_bounds(bounds)
            .into_iter()
            .filter(|id| self.bounds_of(*id).is_some_and(|b| b.overlaps(bounds)))
            .collect();
        out.sort_unstable();
        out
    }

    fn bounds_of(&self, id: SpatialId) -> Option<Aabb> {
        self.objects.get(&id).map(|o| o.bounds()).or_else(|| self.environment.get(&id).map(|c| c.bounds()))
    }

    fn add_environment(&mut self, shape: Shape, category: SpatialCategory) -> SpatialId {
        let key = self.positions.insert_root(shape.position());
        let cb = CollisionBox::new(key, shape, category);
        let id = cb.id();
        self.grid.register(id, &cb.bounds());
        self.categories.entry(category).or_default().push(id);
        debug!("environment {} added as {:?}", id, category);
        self.environment.insert(id, cb);
        id
    }

    fn object_mut(&mut self, id: SpatialId) -> Result<&mut SpatialObject> {
        self.objects.get_mut(&id).ok_or(PhysicsError::SpatialNotFound(id))
    }

    fn step(&mut self, id: SpatialId, dt: f64) -> Result<()> {
        if let Some(&v) = self.env_motion.get(&id) {
            return self.move_environment(id, v * dt);
        }
        let Self { positions, grid, environment, objects, .. } = self;
        let Some(obj) = objects.get_mut(&id) else {
            return Ok(());
        };
        if !obj.spatial.tracking {
            return Ok(());
        }
        let plan = obj.sweep(dt, &*grid, environment);
        obj.commit(&plan, positions, grid)
    }
}

impl Updatable for World {
    fn update(&mut self, dt: f64) {
        if dt < 0.0 || !dt.is_finite() {
            warn!("ignoring update with dt={}", dt);
            return;
        }
        for category in UPDATE_ORDER {
            let ids = self.in_category(category).to_vec();
            for id in ids {
                if let Err(e) = self.step(id, dt) {
                    warn!("update of {} failed: {}", id, e);
                }
            }
        }
        self.tick += 1;
        trace!("tick {} done", self.tick);
    }
}
