//! Tick-driven game loop: movers advance, collectors fire, events resolve.
//!
//! Everything is single-threaded and ordered: collectors run in spawn order,
//! each one's destruction cascade resolves completely and its events are
//! drained before the next collector moves. Rendering layers consume the
//! events a tick returns; the core never blocks on them.

use log::{debug, info};

use crate::collector::{Collector, CollectorId};
use crate::config::LevelCollectorsConfig;
use crate::events::{EventBus, GameplayEvent};
use crate::grid::PaintingGrid;
use crate::path::PathMover;

/// One collector bound to its path.
pub struct CollectorRig {
    pub collector: Collector,
    pub mover: PathMover,
}

pub struct Simulation {
    grid: PaintingGrid,
    rigs: Vec<CollectorRig>,
    bus: EventBus,
}

impl Simulation {
    pub fn new(grid: PaintingGrid) -> Self {
        Self {
            grid,
            rigs: Vec::new(),
            bus: EventBus::new(),
        }
    }

    pub fn grid(&self) -> &PaintingGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut PaintingGrid {
        &mut self.grid
    }

    pub fn collectors(&self) -> impl Iterator<Item = &Collector> {
        self.rigs.iter().map(|rig| &rig.collector)
    }

    pub fn collector(&self, id: CollectorId) -> Option<&Collector> {
        self.collectors().find(|c| c.id == id)
    }

    pub fn add_collector(&mut self, collector: Collector, mover: PathMover) {
        self.rigs.push(CollectorRig { collector, mover });
    }

    /// Spawns one rig per collector record, in the config's column-major
    /// order, which also assigns the collector ids. The `connected` lists are
    /// applied in both directions, so linkage ends up symmetric no matter
    /// which side declared it.
    pub fn spawn_collectors(
        &mut self,
        level: &LevelCollectorsConfig,
        mut make_mover: impl FnMut(u32) -> PathMover,
    ) {
        let base = self.rigs.len() as u32;
        let mut links: Vec<(CollectorId, CollectorId)> = Vec::new();
        for (offset, config) in level.flattened().enumerate() {
            let id = CollectorId(base + offset as u32);
            for &other in &config.connected {
                links.push((id, CollectorId(base + other)));
            }
            self.add_collector(Collector::from_config(id, config), make_mover(id.0));
        }
        for (a, b) in links {
            self.link_collectors(a, b);
        }
    }

    fn link_collectors(&mut self, a: CollectorId, b: CollectorId) {
        for rig in &mut self.rigs {
            if rig.collector.id == a {
                rig.collector.connect(b);
            } else if rig.collector.id == b {
                rig.collector.connect(a);
            }
        }
    }

    /// Advances the whole world by `dt` seconds and returns every gameplay
    /// event that happened, in order.
    pub fn tick(&mut self, dt: f32) -> Vec<GameplayEvent> {
        let mut events = Vec::new();
        for idx in 0..self.rigs.len() {
            let rig = &mut self.rigs[idx];
            rig.mover.advance(dt);
            let sample = rig.mover.sample();
            rig.collector
                .update(sample.position, sample.tangent, &mut self.grid, &mut self.bus);
            self.drain_events(&mut events);
        }
        events
    }

    fn drain_events(&mut self, out: &mut Vec<GameplayEvent>) {
        while let Some(event) = self.bus.pop() {
            debug!("gameplay event: {event:?}");
            if event == GameplayEvent::KeyCollected {
                self.unlock_next_collector();
            }
            out.push(event);
        }
    }

    /// A collected key unlocks the first still-locked collector in spawn
    /// order.
    fn unlock_next_collector(&mut self) {
        if let Some(rig) = self.rigs.iter_mut().find(|rig| rig.collector.locked) {
            info!("key unlocks collector {:?}", rig.collector.id);
            rig.collector.unlock();
        }
    }

    /// Fresh run over the same painting: full magazines, forgotten lanes,
    /// movers back at their path starts.
    pub fn reset_collectors(&mut self) {
        for rig in &mut self.rigs {
            rig.collector.reset();
            rig.mover.set_tf(0.0);
        }
    }
}
