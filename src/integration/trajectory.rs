//! Per-identity center history that survives identity replacement.

use std::collections::{HashMap, VecDeque};

use crate::tracker::{FrameOutput, Identity};

/// Bounded trail of box centers for every live track.
///
/// Feed it every [`FrameOutput`]; histories are re-keyed through the frame's
/// remap so a detector correction does not orphan the trail.
#[derive(Debug, Clone)]
pub struct TrajectoryStore {
    max_points: usize,
    trails: HashMap<Identity, VecDeque<(f32, f32)>>,
}

impl TrajectoryStore {
    pub fn new(max_points: usize) -> Self {
        Self {
            max_points: max_points.max(1),
            trails: HashMap::new(),
        }
    }

    pub fn trail(&self, identity: &Identity) -> Option<&VecDeque<(f32, f32)>> {
        self.trails.get(identity)
    }

    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    pub fn clear(&mut self) {
        self.trails.clear();
    }

    pub fn record(&mut self, output: &FrameOutput) {
        for (new, old) in output.remap.iter() {
            if let Some(trail) = self.trails.remove(old) {
                self.trails.insert(*new, trail);
            }
        }

        let mut next = HashMap::with_capacity(output.objects.len());
        for object in &output.objects {
            let mut trail = self.trails.remove(&object.identity).unwrap_or_default();
            trail.push_back(object.center());
            while trail.len() > self.max_points {
                trail.pop_front();
            }
            next.insert(object.identity, trail);
        }
        self.trails = next;
    }
}
