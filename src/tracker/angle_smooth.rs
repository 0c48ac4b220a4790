use std::collections::{BTreeMap, VecDeque};

use super::angle::AngleSet;
use super::joints::Joint;

/// Sliding-window mean filter over per-frame joint angles
///
/// A joint is averaged only over the frames that contain it, so a briefly
/// occluded joint keeps its recent value instead of dropping toward zero.
/// Joints that never appeared in the window are absent.
pub struct AngleSmoother {
    window: usize,
    buffer: VecDeque<AngleSet>,
}

impl AngleSmoother {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            buffer: VecDeque::with_capacity(window),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn push(&mut self, angles: AngleSet) -> AngleSet {
        if self.buffer.is_empty() {
            for _ in 1..self.window {
                self.buffer.push_back(angles.clone());
            }
        }
        self.buffer.push_back(angles);
        while self.buffer.len() > self.window {
            self.buffer.pop_front();
        }

        let mut sums: BTreeMap<Joint, (f32, u32)> = BTreeMap::new();
        for set in &self.buffer {
            for (&joint, &angle) in set {
                let entry = sums.entry(joint).or_insert((0.0, 0));
                entry.0 += angle;
                entry.1 += 1;
            }
        }
        sums.into_iter()
            .map(|(joint, (sum, n))| (joint, sum / n as f32))
            .collect()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
