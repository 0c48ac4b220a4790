use std::collections::VecDeque;

use crate::pose::{Landmark, LandmarkFrame, LandmarkIndex};

/// Sliding-window mean filter over raw landmark frames
///
/// Position: per-component mean over the slots where the point is present
/// Visibility: passed through from the newest frame
/// A point missing from the newest frame is missing from the output.
pub struct LandmarkSmoother {
    window: usize,
    buffer: VecDeque<LandmarkFrame>,
}

impl LandmarkSmoother {
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

    pub fn push(&mut self, frame: LandmarkFrame) -> LandmarkFrame {
        if self.buffer.is_empty() {
            // Seed the whole window with the first frame so there is no warm-up lag
            for _ in 1..self.window {
                self.buffer.push_back(frame.clone());
            }
        }
        self.buffer.push_back(frame);
        while self.buffer.len() > self.window {
            self.buffer.pop_front();
        }

        let Some(latest) = self.buffer.back() else {
            return LandmarkFrame::empty();
        };

        let mut out = LandmarkFrame::empty();
        for i in 0..LandmarkIndex::COUNT {
            let Some(current) = latest.landmarks[i] else {
                continue;
            };
            let mut sum = [0.0f32; 3];
            let mut n = 0u32;
            for lm in self.buffer.iter().filter_map(|f| f.landmarks[i]) {
                sum[0] += lm.x;
                sum[1] += lm.y;
                sum[2] += lm.z;
                n += 1;
            }
            let n = n as f32;
            out.landmarks[i] = Some(Landmark::new(
                sum[0] / n,
                sum[1] / n,
                sum[2] / n,
                current.visibility,
            ));
        }
        out
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
