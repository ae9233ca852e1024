use crate::foundation::{
    core::MAX_INSTANCES,
    error::{CubefieldError, CubefieldResult},
    math::lerp,
};

/// Unit-space positions for every live instance: where each one is now, where the current
/// morph started, and where it is heading.
#[derive(Clone, Debug)]
pub struct InstanceState {
    current: Vec<f32>,
    start: Vec<f32>,
    target: Vec<f32>,
    count: usize,
}

impl Default for InstanceState {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceState {
    pub fn new() -> Self {
        Self {
            current: vec![0.0; MAX_INSTANCES * 3],
            start: vec![0.0; MAX_INSTANCES * 3],
            target: vec![0.0; MAX_INSTANCES * 3],
            count: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn current(&self) -> &[f32] {
        &self.current[..self.count * 3]
    }

    pub fn start(&self) -> &[f32] {
        &self.start[..self.count * 3]
    }

    pub fn target(&self) -> &[f32] {
        &self.target[..self.count * 3]
    }

    /// Begin a morph toward `target` (`count * 3` floats) from wherever instances are now.
    ///
    /// Instances that were not live before start at the origin.
    pub fn retarget(&mut self, target: &[f32]) -> CubefieldResult<()> {
        if target.len() % 3 != 0 {
            return Err(CubefieldError::validation(
                "layout target length must be a multiple of 3",
            ));
        }
        let count = target.len() / 3;
        if count > MAX_INSTANCES {
            return Err(CubefieldError::validation(format!(
                "layout target holds {count} instances, capacity is {MAX_INSTANCES}"
            )));
        }

        let kept = self.count.min(count) * 3;
        self.start[..kept].copy_from_slice(&self.current[..kept]);
        self.start[kept..count * 3].fill(0.0);
        self.current[kept..count * 3].fill(0.0);
        self.target[..count * 3].copy_from_slice(target);
        self.count = count;
        Ok(())
    }

    /// Jump straight to `target`, no morph.
    pub fn snap_to(&mut self, target: &[f32]) -> CubefieldResult<()> {
        self.retarget(target)?;
        let n = self.count * 3;
        self.start[..n].copy_from_slice(&self.target[..n]);
        self.current[..n].copy_from_slice(&self.target[..n]);
        Ok(())
    }

    /// Finish the running morph: `start` and `current` both land on `target`.
    pub fn settle(&mut self) {
        let n = self.count * 3;
        self.start[..n].copy_from_slice(&self.target[..n]);
        self.current[..n].copy_from_slice(&self.target[..n]);
    }

    /// Set `current = lerp(start, target, progress)` for every live instance.
    pub fn advance(&mut self, progress: f32) {
        let t = progress.clamp(0.0, 1.0);
        let n = self.count * 3;
        for ((c, s), g) in self.current[..n]
            .iter_mut()
            .zip(&self.start[..n])
            .zip(&self.target[..n])
        {
            *c = lerp(*s, *g, t);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/instances/state.rs"]
mod tests;
