use crate::errors::Error;
use crate::step::{Step, V0_TO_V1, V1_TO_V2};

static BUILTIN_STEPS: [&Step; 2] = [&V0_TO_V1, &V1_TO_V2];

/// The ordered list of known migration steps.
#[derive(Copy, Clone, Debug)]
pub struct Registry {
    steps: &'static [&'static Step],
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            steps: &BUILTIN_STEPS,
        }
    }
}

impl Registry {
    /// A registry over a custom list of steps, ordered by `from`.
    pub fn new(steps: &'static [&'static Step]) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> impl Iterator<Item = &'static Step> {
        let steps: &'static [&'static Step] = self.steps;
        steps.iter().copied()
    }

    /// The step migrating from version `from` to `from + 1`.
    pub fn step(&self, from: u32) -> Option<&'static Step> {
        self.steps().find(|step| step.from == from)
    }

    /// Pick the step for `current -> target`. Only single-version jumps are
    /// supported.
    pub fn select(&self, current: u32, target: u32) -> Result<&'static Step, Error> {
        if current.checked_add(1) != Some(target) {
            return Err(Error::VersionJump { current, target });
        }

        self.step(current).ok_or(Error::MissingStep(current))
    }

    /// Newest version reachable with the registered steps.
    pub fn latest(&self) -> u32 {
        self.steps().map(Step::to).max().unwrap_or(0)
    }
}
