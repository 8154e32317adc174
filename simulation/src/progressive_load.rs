use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use log::{debug, error};

use crate::SimulationError;

/// Outcome of one step of a load task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskProgress {
    Done,
    /// The task yielded and wants to be called again; `percent` is its own
    /// progress.
    Pending { percent: u8 },
}

/// Progress reported after a [`ProgressiveLoader::progressive_load`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub percent: u8,
    /// Description of the task that will run next, if any.
    pub description: Option<String>,
    pub done: bool,
}

type LoadTaskFn<C> = Box<dyn FnMut(&mut C) -> Result<TaskProgress, SimulationError>>;

struct LoadTask<C> {
    description: String,
    estimated_duration: Duration,
    run: LoadTaskFn<C>,
}

/// Runs registered load tasks a slice at a time so the caller can keep
/// drawing a loading screen.
pub struct ProgressiveLoader<C> {
    tasks: VecDeque<LoadTask<C>>,
    total_estimated: Duration,
    completed_estimated: Duration,
    current_task_percent: u8,
}

impl<C> Default for ProgressiveLoader<C> {
    fn default() -> Self {
        Self {
            tasks: VecDeque::new(),
            total_estimated: Duration::ZERO,
            completed_estimated: Duration::ZERO,
            current_task_percent: 0,
        }
    }
}

impl<C> ProgressiveLoader<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task. `estimated_duration` only weighs the task in the
    /// reported percentage.
    pub fn register_task<F>(&mut self, description: &str, estimated_duration: Duration, task: F)
    where
        F: FnMut(&mut C) -> Result<TaskProgress, SimulationError> + 'static,
    {
        self.total_estimated += estimated_duration;
        self.tasks.push_back(LoadTask {
            description: description.to_string(),
            estimated_duration,
            run: Box::new(task),
        });
    }

    pub fn remaining_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_done(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Runs tasks until `budget` is spent or none remain. At least one task
    /// step runs per call. A failing task aborts the whole load.
    pub fn progressive_load(
        &mut self,
        context: &mut C,
        budget: Duration,
    ) -> Result<LoadProgress, SimulationError> {
        let start = Instant::now();
        while let Some(task) = self.tasks.front_mut() {
            match (task.run)(context) {
                Ok(TaskProgress::Done) => {
                    debug!("Load task '{}' finished", task.description);
                    self.completed_estimated += task.estimated_duration;
                    self.current_task_percent = 0;
                    self.tasks.pop_front();
                }
                Ok(TaskProgress::Pending { percent }) => {
                    self.current_task_percent = percent.min(100);
                }
                Err(err) => {
                    error!("Load task '{}' failed: {}", task.description, err);
                    self.tasks.clear();
                    return Err(err);
                }
            }
            if start.elapsed() >= budget {
                break;
            }
        }
        Ok(self.progress())
    }

    pub fn progress(&self) -> LoadProgress {
        let done = self.tasks.is_empty();
        let percent = if done {
            100
        } else if self.total_estimated.is_zero() {
            0
        } else {
            let current = self
                .tasks
                .front()
                .map(|task| task.estimated_duration.as_nanos())
                .unwrap_or_default()
                * u128::from(self.current_task_percent);
            let weighted = self.completed_estimated.as_nanos() * 100 + current;
            (weighted / self.total_estimated.as_nanos()).min(99) as u8
        };
        LoadProgress {
            percent,
            description: self.tasks.front().map(|task| task.description.clone()),
            done,
        }
    }
}
