//! Reward tasks.
//!
//! A fixed list of one-shot tasks, each worth some tokens. Completing a task
//! yields the token grant the game loop should apply; the board itself never
//! touches the session.

use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

use crate::config::TaskConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewardError {
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Task already completed: {0}")]
    AlreadyCompleted(String),
}

/// A task as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub reward: u64,
    pub completed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<TaskConfig>,
    completed: HashSet<String>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<TaskConfig>) -> Self {
        Self {
            tasks,
            completed: HashSet::new(),
        }
    }

    /// Mark a task done and return its token reward.
    pub fn complete(&mut self, task_id: &str) -> Result<u64, RewardError> {
        let task = self
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| RewardError::UnknownTask(task_id.to_string()))?;

        if !self.completed.insert(task.id.clone()) {
            return Err(RewardError::AlreadyCompleted(task.id.clone()));
        }

        info!(task_id, reward = task.reward, "Task completed");
        Ok(task.reward)
    }

    pub fn list(&self) -> Vec<TaskView> {
        self.tasks
            .iter()
            .map(|t| TaskView {
                id: t.id.clone(),
                title: t.title.clone(),
                reward: t.reward,
                completed: self.completed.contains(&t.id),
            })
            .collect()
    }
}
