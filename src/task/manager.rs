#![forbid(unsafe_code)]

use std::fmt;

use tracing::{debug, warn};

use crate::error::TodosError;
use crate::task::model::{Action, Task};
use crate::task::storage::Repository;

pub const EMPTY_MESSAGE: &str = "Nothing to be done yet";

/// Owns the live task list and applies actions to it.
///
/// The list order is the only source of task numbers: every mutation
/// renumbers, so numbers shift down after a delete.
#[derive(Debug)]
pub struct TaskManager {
    tasks: Vec<Task>,
    repository: Repository,
}

impl TaskManager {
    /// Builds a manager and loads the current tasks from `repository`.
    pub fn open(repository: Repository) -> Result<Self, TodosError> {
        let mut manager = Self {
            tasks: Vec::new(),
            repository,
        };
        manager.load()?;
        Ok(manager)
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Replaces the list; numbers are re-derived from the new order.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.renumber();
    }

    #[must_use]
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn load(&mut self) -> Result<(), TodosError> {
        let tasks = self.repository.load()?;
        self.set_tasks(tasks);
        Ok(())
    }

    pub fn save(&self) -> Result<(), TodosError> {
        self.repository.save(&self.tasks)
    }

    /// Applies `action`. References to numbers outside `1..=len` are no-ops.
    pub fn execute(&mut self, action: Action) {
        debug!(kind = action.kind(), "executing action");
        match action {
            Action::Add { description } => {
                let number = self.tasks.len() + 1;
                self.tasks.push(Task::new(number, description, false));
            }
            Action::Update { number, done } => match self.find_task_mut(number) {
                Some(task) => task.done = done,
                None => warn!(number, "update ignored: no such task"),
            },
            Action::Delete { number } => {
                if let Some(idx) = position_index(number, self.tasks.len()) {
                    self.tasks.remove(idx);
                    self.renumber();
                } else {
                    warn!(number, "delete ignored: no such task");
                }
            }
        }
    }

    fn find_task_mut(&mut self, number: usize) -> Option<&mut Task> {
        let idx = position_index(number, self.tasks.len())?;
        self.tasks.get_mut(idx)
    }

    fn renumber(&mut self) {
        for (i, task) in self.tasks.iter_mut().enumerate() {
            task.number = i + 1;
        }
    }
}

fn position_index(number: usize, len: usize) -> Option<usize> {
    (1..=len).contains(&number).then(|| number - 1)
}

impl fmt::Display for TaskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tasks.is_empty() {
            return f.write_str(EMPTY_MESSAGE);
        }
        for (i, task) in self.tasks.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{task}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (tempfile::TempDir, TaskManager) {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = Repository::new(dir.path().join("tasks.json"));
        let manager = TaskManager::open(repo).expect("open");
        (dir, manager)
    }

    fn one_task() -> Vec<Task> {
        vec![Task::new(1, "task one", false)]
    }

    #[test]
    fn has_no_tasks_by_default() {
        let (_dir, m) = manager();
        assert!(m.tasks().is_empty());
        assert_eq!(m.to_string(), EMPTY_MESSAGE);
    }

    #[test]
    fn execute_add_action() {
        let (_dir, mut m) = manager();
        m.execute(Action::add("new task"));
        assert_eq!(m.tasks(), &[Task::new(1, "new task", false)]);

        m.execute(Action::add("second"));
        assert_eq!(m.tasks()[1], Task::new(2, "second", false));
    }

    #[test]
    fn execute_update_action() {
        let (_dir, mut m) = manager();
        m.set_tasks(one_task());

        m.execute(Action::Update {
            number: 1,
            done: true,
        });
        assert_eq!(m.tasks(), &[Task::new(1, "task one", true)]);

        m.execute(Action::Update {
            number: 1,
            done: false,
        });
        assert_eq!(m.tasks(), one_task().as_slice());
    }

    #[test]
    fn execute_delete_action() {
        let (_dir, mut m) = manager();
        m.set_tasks(one_task());
        m.execute(Action::Delete { number: 1 });
        assert!(m.tasks().is_empty());
    }

    #[test]
    fn out_of_range_references_are_noops() {
        let (_dir, mut m) = manager();
        m.set_tasks(one_task());

        m.execute(Action::Update {
            number: 2,
            done: true,
        });
        m.execute(Action::Update {
            number: 0,
            done: true,
        });
        m.execute(Action::Delete { number: 5 });
        m.execute(Action::Delete { number: 0 });

        assert_eq!(m.tasks(), one_task().as_slice());
    }

    #[test]
    fn deleting_middle_task_shifts_later_ones_down() {
        let (_dir, mut m) = manager();
        m.execute(Action::add("a"));
        m.execute(Action::add("b"));
        m.execute(Action::add("c"));
        m.execute(Action::Update {
            number: 3,
            done: true,
        });

        m.execute(Action::Delete { number: 2 });

        assert_eq!(m.tasks(), &[Task::new(1, "a", false), Task::new(2, "c", true)]);
        assert_eq!(m.to_string(), "1 [ ] a\n2 [x] c");
    }

    #[test]
    fn set_tasks_renumbers_from_position() {
        let (_dir, mut m) = manager();
        m.set_tasks(vec![Task::new(7, "x", false), Task::new(7, "y", true)]);
        let numbers: Vec<usize> = m.tasks().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn save_then_reopen_restores_tasks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tasks.json");

        let mut m = TaskManager::open(Repository::new(path.clone())).unwrap();
        m.execute(Action::add("task one"));
        m.execute(Action::add("task two"));
        m.execute(Action::Update {
            number: 2,
            done: true,
        });
        m.save().unwrap();

        let mut reopened = TaskManager::open(Repository::new(path)).unwrap();
        assert_eq!(reopened.tasks(), m.tasks());
        reopened.load().unwrap();
        assert_eq!(reopened.tasks(), m.tasks());
    }
}
