use std::sync::Arc;

use crate::effects::RemoteEffect;
use crate::error::{Result, TaskError};
use crate::models::{Status, Task, TaskId, TaskPatch};

// Never edited in place; every transition builds a new collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Arc<[Task]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub collection: TaskCollection,
    pub effects: Vec<RemoteEffect>,
}

impl Default for TaskCollection {
    fn default() -> Self {
        Self::from_ordered(Vec::new())
    }
}

impl TaskCollection {
    pub(crate) fn from_ordered(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::from(tasks),
        }
    }

    // ties keep their listing order
    pub fn from_remote(mut tasks: Vec<Task>) -> Self {
        tasks.sort_by_key(|task| task.position);
        Self::from_ordered(tasks)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn index_of(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == id)
    }

    pub fn next_position(&self) -> usize {
        self.tasks.len()
    }

    pub fn column(&self, status: Status) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.status == status).collect()
    }

    pub fn with_created(&self, task: Task) -> Self {
        let mut tasks = self.tasks.to_vec();
        tasks.push(task);
        Self::from_remote(tasks)
    }

    /// A name that is empty after trimming is discarded and yields no
    /// transition.
    pub fn rename(&self, id: &TaskId, raw_name: &str) -> Result<Option<Transition>> {
        let index = self.index_of(id).ok_or_else(|| TaskError::not_found(id))?;
        let name = raw_name.trim();
        if name.is_empty() || self.tasks[index].name == name {
            return Ok(None);
        }

        let mut tasks = self.tasks.to_vec();
        tasks[index].name = name.to_string();
        Ok(Some(Transition {
            collection: Self::from_ordered(tasks),
            effects: vec![RemoteEffect::Update {
                id: id.clone(),
                patch: TaskPatch::name(name),
            }],
        }))
    }

    /// Only `completed` is sent; position and the processing flag stay as
    /// they are.
    pub fn toggle(&self, id: &TaskId) -> Result<Transition> {
        let index = self.index_of(id).ok_or_else(|| TaskError::not_found(id))?;
        let mut tasks = self.tasks.to_vec();
        let completed = tasks[index].toggle_completed();

        Ok(Transition {
            collection: Self::from_ordered(tasks),
            effects: vec![RemoteEffect::Update {
                id: id.clone(),
                patch: TaskPatch::completed(completed),
            }],
        })
    }

    pub fn delete(&self, id: &TaskId) -> Result<Transition> {
        let index = self.index_of(id).ok_or_else(|| TaskError::not_found(id))?;
        let mut tasks = self.tasks.to_vec();
        tasks.remove(index);

        let mut effects = vec![RemoteEffect::Delete { id: id.clone() }];
        effects.extend(renumber(&mut tasks, None));
        Ok(Transition {
            collection: Self::from_ordered(tasks),
            effects,
        })
    }
}

// Returns a position update for each task whose position moved, except `skip`.
pub(crate) fn renumber(tasks: &mut [Task], skip: Option<&TaskId>) -> Vec<RemoteEffect> {
    let mut effects = Vec::new();
    for (index, task) in tasks.iter_mut().enumerate() {
        if task.position == index {
            continue;
        }
        task.position = index;
        if skip != Some(&task.id) {
            effects.push(RemoteEffect::Update {
                id: task.id.clone(),
                patch: TaskPatch::position(index),
            });
        }
    }
    effects
}
