use std::fmt;
use std::str::FromStr;

use crate::effects::RemoteEffect;
use crate::error::{Result, TaskError};
use crate::models::{Status, Task, TaskId, TaskPatch};
use crate::state::{renumber, TaskCollection, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    List,
    ToDo,
    InProgress,
    Completed,
}

impl Container {
    pub fn for_status(status: Status) -> Self {
        match status {
            Status::ToDo => Container::ToDo,
            Status::InProgress => Container::InProgress,
            Status::Completed => Container::Completed,
        }
    }

    pub fn status(self) -> Option<Status> {
        match self {
            Container::List => None,
            Container::ToDo => Some(Status::ToDo),
            Container::InProgress => Some(Status::InProgress),
            Container::Completed => Some(Status::Completed),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Container::List => "list",
            Container::ToDo => "to-do",
            Container::InProgress => "in-progress",
            Container::Completed => "completed",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Container {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "list" | "tasks" => Ok(Container::List),
            "to-do" | "todo" => Ok(Container::ToDo),
            "in-progress" | "inProgress" => Ok(Container::InProgress),
            "completed" => Ok(Container::Completed),
            other => Err(TaskError::InvalidContainer {
                name: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragLocation {
    pub container: Container,
    pub index: usize,
}

impl DragLocation {
    pub fn new(container: Container, index: usize) -> Self {
        Self { container, index }
    }
}

// `destination` is `None` when the drag was cancelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragResult {
    pub task_id: TaskId,
    pub source: DragLocation,
    pub destination: Option<DragLocation>,
}

impl TaskCollection {
    // global index for the list, index within the status column for the board
    pub fn location_of(&self, id: &TaskId, board: bool) -> Option<DragLocation> {
        let task = self.get(id)?;
        if !board {
            return Some(DragLocation::new(Container::List, self.index_of(id)?));
        }
        let index = self
            .column(task.status)
            .iter()
            .position(|member| &member.id == id)?;
        Some(DragLocation::new(Container::for_status(task.status), index))
    }

    /// Returns `Ok(None)` when the drop leaves both order and status as they
    /// were. Otherwise positions are renumbered from zero and only tasks whose
    /// position moved get an update.
    pub fn reorder(&self, drag: &DragResult) -> Result<Option<Transition>> {
        let Some(destination) = drag.destination else {
            return Ok(None);
        };
        if destination == drag.source {
            return Ok(None);
        }

        let from = self
            .index_of(&drag.task_id)
            .ok_or_else(|| TaskError::not_found(&drag.task_id))?;
        let mut tasks = self.tasks().to_vec();
        let mut dragged = tasks.remove(from);

        let insert_at = insertion_index(&tasks, from, destination);
        let reclassified = match destination.container.status() {
            Some(status) if destination.container != drag.source.container => {
                let changed = dragged.status != status;
                if changed {
                    dragged.set_status(status);
                }
                changed
            }
            _ => false,
        };

        if insert_at == from && !reclassified {
            return Ok(None);
        }

        tasks.insert(insert_at, dragged);
        let others = renumber(&mut tasks, Some(&drag.task_id));

        let moved = &tasks[insert_at];
        let mut patch = TaskPatch::position(moved.position);
        if reclassified {
            patch = patch.with_status(moved.status);
        }
        let mut effects = vec![RemoteEffect::Update {
            id: moved.id.clone(),
            patch,
        }];
        effects.extend(others);

        Ok(Some(Transition {
            collection: TaskCollection::from_ordered(tasks),
            effects,
        }))
    }
}

// `remaining` no longer contains the dragged task
fn insertion_index(
    remaining: &[Task],
    from: usize,
    destination: DragLocation,
) -> usize {
    let Some(status) = destination.container.status() else {
        return destination.index.min(remaining.len());
    };

    let members: Vec<usize> = remaining
        .iter()
        .enumerate()
        .filter(|(_, task)| task.status == status)
        .map(|(index, _)| index)
        .collect();

    match members.get(destination.index) {
        Some(&index) => index,
        None => match members.last() {
            Some(&last) => last + 1,
            // empty column: keep the task's place in the global order
            None => from.min(remaining.len()),
        },
    }
}
