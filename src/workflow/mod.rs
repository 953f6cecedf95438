mod engine;
mod status;
mod task;

pub use engine::{MIN_DESCRIPTION_LEN, WorkflowEngine};
pub use status::TaskStatus;
pub use task::{
    Actor, NewProject, NewTask, Project, ProjectUpdate, Task, TaskUpdate, TransitionRecord,
};
