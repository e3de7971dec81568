use std::fmt;

use crate::errors::PlatformError;

use super::options::TaskOptions;

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(SessionId);
opaque_id!(SlotId);
opaque_id!(TaskId);

/// One unit of work: read `payload`, write the result into `expected_output`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSubmission {
    pub payload: SlotId,
    pub expected_output: SlotId,
    /// Overrides the session options for this task only.
    pub options: Option<TaskOptions>,
}

impl TaskSubmission {
    pub fn new(payload: SlotId, expected_output: SlotId) -> Self {
        Self {
            payload,
            expected_output,
            options: None,
        }
    }
}

/// Capabilities of a distributed task queue with a blob result store.
pub trait TaskPlatform {
    fn create_session(&self, options: &TaskOptions) -> Result<SessionId, PlatformError>;

    /// Registers empty slots; ids come back in the order of `names`.
    fn create_slots(
        &self,
        session: &SessionId,
        names: &[String],
    ) -> Result<Vec<SlotId>, PlatformError>;

    fn upload(&self, session: &SessionId, slot: &SlotId, data: Vec<u8>)
        -> Result<(), PlatformError>;

    fn submit_tasks(
        &self,
        session: &SessionId,
        tasks: Vec<TaskSubmission>,
    ) -> Result<Vec<TaskId>, PlatformError>;

    /// Blocks until every slot holds data or a failure status.
    fn wait_for_slots(&self, session: &SessionId, slots: &[SlotId]) -> Result<(), PlatformError>;

    fn download(&self, session: &SessionId, slot: &SlotId) -> Result<Vec<u8>, PlatformError>;
}
