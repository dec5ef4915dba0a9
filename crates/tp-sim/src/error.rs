use tp_agent::AgentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("another agent with id '{0}' exists")]
    DuplicateAgent(String),

    #[error("unknown agent '{0}'")]
    UnknownAgent(String),

    #[error("unknown vehicle '{0}'")]
    UnknownVehicle(String),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

pub type SimResult<T> = Result<T, SimError>;
