use thiserror::Error;

use tp_network::NetworkError;
use tp_stage::StageError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid index '{index}' for inserting new stage into plan of '{agent}'")]
    InvalidStageIndex { index: usize, agent: String },

    #[error("transportable '{0}' has no current stage")]
    NoCurrentStage(String),

    #[error("transportable '{0}' has an empty plan")]
    EmptyPlan(String),

    #[error("transportable '{0}' has no departure edge")]
    NoOrigin(String),

    #[error("unknown vehicle type '{vtype}' for transportable '{agent}'")]
    UnknownVehicleType { vtype: String, agent: String },

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("plan parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
