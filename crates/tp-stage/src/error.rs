use thiserror::Error;
use tp_vehicle::VehicleError;

#[derive(Debug, Error)]
pub enum StageError {
    /// No route exists and strict route checking is on.
    #[error("No connection found between '{origin}' and '{destination}' for person '{agent}'.")]
    NoConnection {
        origin:      String,
        destination: String,
        agent:       String,
    },

    #[error("unknown vehicle type '{vtype}' requested by '{agent}'")]
    UnknownVehicleType { vtype: String, agent: String },

    #[error(transparent)]
    Vehicle(#[from] VehicleError),
}

pub type StageResult<T> = Result<T, StageError>;
