use thiserror::Error;

#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("unknown vehicle type '{0}'")]
    UnknownType(String),

    #[error("vehicle '{0}' already exists")]
    DuplicateVehicle(String),

    #[error("unknown vehicle '{0}'")]
    UnknownVehicle(String),

    #[error("vehicle '{vehicle}' may not use edge '{edge}'")]
    DisallowedRoute { vehicle: String, edge: String },

    #[error("vehicle '{0}' has an empty route")]
    EmptyRoute(String),
}

pub type VehicleResult<T> = Result<T, VehicleError>;
