//! Engine-wide behaviour switches.
//!
//! `EngineConfig` is read by every stage through the simulation context; it
//! replaces the process-wide option singletons a monolithic simulator would
//! consult.  Typically deserialised (feature `serde`) from the application's
//! config file alongside [`SimConfig`][crate::SimConfig].

/// Tunables for stage behaviour and trip resolution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// A trip with no route is a fatal error instead of a teleport.
    pub strict_routes: bool,

    /// Network drives on the left: roadside offsets and waiting angles are
    /// mirrored.
    pub lefthand: bool,

    /// Lateral clearance (metres) between a lane's centre line and agents
    /// standing beside it.
    pub roadside_offset: f64,

    /// Vehicle type used when a trip allows `passenger` but names no type.
    pub default_vtype: String,

    /// Vehicle type used when a trip allows `bicycle` but names no type.
    pub default_bike_type: String,

    /// Vehicle type given to persons that do not specify one.
    pub default_ped_type: String,

    /// Vehicle type given to containers that do not specify one.
    pub default_container_type: String,

    /// Factor applied to a person's maximum speed when a trip does not set
    /// its own walk factor.
    pub walk_factor: f64,

    /// Resolve every candidate vehicle type of a trip, not only the first.
    pub multi_candidate_trips: bool,
}

impl EngineConfig {
    /// Roadside offset with the driving-side sign applied.
    #[inline]
    pub fn side_offset(&self) -> f64 {
        self.roadside_offset * self.side()
    }

    /// `-1.0` for left-hand networks, `1.0` otherwise.
    #[inline]
    pub fn side(&self) -> f64 {
        if self.lefthand { -1.0 } else { 1.0 }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_routes:          false,
            lefthand:               false,
            roadside_offset:        3.0,
            default_vtype:          "DEFAULT_VEHTYPE".to_owned(),
            default_bike_type:      "DEFAULT_BIKETYPE".to_owned(),
            default_ped_type:       "DEFAULT_PEDTYPE".to_owned(),
            default_container_type: "DEFAULT_CONTAINERTYPE".to_owned(),
            walk_factor:            0.75,
            multi_candidate_trips:  false,
        }
    }
}
