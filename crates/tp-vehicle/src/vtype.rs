//! Vehicle types.
//!
//! Types are normally shared between many vehicles and transportables.  When
//! one agent needs its own attributes (a personal walking speed, say) it gets
//! a **singular** copy registered under `"<type>@<agent>"`; that copy is
//! removed from the registry again when the agent drops it.

use tp_core::ModeSet;

#[derive(Clone, Debug, PartialEq)]
pub struct VehicleType {
    pub id:        String,
    pub vclass:    ModeSet,
    /// m/s
    pub max_speed: f64,
    /// m
    pub length:    f64,
    /// m
    pub width:     f64,
    vehicle_specific: bool,
}

impl VehicleType {
    pub fn new(id: &str, vclass: ModeSet, max_speed: f64) -> Self {
        Self {
            id: id.to_owned(),
            vclass,
            max_speed,
            length: 5.0,
            width: 1.8,
            vehicle_specific: false,
        }
    }

    pub fn with_size(mut self, length: f64, width: f64) -> Self {
        self.length = length;
        self.width  = width;
        self
    }

    pub fn passenger(id: &str) -> Self {
        Self::new(id, ModeSet::PASSENGER, 55.55)
    }

    pub fn bicycle(id: &str) -> Self {
        Self::new(id, ModeSet::BICYCLE, 5.56).with_size(1.6, 0.65)
    }

    pub fn pedestrian(id: &str) -> Self {
        Self::new(id, ModeSet::PEDESTRIAN, 1.39).with_size(0.215, 0.478)
    }

    /// Goods moved by other vehicles; the class never drives itself.
    pub fn container(id: &str) -> Self {
        Self::new(id, ModeSet::IGNORING, 1.39).with_size(6.1, 2.4)
    }

    /// `true` for a singular copy owned by exactly one agent or vehicle.
    #[inline]
    pub fn is_vehicle_specific(&self) -> bool {
        self.vehicle_specific
    }

    /// A singular copy of this type under a new id.
    pub fn build_singular(&self, id: String) -> VehicleType {
        VehicleType { id, vehicle_specific: true, ..self.clone() }
    }
}
