//! The vehicle registry.
//!
//! [`VehicleRegistry`] is the interface trip resolution uses to synthesise,
//! register and destroy vehicles and to look up vehicle types.
//! [`VehicleControl`] is the in-memory implementation used by `tp-sim`.
//!
//! # Build vs. add
//!
//! Building a vehicle does not make it live.  Trip resolution builds a
//! placeholder, offers it to the router, and only [`add_vehicle`]s it when a
//! leg actually uses it; otherwise the vehicle goes back through
//! [`delete_vehicle`] so the registry's counters stay balanced.
//!
//! [`add_vehicle`]: VehicleRegistry::add_vehicle
//! [`delete_vehicle`]: VehicleRegistry::delete_vehicle

use std::collections::HashMap;

use tp_core::{EdgeId, EngineConfig};
use tp_network::Network;
use tracing::debug;

use crate::{Vehicle, VehicleError, VehicleParams, VehicleResult, VehicleType};

pub trait VehicleRegistry {
    fn vehicle_type(&self, id: &str) -> Option<&VehicleType>;

    fn vehicle_type_mut(&mut self, id: &str) -> Option<&mut VehicleType>;

    /// Register a type.  Returns `false` if the id is taken.
    fn add_vehicle_type(&mut self, vtype: VehicleType) -> bool;

    fn remove_vehicle_type(&mut self, id: &str);

    /// Build an unregistered vehicle of type `params.vtype` on `route`.
    ///
    /// With `check_routes` every route edge must permit the type's class.
    fn build_vehicle(
        &mut self,
        params:       VehicleParams,
        route:        Vec<EdgeId>,
        network:      &Network,
        check_routes: bool,
    ) -> VehicleResult<Vehicle>;

    /// Make a built vehicle live.
    fn add_vehicle(&mut self, vehicle: Vehicle) -> VehicleResult<()>;

    /// Destroy a vehicle.  `discard` marks a built vehicle that never became
    /// live; otherwise the live entry with the same id is unregistered.
    fn delete_vehicle(&mut self, vehicle: Vehicle, discard: bool);

    fn vehicle(&self, id: &str) -> Option<&Vehicle>;

    fn vehicle_mut(&mut self, id: &str) -> Option<&mut Vehicle>;

    /// Live vehicles currently on `edge`, in id order.
    fn vehicles_on(&self, edge: EdgeId) -> Vec<&Vehicle>;
}

/// Lifetime counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VehicleStats {
    pub built:     usize,
    pub added:     usize,
    pub deleted:   usize,
    pub discarded: usize,
}

impl VehicleStats {
    /// Built vehicles that were neither added nor deleted yet.
    pub fn pending(&self) -> usize {
        self.built.saturating_sub(self.added + self.discarded)
    }
}

// ── VehicleControl ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct VehicleControl {
    types:    HashMap<String, VehicleType>,
    vehicles: HashMap<String, Vehicle>,
    stats:    VehicleStats,
}

impl VehicleControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the default passenger, bicycle,
    /// pedestrian and container types named by `config`.
    pub fn with_default_types(config: &EngineConfig) -> Self {
        let mut control = Self::new();
        control.add_vehicle_type(VehicleType::passenger(&config.default_vtype));
        control.add_vehicle_type(VehicleType::bicycle(&config.default_bike_type));
        control.add_vehicle_type(VehicleType::pedestrian(&config.default_ped_type));
        control.add_vehicle_type(VehicleType::container(&config.default_container_type));
        control
    }

    #[inline]
    pub fn stats(&self) -> VehicleStats {
        self.stats
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Unregister a live vehicle and hand it back, e.g. on arrival.
    pub fn remove_vehicle(&mut self, id: &str) -> Option<Vehicle> {
        self.vehicles.remove(id)
    }

    /// Live vehicle ids in sorted order.
    pub fn vehicle_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.vehicles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl VehicleRegistry for VehicleControl {
    fn vehicle_type(&self, id: &str) -> Option<&VehicleType> {
        self.types.get(id)
    }

    fn vehicle_type_mut(&mut self, id: &str) -> Option<&mut VehicleType> {
        self.types.get_mut(id)
    }

    fn add_vehicle_type(&mut self, vtype: VehicleType) -> bool {
        if self.types.contains_key(&vtype.id) {
            return false;
        }
        self.types.insert(vtype.id.clone(), vtype);
        true
    }

    fn remove_vehicle_type(&mut self, id: &str) {
        self.types.remove(id);
    }

    fn build_vehicle(
        &mut self,
        params:       VehicleParams,
        route:        Vec<EdgeId>,
        network:      &Network,
        check_routes: bool,
    ) -> VehicleResult<Vehicle> {
        let vtype = self
            .types
            .get(&params.vtype)
            .ok_or_else(|| VehicleError::UnknownType(params.vtype.clone()))?;
        if route.is_empty() {
            return Err(VehicleError::EmptyRoute(params.id));
        }
        if check_routes {
            if let Some(&bad) = route.iter().find(|&&e| !network.permissions(e).allows(vtype.vclass)) {
                return Err(VehicleError::DisallowedRoute {
                    vehicle: params.id,
                    edge:    network.edge_name(bad).to_owned(),
                });
            }
        }
        let vehicle = Vehicle::new(params, vtype.vclass, vtype.max_speed, route);
        self.stats.built += 1;
        Ok(vehicle)
    }

    fn add_vehicle(&mut self, vehicle: Vehicle) -> VehicleResult<()> {
        if self.vehicles.contains_key(vehicle.id()) {
            return Err(VehicleError::DuplicateVehicle(vehicle.id().to_owned()));
        }
        self.stats.added += 1;
        self.vehicles.insert(vehicle.id().to_owned(), vehicle);
        Ok(())
    }

    fn delete_vehicle(&mut self, vehicle: Vehicle, discard: bool) {
        if discard {
            self.stats.discarded += 1;
        } else {
            self.vehicles.remove(vehicle.id());
            self.stats.deleted += 1;
        }
        if self.types.get(&vehicle.params.vtype).is_some_and(VehicleType::is_vehicle_specific) {
            self.types.remove(&vehicle.params.vtype);
        }
        debug!(vehicle = vehicle.id(), discard, "vehicle deleted");
    }

    fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    fn vehicle_mut(&mut self, id: &str) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(id)
    }

    fn vehicles_on(&self, edge: EdgeId) -> Vec<&Vehicle> {
        let mut on_edge: Vec<&Vehicle> = self.vehicles.values().filter(|v| v.edge() == edge).collect();
        on_edge.sort_unstable_by(|a, b| a.id().cmp(b.id()));
        on_edge
    }
}
