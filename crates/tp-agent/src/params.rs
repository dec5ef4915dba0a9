//! Static description of a transportable.

use tp_core::{AgentRng, Tick};
use tp_schedule::{Controls, TransportableControl};

/// What is being transported.  Persons and containers wait and board the
/// same way but are registered with separate controls.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportableKind {
    Person,
    Container,
}

impl TransportableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportableKind::Person    => "person",
            TransportableKind::Container => "container",
        }
    }

    /// The waiting registry agents of this kind use.
    pub fn control(self, controls: &Controls) -> &TransportableControl {
        match self {
            TransportableKind::Person    => &controls.persons,
            TransportableKind::Container => &controls.containers,
        }
    }

    pub fn control_mut(self, controls: &mut Controls) -> &mut TransportableControl {
        match self {
            TransportableKind::Person    => &mut controls.persons,
            TransportableKind::Container => &mut controls.containers,
        }
    }
}

/// Where on its first edge the agent appears.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DepartPos {
    /// Start of the edge.
    #[default]
    Default,
    /// Metres from the start; negative counts from the end.
    Given(f64),
    /// Uniform over the edge.
    Random,
}

impl DepartPos {
    /// Position on an edge of `length` metres.
    pub fn resolve(self, length: f64, rng: &mut AgentRng) -> f64 {
        match self {
            DepartPos::Default  => 0.0,
            DepartPos::Given(p) => p,
            DepartPos::Random   => rng.uniform(length),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportableParams {
    pub id:         String,
    pub kind:       TransportableKind,
    /// Vehicle type id; supplies speed and footprint.
    pub vtype:      String,
    /// Requested departure.
    pub depart:     Tick,
    pub depart_pos: DepartPos,
}

impl TransportableParams {
    pub fn person(id: &str, vtype: &str, depart: Tick) -> Self {
        Self {
            id:         id.to_owned(),
            kind:       TransportableKind::Person,
            vtype:      vtype.to_owned(),
            depart,
            depart_pos: DepartPos::Default,
        }
    }

    pub fn container(id: &str, vtype: &str, depart: Tick) -> Self {
        Self { kind: TransportableKind::Container, ..Self::person(id, vtype, depart) }
    }

    pub fn with_depart_pos(mut self, depart_pos: DepartPos) -> Self {
        self.depart_pos = depart_pos;
        self
    }
}
