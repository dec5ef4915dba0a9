//! Vehicle-class permission bitset shared by the network, vehicle types and
//! trip requests.
//!
//! The same type plays three roles:
//!
//! - an edge's **permissions** (which classes may use it),
//! - a vehicle type's **class** (normally a single bit),
//! - a trip's **allowed-mode set** (which private vehicles the router may
//!   synthesise for the agent).
//!
//! [`ModeSet::IGNORING`] is the empty set; a vehicle type with that class
//! bypasses permission checks entirely.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeSet(pub u32);

impl ModeSet {
    /// No class at all.  Vehicle types of this class ignore permissions.
    pub const IGNORING:   ModeSet = ModeSet(0);
    pub const PEDESTRIAN: ModeSet = ModeSet(1 << 0);
    pub const BICYCLE:    ModeSet = ModeSet(1 << 1);
    pub const PASSENGER:  ModeSet = ModeSet(1 << 2);
    pub const TAXI:       ModeSet = ModeSet(1 << 3);
    pub const BUS:        ModeSet = ModeSet(1 << 4);
    pub const TRAM:       ModeSet = ModeSet(1 << 5);
    pub const RAIL:       ModeSet = ModeSet(1 << 6);
    pub const DELIVERY:   ModeSet = ModeSet(1 << 7);
    pub const SHIP:       ModeSet = ModeSet(1 << 8);

    /// Every class above.
    pub const ALL: ModeSet = ModeSet((1 << 9) - 1);

    const NAMES: [(ModeSet, &'static str); 9] = [
        (ModeSet::PEDESTRIAN, "pedestrian"),
        (ModeSet::BICYCLE,    "bicycle"),
        (ModeSet::PASSENGER,  "passenger"),
        (ModeSet::TAXI,       "taxi"),
        (ModeSet::BUS,        "bus"),
        (ModeSet::TRAM,       "tram"),
        (ModeSet::RAIL,       "rail"),
        (ModeSet::DELIVERY,   "delivery"),
        (ModeSet::SHIP,       "ship"),
    ];

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` if every bit of `other` is set in `self`.
    #[inline]
    pub fn contains(self, other: ModeSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if `self` and `other` share at least one bit.
    #[inline]
    pub fn intersects(self, other: ModeSet) -> bool {
        self.0 & other.0 != 0
    }

    /// `true` if a vehicle of class `vclass` may use something with these
    /// permissions.  [`ModeSet::IGNORING`] is always allowed.
    #[inline]
    pub fn allows(self, vclass: ModeSet) -> bool {
        vclass == ModeSet::IGNORING || self.intersects(vclass)
    }

    /// Parse a whitespace-separated list such as `"passenger bicycle"`.
    ///
    /// Also accepts `"public"`, which adds no private vehicle class (trips may
    /// still ride scheduled lines), and `"all"`.
    pub fn parse(s: &str) -> Result<ModeSet, crate::CoreError> {
        let mut set = ModeSet::IGNORING;
        for token in s.split_whitespace() {
            match token {
                "public" => {}
                "all" => set |= ModeSet::ALL,
                "car" => set |= ModeSet::PASSENGER,
                "bike" => set |= ModeSet::BICYCLE,
                name => {
                    let (bit, _) = Self::NAMES
                        .iter()
                        .find(|(_, n)| *n == name)
                        .ok_or_else(|| crate::CoreError::Parse(format!("unknown mode {name:?}")))?;
                    set |= *bit;
                }
            }
        }
        Ok(set)
    }
}

impl BitOr for ModeSet {
    type Output = ModeSet;
    #[inline]
    fn bitor(self, rhs: ModeSet) -> ModeSet {
        ModeSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModeSet {
    #[inline]
    fn bitor_assign(&mut self, rhs: ModeSet) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ModeSet {
    type Output = ModeSet;
    #[inline]
    fn bitand(self, rhs: ModeSet) -> ModeSet {
        ModeSet(self.0 & rhs.0)
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("ignoring");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join(" "))
    }
}
