//! Unit tests for tp-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, EdgeId, StopId};

    #[test]
    fn index_roundtrip() {
        let id = EdgeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(EdgeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(AgentId::default(), AgentId::INVALID);
        assert_eq!(StopId::INVALID.0, u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(StopId(7).to_string(), "StopId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::{Position, Shape};

    fn east() -> Shape {
        Shape::line(Position::new(0.0, 0.0), Position::new(100.0, 0.0))
    }

    #[test]
    fn length_of_polyline() {
        let s = Shape::new(vec![
            Position::new(0.0, 0.0),
            Position::new(30.0, 0.0),
            Position::new(30.0, 40.0),
        ]);
        assert!((s.length() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn offset_on_centre_line() {
        let p = east().position_at_offset(25.0, 0.0);
        assert_eq!(p, Position::new(25.0, 0.0));
    }

    #[test]
    fn positive_lateral_is_right_of_travel() {
        // Heading east, the right-hand side is south (negative y).
        let p = east().position_at_offset(50.0, 3.0);
        assert!((p.x - 50.0).abs() < 1e-9);
        assert!((p.y + 3.0).abs() < 1e-9);
    }

    #[test]
    fn offset_is_clamped_to_shape() {
        let s = east();
        assert_eq!(s.position_at_offset(-5.0, 0.0), Position::new(0.0, 0.0));
        assert_eq!(s.position_at_offset(500.0, 0.0), Position::new(100.0, 0.0));
    }

    #[test]
    fn rotation_follows_segment() {
        let s = Shape::new(vec![
            Position::new(0.0, 0.0),
            Position::new(10.0, 0.0),
            Position::new(10.0, 10.0),
        ]);
        assert!(s.rotation_at_offset(5.0).abs() < 1e-9);
        assert!((s.rotation_at_offset(15.0) - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn degenerate_shape_is_harmless() {
        let s = Shape::new(vec![Position::new(4.0, 2.0)]);
        assert_eq!(s.position_at_offset(10.0, 3.0), Position::new(4.0, 2.0));
        assert_eq!(s.rotation_at_offset(10.0), 0.0);
        assert_eq!(Shape::default().length(), 0.0);
    }
}

#[cfg(test)]
mod time {
    use crate::time::ticks_for_secs;
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
        assert_eq!(Tick(3).since(Tick(10)), 0);
    }

    #[test]
    fn ticks_round_up() {
        assert_eq!(ticks_for_secs(0.0, 1), 0);
        assert_eq!(ticks_for_secs(2.1, 1), 3);
        assert_eq!(ticks_for_secs(10.0, 5), 2);
        assert_eq!(ticks_for_secs(11.0, 5), 3);
    }

    #[test]
    fn clock_display() {
        let mut clock = SimClock::new(0, 60);
        clock.advance();
        assert_eq!(clock.to_string(), "T1 (00:01:00)");
    }

    #[test]
    fn config_end_tick() {
        let cfg = SimConfig { total_ticks: 100, ..SimConfig::default() };
        assert_eq!(cfg.end_tick(), Tick(100));
        assert_eq!(cfg.make_clock().current_tick, Tick::ZERO);
    }
}

#[cfg(test)]
mod modes {
    use crate::ModeSet;

    #[test]
    fn parse_and_display() {
        let set = ModeSet::parse("passenger bicycle").unwrap();
        assert!(set.contains(ModeSet::PASSENGER));
        assert!(set.contains(ModeSet::BICYCLE));
        assert_eq!(set.to_string(), "bicycle passenger");
    }

    #[test]
    fn public_adds_nothing() {
        assert!(ModeSet::parse("public").unwrap().is_empty());
    }

    #[test]
    fn unknown_mode_errors() {
        assert!(ModeSet::parse("hovercraft").is_err());
    }

    #[test]
    fn ignoring_is_always_allowed() {
        let perms = ModeSet::PEDESTRIAN;
        assert!(perms.allows(ModeSet::IGNORING));
        assert!(perms.allows(ModeSet::PEDESTRIAN));
        assert!(!perms.allows(ModeSet::PASSENGER));
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng};

    #[test]
    fn same_seed_same_sequence() {
        let mut a = AgentRng::new(7, AgentId(3));
        let mut b = AgentRng::new(7, AgentId(3));
        for _ in 0..10 {
            assert_eq!(a.uniform(100.0), b.uniform(100.0));
        }
    }

    #[test]
    fn uniform_within_bounds() {
        let mut r = AgentRng::new(1, AgentId(0));
        for _ in 0..100 {
            let v = r.uniform(12.5);
            assert!((0.0..12.5).contains(&v));
        }
        assert_eq!(r.uniform(0.0), 0.0);
    }
}

#[cfg(test)]
mod config {
    use crate::EngineConfig;

    #[test]
    fn side_offset_mirrors_for_lefthand() {
        let mut cfg = EngineConfig::default();
        assert_eq!(cfg.side_offset(), 3.0);
        cfg.lefthand = true;
        assert_eq!(cfg.side_offset(), -3.0);
    }
}
