//! ArduPilot flight mode tables.
//!
//! ArduPilot advertises its mode as a vehicle-specific `custom_mode` number in
//! every HEARTBEAT. Which numbering applies depends on the firmware family,
//! which is inferred from the heartbeat's MAV type. The tables below follow
//! the mapping ground stations use for each family.

mod tables;

use core::fmt;

/// ArduPilot firmware family, selected from the heartbeat MAV type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleClass {
    Copter,
    Plane,
    Rover,
    Sub,
    Tracker,
}

impl VehicleClass {
    /// Mode name to `custom_mode` pairs, ordered by number.
    pub fn modes(self) -> &'static [(&'static str, u32)] {
        match self {
            VehicleClass::Copter => tables::COPTER,
            VehicleClass::Plane => tables::PLANE,
            VehicleClass::Rover => tables::ROVER,
            VehicleClass::Sub => tables::SUB,
            VehicleClass::Tracker => tables::TRACKER,
        }
    }

    /// Looks up the `custom_mode` number for `name` (exact match).
    pub fn custom_mode(self, name: &str) -> Option<u32> {
        self.mode_request(name).map(|request| request.custom_mode)
    }

    /// Reverse lookup, used when logging the current mode from a heartbeat.
    pub fn mode_name(self, custom_mode: u32) -> Option<&'static str> {
        self.modes()
            .iter()
            .find(|&&(_, id)| id == custom_mode)
            .map(|&(name, _)| name)
    }

    pub fn mode_names(self) -> impl Iterator<Item = &'static str> {
        self.modes().iter().map(|&(name, _)| name)
    }

    /// Resolves `name` against this family's table.
    ///
    /// Returns `None` when the mode is not advertised, in which case no
    /// command must be sent.
    pub fn mode_request(self, name: &str) -> Option<ModeChangeRequest> {
        self.modes()
            .iter()
            .find(|(mode, _)| *mode == name)
            .map(|&(mode_name, custom_mode)| ModeChangeRequest {
                mode_name,
                custom_mode,
            })
    }
}

/// A validated request to switch the autopilot into a named mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChangeRequest {
    pub mode_name: &'static str,
    pub custom_mode: u32,
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleClass::Copter => "ArduCopter",
            VehicleClass::Plane => "ArduPlane",
            VehicleClass::Rover => "Rover",
            VehicleClass::Sub => "ArduSub",
            VehicleClass::Tracker => "AntennaTracker",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loiter_numbers_differ_per_family() {
        assert_eq!(VehicleClass::Copter.custom_mode("LOITER"), Some(5));
        assert_eq!(VehicleClass::Plane.custom_mode("LOITER"), Some(12));
        assert_eq!(VehicleClass::Rover.custom_mode("LOITER"), Some(5));
    }

    #[test]
    fn test_mode_request() {
        let request = VehicleClass::Copter.mode_request("LOITER").unwrap();
        assert_eq!(request.mode_name, "LOITER");
        assert_eq!(request.custom_mode, 5);
        assert!(VehicleClass::Tracker.mode_request("LOITER").is_none());
        assert!(VehicleClass::Copter.mode_request("loiter").is_none());
    }

    #[test]
    fn test_missing_modes() {
        assert_eq!(VehicleClass::Sub.custom_mode("LOITER"), None);
        assert_eq!(VehicleClass::Tracker.custom_mode("LOITER"), None);
        assert_eq!(VehicleClass::Copter.custom_mode("loiter"), None);
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(VehicleClass::Copter.mode_name(6), Some("RTL"));
        assert_eq!(VehicleClass::Rover.mode_name(4), Some("HOLD"));
        assert_eq!(VehicleClass::Rover.mode_name(99), None);
    }

    #[test]
    fn test_tables_have_unique_names_and_numbers() {
        for class in [
            VehicleClass::Copter,
            VehicleClass::Plane,
            VehicleClass::Rover,
            VehicleClass::Sub,
            VehicleClass::Tracker,
        ] {
            let modes = class.modes();
            for (i, (name, id)) in modes.iter().enumerate() {
                for (other_name, other_id) in &modes[i + 1..] {
                    assert_ne!(name, other_name, "{class}: duplicate name");
                    assert_ne!(id, other_id, "{class}: duplicate number");
                }
            }
        }
    }
}
