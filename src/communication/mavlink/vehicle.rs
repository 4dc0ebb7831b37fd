//! Remote vehicle identification
//!
//! The first heartbeat accepted on a link identifies the autopilot we are
//! talking to: its system/component id, airframe type, and firmware. From
//! those the ArduPilot vehicle class, and with it the mode table, follows.

use detect_link_core::mode::VehicleClass;
use mavlink::common::{MavAutopilot, MavType, HEARTBEAT_DATA};
use mavlink::MavHeader;

/// The autopilot on the other end of the link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetVehicle {
    pub system_id: u8,
    pub component_id: u8,
    pub mav_type: MavType,
    pub autopilot: MavAutopilot,
    /// ArduPilot vehicle class, `None` for other firmware or airframes
    pub class: Option<VehicleClass>,
}

impl TargetVehicle {
    pub fn from_heartbeat(header: &MavHeader, heartbeat: &HEARTBEAT_DATA) -> Self {
        Self {
            system_id: header.system_id,
            component_id: header.component_id,
            mav_type: heartbeat.mavtype,
            autopilot: heartbeat.autopilot,
            class: vehicle_class(heartbeat.mavtype, heartbeat.autopilot),
        }
    }
}

/// `MAV_COMP_ID_GIMBAL`
const COMP_ID_GIMBAL: u8 = 154;
/// `MAV_COMP_ID_GIMBAL2` ..= `MAV_COMP_ID_GIMBAL6`
const COMP_ID_GIMBAL2: u8 = 171;
const COMP_ID_GIMBAL6: u8 = 175;

/// Whether a heartbeat should count as "the autopilot is alive".
///
/// Ground stations also broadcast heartbeats, and on a shared UDP bus we can
/// hear our own echoed back. Peripherals on the vehicle (companion computer,
/// gimbal, ADS-B receiver, camera, ...) heartbeat with the vehicle's system
/// id but are not the flight controller. None of these say anything about
/// the vehicle.
pub fn is_vehicle_heartbeat(
    header: &MavHeader,
    heartbeat: &HEARTBEAT_DATA,
    own_system_id: u8,
    own_component_id: u8,
) -> bool {
    if header.system_id == own_system_id && header.component_id == own_component_id {
        return false;
    }
    if heartbeat.autopilot == MavAutopilot::MAV_AUTOPILOT_INVALID {
        return false;
    }
    if header.component_id == COMP_ID_GIMBAL
        || (COMP_ID_GIMBAL2..=COMP_ID_GIMBAL6).contains(&header.component_id)
    {
        return false;
    }
    !is_peripheral(heartbeat.mavtype)
}

/// MAV types that never fly the vehicle.
fn is_peripheral(mav_type: MavType) -> bool {
    matches!(
        mav_type,
        MavType::MAV_TYPE_GCS
            | MavType::MAV_TYPE_ONBOARD_CONTROLLER
            | MavType::MAV_TYPE_GIMBAL
            | MavType::MAV_TYPE_ADSB
            | MavType::MAV_TYPE_CAMERA
            | MavType::MAV_TYPE_CHARGING_STATION
            | MavType::MAV_TYPE_FLARM
            | MavType::MAV_TYPE_SERVO
            | MavType::MAV_TYPE_ODID
            | MavType::MAV_TYPE_BATTERY
            | MavType::MAV_TYPE_PARACHUTE
            | MavType::MAV_TYPE_LOG
            | MavType::MAV_TYPE_OSD
            | MavType::MAV_TYPE_IMU
            | MavType::MAV_TYPE_GPS
            | MavType::MAV_TYPE_WINCH
            | MavType::MAV_TYPE_ILLUMINATOR
    )
}

/// ArduPilot vehicle class for an airframe type.
pub fn vehicle_class(mav_type: MavType, autopilot: MavAutopilot) -> Option<VehicleClass> {
    if autopilot != MavAutopilot::MAV_AUTOPILOT_ARDUPILOTMEGA {
        return None;
    }

    match mav_type {
        MavType::MAV_TYPE_QUADROTOR
        | MavType::MAV_TYPE_HELICOPTER
        | MavType::MAV_TYPE_HEXAROTOR
        | MavType::MAV_TYPE_OCTOROTOR
        | MavType::MAV_TYPE_COAXIAL
        | MavType::MAV_TYPE_TRICOPTER
        | MavType::MAV_TYPE_DODECAROTOR
        | MavType::MAV_TYPE_DECAROTOR => Some(VehicleClass::Copter),
        MavType::MAV_TYPE_FIXED_WING
        | MavType::MAV_TYPE_VTOL_TAILSITTER_DUOROTOR
        | MavType::MAV_TYPE_VTOL_TAILSITTER_QUADROTOR
        | MavType::MAV_TYPE_VTOL_TILTROTOR
        | MavType::MAV_TYPE_VTOL_FIXEDROTOR
        | MavType::MAV_TYPE_VTOL_TAILSITTER
        | MavType::MAV_TYPE_VTOL_TILTWING => Some(VehicleClass::Plane),
        MavType::MAV_TYPE_GROUND_ROVER | MavType::MAV_TYPE_SURFACE_BOAT => {
            Some(VehicleClass::Rover)
        }
        MavType::MAV_TYPE_SUBMARINE => Some(VehicleClass::Sub),
        MavType::MAV_TYPE_ANTENNA_TRACKER => Some(VehicleClass::Tracker),
        _ => None,
    }
}
