//! Outbound COMMAND_LONG construction
//!
//! Only the mode change is needed here. It is fire-and-forget: the
//! autopilot's COMMAND_ACK is not awaited.

use mavlink::common::{MavCmd, MavMessage, MavModeFlag, COMMAND_LONG_DATA};

/// Build `MAV_CMD_DO_SET_MODE` for an ArduPilot custom mode.
///
/// param1: MAV_MODE_FLAG base mode (custom mode enabled)
/// param2: custom mode (flight mode number)
pub fn set_mode_command(target_system: u8, target_component: u8, custom_mode: u32) -> MavMessage {
    MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
        target_system,
        target_component,
        command: MavCmd::MAV_CMD_DO_SET_MODE,
        confirmation: 0,
        param1: MavModeFlag::MAV_MODE_FLAG_CUSTOM_MODE_ENABLED.bits() as f32,
        param2: custom_mode as f32,
        param3: 0.0,
        param4: 0.0,
        param5: 0.0,
        param6: 0.0,
        param7: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_mode_fields() {
        let MavMessage::COMMAND_LONG(cmd) = set_mode_command(1, 1, 4) else {
            panic!("expected COMMAND_LONG");
        };
        assert_eq!(cmd.target_system, 1);
        assert_eq!(cmd.target_component, 1);
        assert_eq!(cmd.command, MavCmd::MAV_CMD_DO_SET_MODE);
        assert_eq!(cmd.param1, 1.0); // MAV_MODE_FLAG_CUSTOM_MODE_ENABLED
        assert_eq!(cmd.param2, 4.0);
        assert_eq!(cmd.confirmation, 0);
    }
}
