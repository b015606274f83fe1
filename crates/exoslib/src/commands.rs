//! CLI command builders

/// Full configuration dump
pub const SHOW_CONFIG_CMD: &str = "show config";

/// Prefix of the cfgmgr object dump commands
pub const CFGMGR_SHOW_NEXT: &str = "debug cfgmgr show next";

/// Prefix of the cfgmgr single-object commands
pub const CFGMGR_SHOW_ONE: &str = "debug cfgmgr show one";

/// Card state reported by operational slots
pub const OPERATIONAL_CARD_STATE: &str = "Operational";

/// Link state of an active port
pub const LINK_STATE_UP: &str = "1";

/// Status of a valid port list
pub const PORT_STATUS_SUCCESS: &str = "SUCCESS";

/// Build port info command for all ports
pub fn build_ports_info_cmd() -> String {
    format!(
        "{} vlan.show_ports_info port=None portList=*",
        CFGMGR_SHOW_NEXT
    )
}

/// Build "all ports" port list command
///
/// One row is enough: its `portList` spans every port on the device.
pub fn build_all_ports_cmd() -> String {
    format!(
        "{} maximum-rows 1 vlan.show_ports_info port=None portList=*",
        CFGMGR_SHOW_NEXT
    )
}

/// Build port VLAN membership command
pub fn build_port_vlans_cmd(port: &str) -> String {
    format!(
        "{} vlan.show_ports_info_detail_vlans formatted port={} vlanIfInstance=None",
        CFGMGR_SHOW_NEXT, port
    )
}

/// Build VLAN list command
pub fn build_vlans_cmd() -> String {
    format!("{} vlan.vlan", CFGMGR_SHOW_NEXT)
}

/// Build VLAN port membership command
pub fn build_vlan_ports_cmd(vlan: &str) -> String {
    format!("{} vlan.vlanPort vlanName={}", CFGMGR_SHOW_ONE, vlan)
}

/// Build per-VLAN IP statistics command
pub fn build_ip_stats_cmd(vlan: &str) -> String {
    format!("show ipstats vlan {}", vlan)
}

/// Build CPU/fabric congestion command
pub fn build_congestion_cmd() -> String {
    format!("{} hal.halDebugCongestion formatted", CFGMGR_SHOW_NEXT)
}

/// Build single port link state command
pub fn build_port_state_cmd(port: &str) -> String {
    format!(
        "{} vlan.show_ports_info formatted portList={}",
        CFGMGR_SHOW_ONE, port
    )
}

/// Build card info command
pub fn build_card_info_cmd() -> String {
    format!("{} dm.card_info", CFGMGR_SHOW_NEXT)
}

/// Build port list validation command
///
/// Spaces are removed from the port list first.
pub fn build_port_check_cmd(port: &str) -> String {
    let port: String = port.chars().filter(|c| *c != ' ').collect();
    format!(
        "{} maximum-rows 1 vlan.show_ports_info portList={}",
        CFGMGR_SHOW_NEXT, port
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_ports_info_cmd() {
        assert_eq!(
            build_ports_info_cmd(),
            "debug cfgmgr show next vlan.show_ports_info port=None portList=*"
        );
        assert_eq!(
            build_all_ports_cmd(),
            "debug cfgmgr show next maximum-rows 1 vlan.show_ports_info port=None portList=*"
        );
    }

    #[test]
    fn test_build_port_vlans_cmd() {
        assert_eq!(
            build_port_vlans_cmd("1:5"),
            "debug cfgmgr show next vlan.show_ports_info_detail_vlans formatted port=1:5 vlanIfInstance=None"
        );
    }

    #[test]
    fn test_build_vlan_cmds() {
        assert_eq!(build_vlans_cmd(), "debug cfgmgr show next vlan.vlan");
        assert_eq!(
            build_vlan_ports_cmd("Default"),
            "debug cfgmgr show one vlan.vlanPort vlanName=Default"
        );
        assert_eq!(build_ip_stats_cmd("v10"), "show ipstats vlan v10");
    }

    #[test]
    fn test_build_port_check_cmd_strips_spaces() {
        assert_eq!(
            build_port_check_cmd("1:1 - 1:4, 2:1"),
            "debug cfgmgr show next maximum-rows 1 vlan.show_ports_info portList=1:1-1:4,2:1"
        );
    }

    #[test]
    fn test_build_misc_cmds() {
        assert_eq!(
            build_congestion_cmd(),
            "debug cfgmgr show next hal.halDebugCongestion formatted"
        );
        assert_eq!(
            build_port_state_cmd("3"),
            "debug cfgmgr show one vlan.show_ports_info formatted portList=3"
        );
        assert_eq!(build_card_info_cmd(), "debug cfgmgr show next dm.card_info");
    }
}
