//! Type definitions for reshaped query results

use serde::{Deserialize, Serialize};

/// VLAN membership of a port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortVlan {
    /// VLAN name
    #[serde(rename = "VlanName")]
    pub name: String,
    /// VLAN ID
    #[serde(rename = "VlanId")]
    pub id: String,
    /// Tag status as reported by the switch
    #[serde(rename = "tag")]
    pub tag: String,
}

/// Port lists of a VLAN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanPorts {
    /// Untagged member port list
    pub untagged: String,
    /// Tagged member port list
    pub tagged: String,
}

/// CPU and fabric congestion of one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCongestion {
    /// Slot number (standalone switches report slot 1)
    #[serde(rename = "Slot")]
    pub slot: String,
    /// CPU congestion counter
    pub cpu_cng: String,
    /// Fabric congestion counter
    pub fabric_cng: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_vlan_keys() {
        let pv = PortVlan {
            name: "Default".to_string(),
            id: "1".to_string(),
            tag: "0".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&pv).unwrap(),
            r#"{"VlanName":"Default","VlanId":"1","tag":"0"}"#
        );
    }

    #[test]
    fn test_slot_congestion_keys() {
        let sc = SlotCongestion {
            slot: "1".to_string(),
            cpu_cng: "0".to_string(),
            fabric_cng: "12".to_string(),
        };
        let json = serde_json::to_value(&sc).unwrap();
        assert_eq!(json["Slot"], "1");
        assert_eq!(json["fabric_cng"], "12");
    }
}
