use serde::{Deserialize, Deserializer};

const ETHERNET_MARKER: &str = "ethernet";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetAdapter {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "InterfaceDescription", default, deserialize_with = "null_as_empty")]
    pub interface_description: String,
    #[serde(rename = "Status", default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(rename = "ifIndex")]
    pub if_index: u32,
}

impl NetAdapter {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("up")
    }

    pub fn is_ethernet(&self) -> bool {
        self.interface_description
            .to_ascii_lowercase()
            .contains(ETHERNET_MARKER)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

/// Picks the first adapter that is up and describes itself as Ethernet.
pub fn select_adapter(adapters: &[NetAdapter]) -> Option<&NetAdapter> {
    adapters.iter().find(|a| a.is_up() && a.is_ethernet())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(name: &str, desc: &str, status: &str, if_index: u32) -> NetAdapter {
        NetAdapter {
            name: name.to_string(),
            interface_description: desc.to_string(),
            status: status.to_string(),
            if_index,
        }
    }

    #[test]
    fn picks_first_up_ethernet() {
        let list = vec![
            adapter("Wi-Fi", "Intel(R) Wi-Fi 6 AX201", "Up", 3),
            adapter("Ethernet 2", "Intel(R) Ethernet Connection I219-LM", "Disconnected", 7),
            adapter("Ethernet", "Microsoft Hyper-V Network Adapter Ethernet", "Up", 9),
            adapter("Ethernet 3", "Realtek PCIe GbE Ethernet", "Up", 12),
        ];

        let picked = select_adapter(&list).map(|a| a.if_index);
        assert_eq!(picked, Some(9));
    }

    #[test]
    fn description_match_ignores_case() {
        let list = vec![adapter("lan", "vmxnet3 ETHERNET Adapter", "up", 4)];
        assert_eq!(select_adapter(&list).map(|a| a.name.as_str()), Some("lan"));
    }

    #[test]
    fn name_alone_does_not_count() {
        let list = vec![adapter("Ethernet", "Intel(R) Wi-Fi 6 AX201", "Up", 3)];
        assert!(select_adapter(&list).is_none());
    }

    #[test]
    fn nothing_up_yields_none() {
        let list = vec![adapter("Ethernet", "Red Hat VirtIO Ethernet Adapter", "Down", 5)];
        assert!(select_adapter(&list).is_none());
        assert!(select_adapter(&[]).is_none());
    }
}
