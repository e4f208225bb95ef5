use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub ip: String,
    pub mac: String,
    pub up: bool,
}

impl NetworkInterface {
    pub fn loopback() -> Self {
        NetworkInterface {
            name: "lo".to_string(),
            ip: "127.0.0.1".to_string(),
            mac: "00:00:00:00:00:00".to_string(),
            up: true,
        }
    }

    pub fn eth0() -> Self {
        NetworkInterface {
            name: "eth0".to_string(),
            ip: "192.168.1.100".to_string(),
            mac: "00:0a:95:9d:68:16".to_string(),
            up: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub protocol: Protocol,
    pub local_addr: String,
    pub local_port: u16,
    pub remote_addr: String,
    pub remote_port: u16,
    pub state: String,
}

impl Connection {
    pub fn listen(port: u16) -> Self {
        Connection {
            protocol: Protocol::Tcp,
            local_addr: "0.0.0.0".to_string(),
            local_port: port,
            remote_addr: "0.0.0.0".to_string(),
            remote_port: 0,
            state: "LISTEN".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub destination: String,
    pub gateway: String,
    pub interface: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkState {
    pub interfaces: Vec<NetworkInterface>,
    pub connections: Vec<Connection>,
    pub routes: Vec<Route>,
}

pub const NETSTAT_HEADER: &str =
    "Proto Recv-Q Send-Q Local Address           Foreign Address         State";

fn endpoint(addr: &str, port: u16) -> String {
    if port == 0 {
        format!("{}:*", addr)
    } else {
        format!("{}:{}", addr, port)
    }
}

impl NetworkState {
    /// A single host with a web server listening on 80 and 443.
    pub fn web_host() -> Self {
        NetworkState {
            interfaces: vec![NetworkInterface::loopback(), NetworkInterface::eth0()],
            connections: vec![Connection::listen(80), Connection::listen(443)],
            routes: vec![
                Route {
                    destination: "default".to_string(),
                    gateway: "192.168.1.1".to_string(),
                    interface: "eth0".to_string(),
                },
                Route {
                    destination: "192.168.1.0/24".to_string(),
                    gateway: "0.0.0.0".to_string(),
                    interface: "eth0".to_string(),
                },
            ],
        }
    }

    pub fn netstat_lines(&self) -> Vec<String> {
        let mut out = vec!["Active Internet connections".to_string(), NETSTAT_HEADER.to_string()];
        for c in &self.connections {
            out.push(format!(
                "{:<5} {:>6} {:>6} {:<23} {:<23} {}",
                c.protocol.as_str(),
                0,
                0,
                endpoint(&c.local_addr, c.local_port),
                endpoint(&c.remote_addr, c.remote_port),
                c.state
            ));
        }
        out
    }

    pub fn ifconfig_lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        for iface in &self.interfaces {
            let flags = if iface.up { "<UP,RUNNING>" } else { "<DOWN>" };
            out.push(format!("{}: flags={}", iface.name, flags));
            out.push(format!("        inet {}", iface.ip));
            out.push(format!("        ether {}", iface.mac));
            out.push(String::new());
        }
        out
    }

    pub fn addr_lines(&self) -> Vec<String> {
        self.interfaces
            .iter()
            .enumerate()
            .map(|(i, iface)| {
                format!(
                    "{}: {}: state {} inet {} link/ether {}",
                    i + 1,
                    iface.name,
                    if iface.up { "UP" } else { "DOWN" },
                    iface.ip,
                    iface.mac
                )
            })
            .collect()
    }

    pub fn route_lines(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|r| {
                if r.destination == "default" {
                    format!("default via {} dev {}", r.gateway, r.interface)
                } else {
                    format!("{} dev {} scope link", r.destination, r.interface)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_netstat_layout() {
        let lines = NetworkState::web_host().netstat_lines();
        assert_eq!(lines[1], NETSTAT_HEADER);
        assert_eq!(
            lines[2],
            "tcp        0      0 0.0.0.0:80              0.0.0.0:*               LISTEN"
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_route_lines() {
        let lines = NetworkState::web_host().route_lines();
        assert_eq!(lines[0], "default via 192.168.1.1 dev eth0");
        assert_eq!(lines[1], "192.168.1.0/24 dev eth0 scope link");
    }
}
