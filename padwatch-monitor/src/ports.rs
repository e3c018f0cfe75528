//! Serial port discovery.

use serialport::SerialPortType;

use crate::error::MonitorError;

/// A serial port candidate for monitoring.
#[derive(Debug, Clone)]
pub struct PortInfo {
    /// OS device name, e.g. `/dev/ttyACM0` or `COM3`.
    pub name: String,
    /// Transport kind: USB, Bluetooth, PCI or Unknown.
    pub kind: &'static str,
    /// USB manufacturer string, when available.
    pub manufacturer: Option<String>,
    /// USB product string, when available.
    pub product: Option<String>,
}

impl PortInfo {
    /// One-line description for listings and prompts.
    pub fn label(&self) -> String {
        match (&self.product, &self.manufacturer) {
            (Some(product), _) => format!("{} - {} ({})", self.name, product, self.kind),
            (None, Some(manufacturer)) => {
                format!("{} - {} ({})", self.name, manufacturer, self.kind)
            }
            (None, None) => format!("{} ({})", self.name, self.kind),
        }
    }
}

/// Enumerate serial ports available on this machine.
///
/// On macOS each device appears as both `/dev/tty.*` and `/dev/cu.*`; the
/// tty node blocks on carrier detect, so only the cu (calling unit) nodes
/// are listed.
pub fn list_ports() -> Result<Vec<PortInfo>, MonitorError> {
    let ports = serialport::available_ports()?;

    Ok(ports
        .into_iter()
        .filter(|p| keep_port(&p.port_name))
        .map(|p| {
            let (kind, manufacturer, product) = match p.port_type {
                SerialPortType::UsbPort(usb) => ("USB", usb.manufacturer, usb.product),
                SerialPortType::BluetoothPort => ("Bluetooth", None, None),
                SerialPortType::PciPort => ("PCI", None, None),
                SerialPortType::Unknown => ("Unknown", None, None),
            };
            PortInfo {
                name: p.port_name,
                kind,
                manufacturer,
                product,
            }
        })
        .collect())
}

fn keep_port(name: &str) -> bool {
    if cfg!(target_os = "macos") {
        !name.starts_with("/dev/tty.")
    } else {
        let _ = name;
        true
    }
}
