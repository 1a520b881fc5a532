//! Bus identification for registered sources.

use crate::codes::{BUS_HOST, BUS_PCI, BUS_USB};

/// The `(bustype, vendor, product, version)` identity of a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BusId {
    pub bustype: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

impl BusId {
    pub const fn new(bustype: u16, vendor: u16, product: u16, version: u16) -> Self {
        Self {
            bustype,
            vendor,
            product,
            version,
        }
    }

    /// Derive an identity from the bus the device is attached to.
    ///
    /// PCI devices report vendor, device and revision; children of a USB
    /// hub report vendor and product. Anything else is a host device with
    /// no further identification.
    pub fn classify(parent: Option<&ParentBus>) -> Self {
        match parent {
            Some(ParentBus::Pci {
                vendor,
                device,
                revision,
            }) => Self::new(BUS_PCI, *vendor, *device, u16::from(*revision)),
            Some(ParentBus::UsbHub { vendor, product }) => Self::new(BUS_USB, *vendor, *product, 0),
            Some(ParentBus::Other(_)) | None => Self::new(BUS_HOST, 0, 0, 0),
        }
    }
}

/// What a device's parent on the bus tree is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentBus {
    /// Attached to a PCI bus.
    Pci {
        vendor: u16,
        device: u16,
        revision: u8,
    },
    /// Attached below a USB hub.
    UsbHub { vendor: u16, product: u16 },
    /// Any other bus, named by its driver class.
    Other(String),
}

/// Attachment information a driver passes at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachInfo {
    /// Driver name plus unit number, e.g. `ukbd0`.
    pub nameunit: String,
    pub parent: Option<ParentBus>,
}

impl AttachInfo {
    pub fn new(nameunit: impl Into<String>, parent: Option<ParentBus>) -> Self {
        Self {
            nameunit: nameunit.into(),
            parent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_pci() {
        let parent = ParentBus::Pci {
            vendor: 0x8086,
            device: 0x1e31,
            revision: 4,
        };
        assert_eq!(
            BusId::classify(Some(&parent)),
            BusId::new(BUS_PCI, 0x8086, 0x1e31, 4)
        );
    }

    #[test]
    fn test_classify_usb() {
        let parent = ParentBus::UsbHub {
            vendor: 0x046d,
            product: 0xc52b,
        };
        assert_eq!(
            BusId::classify(Some(&parent)),
            BusId::new(BUS_USB, 0x046d, 0xc52b, 0)
        );
    }

    #[test]
    fn test_classify_fallback_to_host() {
        let host = BusId::new(BUS_HOST, 0, 0, 0);
        assert_eq!(BusId::classify(None), host);
        assert_eq!(
            BusId::classify(Some(&ParentBus::Other("atkbdc".into()))),
            host
        );
    }
}
