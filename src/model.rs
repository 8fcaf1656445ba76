use crate::device::Capability;

/// Supported P-Touch models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    PT2430PC,
    PTP700, // TESTED
    PTP750W,
    PTE550W,
    PTD450,
    PTD460BT,
    PTD600,
    PTH500,
}

impl Model {
    pub const ALL: [Model; 8] = [
        Self::PT2430PC,
        Self::PTP700,
        Self::PTP750W,
        Self::PTE550W,
        Self::PTD450,
        Self::PTD460BT,
        Self::PTD600,
        Self::PTH500,
    ];

    pub fn from_pid(pid: u16) -> Option<Self> {
        match pid {
            0x2043 => Some(Self::PT2430PC),
            0x2061 => Some(Self::PTP700),
            0x2062 => Some(Self::PTP750W),
            0x2060 => Some(Self::PTE550W),
            0x2073 => Some(Self::PTD450),
            0x20e0 => Some(Self::PTD460BT),
            0x2074 => Some(Self::PTD600),
            0x205e => Some(Self::PTH500),
            _ => None,
        }
    }

    pub fn pid(&self) -> u16 {
        match self {
            Self::PT2430PC => 0x2043,
            Self::PTP700 => 0x2061,
            Self::PTP750W => 0x2062,
            Self::PTE550W => 0x2060,
            Self::PTD450 => 0x2073,
            Self::PTD460BT => 0x20e0,
            Self::PTD600 => 0x2074,
            Self::PTH500 => 0x205e,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PT2430PC => "PT-2430PC",
            Self::PTP700 => "PT-P700",
            Self::PTP750W => "PT-P750W",
            Self::PTE550W => "PT-E550W",
            Self::PTD450 => "PT-D450",
            Self::PTD460BT => "PT-D460BT",
            Self::PTD600 => "PT-D600",
            Self::PTH500 => "PT-H500",
        }
    }

    /// Pixels addressable by the print head.
    pub fn max_px(&self) -> u32 {
        128
    }

    pub fn capabilities(&self) -> Capability {
        match self {
            Self::PT2430PC => Capability::empty(),
            Self::PTP700 | Self::PTP750W | Self::PTE550W | Self::PTH500 => {
                Capability::PACKBITS
            }
            Self::PTD450 | Self::PTD600 => Capability::INFO_CMD,
            Self::PTD460BT => {
                Capability::INFO_CMD | Capability::VENDOR_MAGIC | Capability::PRECUT
            }
        }
    }
}
