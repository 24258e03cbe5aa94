//! Fixed firmware tables for the X9: supported sensitivities, named colors,
//! and command opcodes.
//!
//! None of these values are tunable. They mirror what the mouse firmware
//! decodes; changing any of them breaks on-wire compatibility.

/// Supported sensitivity steps paired with their 4-bit firmware code.
///
/// Ascending by value. Codes 8, 10 and 12 are unused by the firmware and
/// must not appear here.
pub const SENSITIVITY_TABLE: [(u16, u8); 12] = [
    (200, 0x1),
    (400, 0x2),
    (600, 0x3),
    (800, 0x4),
    (1000, 0x5),
    (1200, 0x6),
    (1600, 0x7),
    (2000, 0x9),
    (2400, 0xB),
    (3200, 0xD),
    (4000, 0xE),
    (4800, 0xF),
];

/// Lowest sensitivity the mouse accepts.
pub const SENSITIVITY_MIN: u16 = SENSITIVITY_TABLE[0].0;
/// Highest sensitivity the mouse accepts.
pub const SENSITIVITY_MAX: u16 = SENSITIVITY_TABLE[SENSITIVITY_TABLE.len() - 1].0;

/// Iterate the supported sensitivity values in ascending order.
pub fn supported_sensitivities() -> impl Iterator<Item = u16> {
    SENSITIVITY_TABLE.iter().map(|&(value, _)| value)
}

/// Number of configuration profiles stored on the mouse.
pub const PROFILE_COUNT: usize = 6;

/// Command bytes understood by the X9 firmware.
pub mod opcodes {
    /// First byte of every payload.
    pub const HEADER: u8 = 0x07;
    /// Per-profile sensitivity command.
    pub const SENSITIVITY: u8 = 0x09;
    /// Lighting mode command.
    pub const LIGHTING_MODE: u8 = 0x13;
    /// Per-profile color command.
    pub const COLOR_PROFILE: u8 = 0x14;

    /// Base of the active-profile selector byte in the sensitivity command.
    pub const ACTIVE_PROFILE_BASE: u8 = 0x40;
    /// Offset added to the target profile in the sensitivity nibble.
    pub const TARGET_PROFILE_OFFSET: u8 = 7;

    /// Fixed (breathing) mode, minus the duration code.
    pub const MODE_FIXED_BASE: u8 = 0x86;
    /// Cyclic mode, minus the duration code.
    pub const MODE_CYCLIC_BASE: u8 = 0x96;
    /// Static mode.
    pub const MODE_STATIC: u8 = 0x86;
    /// Light off.
    pub const MODE_OFF: u8 = 0x87;
}

/// An RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// The named colors the LED can be set to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorName {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Violet,
    White,
}

impl ColorName {
    /// All colors, in the order they are listed to users.
    pub const ALL: [ColorName; 7] = [
        ColorName::Red,
        ColorName::Green,
        ColorName::Blue,
        ColorName::Yellow,
        ColorName::Cyan,
        ColorName::Violet,
        ColorName::White,
    ];

    /// Bit order of the cyclic color mask, as the firmware assigns it.
    pub const CYCLIC_ORDER: [ColorName; 7] = [
        ColorName::Yellow,
        ColorName::Blue,
        ColorName::Violet,
        ColorName::Green,
        ColorName::Red,
        ColorName::Cyan,
        ColorName::White,
    ];

    pub fn rgb(&self) -> Rgb {
        match self {
            Self::Red => Rgb::new(255, 0, 0),
            Self::Green => Rgb::new(0, 255, 0),
            Self::Blue => Rgb::new(0, 0, 255),
            Self::Yellow => Rgb::new(255, 255, 0),
            Self::Cyan => Rgb::new(0, 255, 255),
            Self::Violet => Rgb::new(255, 0, 255),
            Self::White => Rgb::new(255, 255, 255),
        }
    }

    /// Position of this color in the cyclic color mask.
    pub fn cyclic_bit(&self) -> usize {
        match self {
            Self::Yellow => 0,
            Self::Blue => 1,
            Self::Violet => 2,
            Self::Green => 3,
            Self::Red => 4,
            Self::Cyan => 5,
            Self::White => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Cyan => "cyan",
            Self::Violet => "violet",
            Self::White => "white",
        }
    }

    /// Parse a color token (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.name() == lower)
    }
}

impl std::fmt::Display for ColorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitivity_table_is_ascending() {
        let values: Vec<u16> = supported_sensitivities().collect();
        assert_eq!(values.len(), 12);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(SENSITIVITY_MIN, 200);
        assert_eq!(SENSITIVITY_MAX, 4800);
    }

    #[test]
    fn sensitivity_table_skips_reserved_codes() {
        for (_, code) in SENSITIVITY_TABLE {
            assert!(![8, 10, 12].contains(&code));
            assert!(code <= 0x0F);
        }
    }

    #[test]
    fn cyclic_order_covers_every_color_once() {
        for color in ColorName::ALL {
            let bit = color.cyclic_bit();
            assert_eq!(ColorName::CYCLIC_ORDER[bit], color);
        }
        assert_eq!(ColorName::Yellow.cyclic_bit(), 0);
        assert_eq!(ColorName::White.cyclic_bit(), 6);
    }

    #[test]
    fn cyclic_bits_match_firmware_assignment() {
        let bits: Vec<usize> = [
            ColorName::Yellow,
            ColorName::Blue,
            ColorName::Violet,
            ColorName::Green,
            ColorName::Red,
            ColorName::Cyan,
            ColorName::White,
        ]
        .iter()
        .map(ColorName::cyclic_bit)
        .collect();
        assert_eq!(bits, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn color_from_name_is_case_insensitive() {
        assert_eq!(ColorName::from_name("Red"), Some(ColorName::Red));
        assert_eq!(ColorName::from_name("VIOLET"), Some(ColorName::Violet));
        assert_eq!(ColorName::from_name("pink"), None);
        assert_eq!(ColorName::from_name("off"), None);
    }

    #[test]
    fn color_triples_match_names() {
        assert_eq!(ColorName::Yellow.rgb(), Rgb::new(255, 255, 0));
        assert_eq!(ColorName::Cyan.rgb(), Rgb::new(0, 255, 255));
        assert_eq!(ColorName::White.rgb(), Rgb::new(255, 255, 255));
    }
}
