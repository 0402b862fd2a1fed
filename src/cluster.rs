use std::fmt::Display;

use packed_struct::prelude::*;
use serde::{Deserialize, Serialize};

pub const SIGLIS_MANUFACTURER_CODE: u16 = 0x129C;

/// Siglis manufacturer specific cluster
pub const ZIGFRED_CLUSTER_ID: u16 = 0xFC42;

/// Buttons attribute (`uint32`): low byte is the button, second byte is the
/// press type
pub const ZIGFRED_BUTTONS_ATTRIBUTE_ID: u16 = 0x0008;

pub const ZIGFRED_CLUSTER_NAME: &str = "Siglis Manufacturer Specific";

/// Button on the zigfred front module, as encoded in bits 0..8 of the
/// buttons attribute.
///
/// Button and press type values are taken from observed firmware behavior.
/// Newer firmware may add values, so both enums are non-exhaustive.
#[derive(
    PrimitiveEnum_u8, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[non_exhaustive]
pub enum ButtonId {
    #[serde(rename = "button_1")]
    Button1 = 0,
    #[serde(rename = "button_2")]
    Button2 = 1,
    #[serde(rename = "button_3")]
    Button3 = 2,
    #[serde(rename = "button_4")]
    Button4 = 3,
}

impl ButtonId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Button1 => "button_1",
            Self::Button2 => "button_2",
            Self::Button3 => "button_3",
            Self::Button4 => "button_4",
        }
    }
}

impl Display for ButtonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Press type, as encoded in bits 8..16 of the buttons attribute.
#[derive(
    PrimitiveEnum_u8, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum PressType {
    LongRelease = 0,
    ShortPress = 1,
    DoublePress = 2,
    LongPress = 3,
}

impl PressType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LongRelease => "long_release",
            Self::ShortPress => "short_press",
            Self::DoublePress => "double_press",
            Self::LongPress => "long_press",
        }
    }
}

impl Display for PressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
