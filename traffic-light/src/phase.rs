use std::fmt;

use signal_shared_types::AtomicStateTransform;

/// The phase a traffic light is currently showing.
///
/// Note that this type uses `serde_repr` to ensure we serialize the value (C-style)
/// and not the name itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde_repr::Serialize_repr, serde_repr::Deserialize_repr)]
#[repr(u8)]
pub enum Phase {
    #[default]
    Red = 0,
    Green = 1
}

impl Phase {
    /// Returns the phase that follows this one. Lights only ever alternate.
    pub fn toggled(self) -> Self {
        match self {
            Self::Red => Self::Green,
            Self::Green => Self::Red
        }
    }

    pub fn is_green(self) -> bool {
        self == Self::Green
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Red => "red",
            Self::Green => "green"
        })
    }
}

impl AtomicStateTransform for Phase {
    /// What we need this stored as.
    fn to_i8(&self) -> i8 {
        match self {
            Self::Red => 0,
            Self::Green => 1
        }
    }

    /// Marshalling it back from an `i8`.
    fn from_i8(value: i8) -> Self {
        match value {
            0 => Self::Red,
            1 => Self::Green,

            // Only `to_i8()` ever writes into the backing atomic, so nothing else
            // can show up here.
            _ => unreachable!()
        }
    }
}
