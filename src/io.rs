//! File input/output.

pub mod binary;
pub mod text;
pub mod utils;

/// Byte order of binary grid files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Native,
    Little,
    Big,
}

impl Endianness {
    /// Parses the given byte order name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "native" => Some(Self::Native),
            "little" => Some(Self::Little),
            "big" => Some(Self::Big),
            _ => None,
        }
    }
}

/// How much status information to print while loading or writing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Quiet,
    Messages,
}

impl Verbosity {
    /// Whether non-critical status messages should be printed.
    pub fn print_messages(&self) -> bool {
        *self == Self::Messages
    }
}

/// How to handle existing files when writing output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverwriteMode {
    Always,
    Never,
    Ask,
}
