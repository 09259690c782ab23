//! Binary version detection and per-version address tables

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::VariantLayout;
use crate::memory::AddressPath;
use crate::{AutosplitterError, Result};

/// Main module size of patch 1.1
pub const V11_MODULE_SIZE: usize = 6_635_520;
/// Main module size of patch 1.2
pub const V12_MODULE_SIZE: usize = 7_524_352;

/// Known memory layouts of `stvoy.exe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryVariant {
    /// Patch 1.1
    V11,
    /// Patch 1.2
    V12,
}

impl BinaryVariant {
    /// Layout used when the module size is not recognized
    pub const FALLBACK: BinaryVariant = BinaryVariant::V11;

    /// Map a main module size to a known variant
    pub fn from_module_size(size: usize) -> Option<Self> {
        match size {
            V11_MODULE_SIZE => Some(BinaryVariant::V11),
            V12_MODULE_SIZE => Some(BinaryVariant::V12),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BinaryVariant::V11 => "1.1",
            BinaryVariant::V12 => "1.2",
        }
    }
}

impl fmt::Display for BinaryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Where each tracked quantity lives for one binary variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressTable {
    /// Raw game state code (i32)
    pub game_state: AddressPath,
    /// Current map name (char buffer)
    pub current_map: AddressPath,
    /// Vorsoth health (i32), only meaningful on the boss map
    pub boss_health: AddressPath,
    /// Non-zero while a menu is open
    pub in_menu: AddressPath,
    /// Non-zero while a cinematic is being skipped, if known for this variant
    pub skipping_cinematic: Option<AddressPath>,
}

impl AddressTable {
    /// The built-in table for a variant
    pub fn for_variant(variant: BinaryVariant) -> Self {
        match variant {
            BinaryVariant::V11 => Self {
                game_state: AddressPath::Offset(0xC52D8),
                current_map: AddressPath::Offset(0x1C14FD),
                boss_health: AddressPath::Chain(vec![0x424B4, 0x3114]),
                in_menu: AddressPath::Offset(0x269570),
                skipping_cinematic: None,
            },
            BinaryVariant::V12 => Self {
                game_state: AddressPath::Offset(0xB9E78),
                current_map: AddressPath::Offset(0x1B709D),
                boss_health: AddressPath::Chain(vec![0x641C28, 0x7A04]),
                in_menu: AddressPath::Offset(0x269570),
                skipping_cinematic: None,
            },
        }
    }

    /// Replace the entries an override specifies, keeping the rest
    pub fn with_overrides(mut self, layout: &VariantLayout) -> Self {
        if let Some(path) = &layout.game_state {
            self.game_state = path.clone();
        }
        if let Some(path) = &layout.current_map {
            self.current_map = path.clone();
        }
        if let Some(path) = &layout.boss_health {
            self.boss_health = path.clone();
        }
        if let Some(path) = &layout.in_menu {
            self.in_menu = path.clone();
        }
        if let Some(path) = &layout.skipping_cinematic {
            self.skipping_cinematic = Some(path.clone());
        }
        self
    }
}

/// Resolve a module size to its variant and built-in address table.
///
/// Module metadata can be wrong for a short while after attach, so an
/// `UnsupportedVersion` here is not final; see [`VersionResolver`].
pub fn resolve(module_size: usize) -> Result<(BinaryVariant, AddressTable)> {
    BinaryVariant::from_module_size(module_size)
        .map(|variant| (variant, AddressTable::for_variant(variant)))
        .ok_or(AutosplitterError::UnsupportedVersion { module_size })
}

/// Number of extra ticks spent re-checking an unrecognized module size
pub const DEFAULT_VERSION_RETRIES: u32 = 100;

/// Outcome of one resolution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A known variant was detected
    Detected(BinaryVariant),
    /// Size not recognized; running on the fallback layout and still retrying
    Fallback(BinaryVariant),
    /// Retries exhausted; the fallback layout is kept for this process
    GaveUp(BinaryVariant),
}

impl Resolution {
    pub fn variant(&self) -> BinaryVariant {
        match *self {
            Resolution::Detected(v) | Resolution::Fallback(v) | Resolution::GaveUp(v) => v,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Resolution::Detected(_))
    }
}

/// Retrying version detection for one attached process.
///
/// The first unrecognized size is reported once as a warning and the
/// fallback layout is used; later attempts upgrade to the real layout as
/// soon as a known size shows up.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    retries_left: u32,
    last: Option<Resolution>,
}

impl VersionResolver {
    pub fn new(max_retries: u32) -> Self {
        Self {
            retries_left: max_retries,
            last: None,
        }
    }

    /// Whether another attempt could still change the outcome
    pub fn is_pending(&self) -> bool {
        !matches!(
            self.last,
            Some(Resolution::Detected(_)) | Some(Resolution::GaveUp(_))
        )
    }

    pub fn last(&self) -> Option<Resolution> {
        self.last
    }

    /// Try to resolve `module_size`, consuming one retry on failure
    pub fn attempt(&mut self, module_size: usize) -> Resolution {
        let resolution = match resolve(module_size) {
            Ok((variant, _)) => {
                if self.last.is_some() {
                    log::info!(
                        "Detected game version {} after retrying (module size {})",
                        variant,
                        module_size
                    );
                } else {
                    log::info!("Detected game version {}", variant);
                }
                Resolution::Detected(variant)
            }
            Err(err) => {
                if self.last.is_none() {
                    log::warn!(
                        "{}; using the {} layout until a known version is seen",
                        err,
                        BinaryVariant::FALLBACK
                    );
                }
                if self.retries_left == 0 {
                    log::warn!(
                        "Giving up on version detection, staying on the {} layout",
                        BinaryVariant::FALLBACK
                    );
                    Resolution::GaveUp(BinaryVariant::FALLBACK)
                } else {
                    self.retries_left -= 1;
                    Resolution::Fallback(BinaryVariant::FALLBACK)
                }
            }
        };

        self.last = Some(resolution);
        resolution
    }
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION_RETRIES)
    }
}
