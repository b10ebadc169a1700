use platform::PanelError;

/// Errors from the display engine and the panel driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// A region or plane cursor falls outside the panel.
    OutOfBounds,
    /// Storage could not supply the requested asset.
    AssetUnavailable,
    /// BUSY did not deassert within the polling budget.
    ProtocolTimeout,
    /// Asset data is malformed, truncated or in an unsupported format.
    InvalidAsset,
    /// Operation issued in the wrong refresh protocol state.
    InvalidState,
    /// Font index outside the font set.
    UnknownFont,
    /// A working buffer could not be allocated.
    Capacity,
    /// SPI communication error.
    Communication,
    /// GPIO operation error.
    Gpio,
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "Region out of bounds"),
            Self::AssetUnavailable => write!(f, "Asset unavailable"),
            Self::ProtocolTimeout => write!(f, "Panel busy timeout"),
            Self::InvalidAsset => write!(f, "Invalid asset"),
            Self::InvalidState => write!(f, "Invalid panel state"),
            Self::UnknownFont => write!(f, "Unknown font"),
            Self::Capacity => write!(f, "Buffer allocation failed"),
            Self::Communication => write!(f, "SPI communication error"),
            Self::Gpio => write!(f, "GPIO error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DisplayError {}

impl From<PanelError> for DisplayError {
    fn from(e: PanelError) -> Self {
        match e {
            PanelError::Communication => Self::Communication,
            PanelError::Timeout => Self::ProtocolTimeout,
            PanelError::InvalidState => Self::InvalidState,
            PanelError::InvalidRegion => Self::OutOfBounds,
        }
    }
}
