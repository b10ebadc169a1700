//! Storage abstraction for the asset file system

/// Read-only file access used to load bitmap assets.
///
/// Names are relative to the storage root (the SD card mount point on
/// hardware). Reads are synchronous; the SD card shares the panel's SPI bus
/// and both are driven from the display task.
pub trait Storage {
    /// Error type
    type Error: core::fmt::Debug;

    /// Size of `name` in bytes.
    fn file_size(&mut self, name: &str) -> Result<usize, Self::Error>;

    /// Read `name` from the start into `buf`.
    ///
    /// Returns the number of bytes read, which is less than `buf.len()`
    /// when the file is shorter than the buffer.
    fn read_file(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Check if `name` exists
    fn exists(&mut self, name: &str) -> Result<bool, Self::Error>;
}
