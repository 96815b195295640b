use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilesystemAttributes {
    /// Not every platform (or filesystem) records a birth time.
    pub creation_time: Option<OffsetDateTime>,
    pub size_bytes: u64,
}
