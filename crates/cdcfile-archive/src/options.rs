/// Compression applied to every entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Self::Stored => zip::CompressionMethod::Stored,
            Self::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// How entries are laid out inside the archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArchiveLayout {
    /// Every file at the archive root under its own name.
    #[default]
    Flat,
    /// Each urn's files nested under a `"{urn} files/"` folder.
    Grouped,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ArchiveOptions {
    pub layout: ArchiveLayout,
    pub compression: Compression,
}

impl ArchiveOptions {
    pub fn layout(mut self, layout: ArchiveLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}
