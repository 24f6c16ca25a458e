use crate::{FileRecord, Urn};

/// Files grouped by originating urn, in insertion order.
///
/// Archive entry enumeration follows this order, so two equal groupings
/// produce byte-identical archives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrnGroups {
    groups: Vec<(Urn, Vec<FileRecord>)>,
}

impl UrnGroups {
    pub fn new() -> Self { Self::default() }

    /// Append files under `urn`. Inserting an urn twice extends its group in
    /// place instead of creating a second one.
    pub fn insert(&mut self, urn: Urn, files: Vec<FileRecord>) {
        match self.groups.iter_mut().find(|(existing, _)| *existing == urn) {
            Some((_, group)) => group.extend(files),
            None => self.groups.push((urn, files)),
        }
    }

    pub fn get(&self, urn: Urn) -> Option<&[FileRecord]> {
        self.groups
            .iter()
            .find(|(existing, _)| *existing == urn)
            .map(|(_, files)| files.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Urn, &[FileRecord])> {
        self.groups.iter().map(|(urn, files)| (*urn, files.as_slice()))
    }

    pub fn urns(&self) -> impl Iterator<Item = Urn> + '_ { self.groups.iter().map(|(urn, _)| *urn) }

    pub fn group_count(&self) -> usize { self.groups.len() }

    pub fn file_count(&self) -> usize { self.groups.iter().map(|(_, files)| files.len()).sum() }

    /// True when no group holds any file, even if urns were inserted.
    pub fn is_empty(&self) -> bool { self.file_count() == 0 }
}

impl FromIterator<(Urn, Vec<FileRecord>)> for UrnGroups {
    fn from_iter<I: IntoIterator<Item = (Urn, Vec<FileRecord>)>>(iter: I) -> Self {
        let mut groups = Self::new();
        for (urn, files) in iter {
            groups.insert(urn, files);
        }
        groups
    }
}
