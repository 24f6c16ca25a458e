use std::collections::HashSet;

const FALLBACK_NAME: &str = "file";

/// Reduce a file name to a single safe archive path component.
///
/// Directory parts (either separator), `.`/`..` components and NUL bytes are
/// dropped, as are blank components. The kept component is otherwise
/// verbatim, surrounding whitespace included. Nothing usable left yields
/// `file`.
pub fn sanitize_entry_name(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return FALLBACK_NAME.to_string();
    };
    let cleaned: String = raw.chars().filter(|c| *c != '\0').collect();
    cleaned
        .split(['/', '\\'])
        .filter(|part| !part.trim().is_empty() && *part != "." && *part != "..")
        .last()
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// Hands out unique entry paths within one archive.
#[derive(Debug, Default)]
pub struct EntryNamer {
    taken: HashSet<String>,
}

impl EntryNamer {
    pub fn new() -> Self { Self::default() }

    /// Full entry path for `file_name` under optional `folder`, renamed to
    /// `stem (n).ext` if the path is already in use.
    pub fn next_name(&mut self, folder: Option<&str>, file_name: Option<&str>) -> String {
        let name = sanitize_entry_name(file_name);
        let mut candidate = join(folder, &name);
        let mut counter = 2;
        while self.taken.contains(&candidate) {
            candidate = join(folder, &numbered(&name, counter));
            counter += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

fn join(folder: Option<&str>, name: &str) -> String {
    match folder {
        Some(folder) => format!("{folder}/{name}"),
        None => name.to_string(),
    }
}

fn numbered(name: &str, counter: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({counter}).{ext}"),
        _ => format!("{name} ({counter})"),
    }
}
