use std::path::Path;

const CLASS_SUFFIX: &str = ".class";
const ARCHIVE_SUFFIXES: [&str; 4] = [".jar", ".ear", ".zip", ".war"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    ClassFile,
    Archive,
    Other,
}

impl EntryKind {
    pub fn for_path(path: &Path) -> Self {
        classify(&path.to_string_lossy())
    }
}

/// Suffix match, case-sensitive.
pub fn classify(name: &str) -> EntryKind {
    if is_class_name(name) {
        return EntryKind::ClassFile;
    }
    if ARCHIVE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        return EntryKind::Archive;
    }
    EntryKind::Other
}

pub fn is_class_name(name: &str) -> bool {
    name.ends_with(CLASS_SUFFIX)
}
