mod file;
mod key;
mod location;
mod source;

use append_only_vec::AppendOnlyVec;
pub use file::SourceFile;
pub use key::SourceFileKey;
pub use location::Location;
pub use source::{Source, Sourced};
use std::{fmt::Debug, path::PathBuf};

pub struct SourceFiles {
    files: AppendOnlyVec<SourceFile>,
}

impl Debug for SourceFiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFiles")
            .field("len", &self.files.len())
            .finish_non_exhaustive()
    }
}

impl SourceFiles {
    pub const INTERNAL_KEY: SourceFileKey = SourceFileKey(0);

    pub fn new() -> Self {
        let files = AppendOnlyVec::new();

        // Members synthesized by the compiler point at the <internal> file
        let internal = files.push(SourceFile::new("<internal>".into(), String::new()));
        assert_eq!(internal, Self::INTERNAL_KEY.0 as usize);

        Self { files }
    }

    pub fn get(&self, key: SourceFileKey) -> &SourceFile {
        &self.files[key.0 as usize]
    }

    pub fn add(&self, filename: PathBuf, content: String) -> SourceFileKey {
        let index = self.files.push(SourceFile::new(filename, content));
        SourceFileKey(u32::try_from(index).expect("too many source files"))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn test_internal_file_is_first() {
    let source_files = SourceFiles::new();
    let key = source_files.add("shapes.rec".into(), "record Point(int X, int Y);".into());

    assert_eq!(source_files.get(SourceFiles::INTERNAL_KEY).filename(), "<internal>");
    assert_eq!(source_files.get(key).filename(), "shapes.rec");
    assert_eq!(source_files.len(), 2);
}
