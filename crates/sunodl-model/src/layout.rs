use std::path::{Path, PathBuf};

use crate::item::OutputKind;

/// Output folder layout for one run: one directory per output kind under a
/// common root, plus the failure log location.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir_for(&self, kind: OutputKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn failure_log_path(&self) -> PathBuf {
        self.root.join("Logs").join("failed.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new("/tmp/out");
        assert_eq!(
            layout.dir_for(OutputKind::Prompt),
            PathBuf::from("/tmp/out/Prompts")
        );
        assert_eq!(
            layout.failure_log_path(),
            PathBuf::from("/tmp/out/Logs/failed.txt")
        );
    }
}
