//! Cache destination resolution

use std::path::{Path, PathBuf};

use super::errors::{CacheError, Result};

/// Where a cache directory lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The platform scratch directory
    Temporary,
    /// A named subfolder of the user's documents directory
    NamedFolder(String),
}

impl Destination {
    /// Resolve to an absolute directory path
    ///
    /// Fails with [`CacheError::NoDocumentDir`] for a named folder when the
    /// platform has no documents directory.
    pub fn resolve(&self) -> Result<PathBuf> {
        self.resolve_in(dirs::document_dir().as_deref())
    }

    /// Resolve against an explicit documents root
    pub fn resolve_in(&self, documents_root: Option<&Path>) -> Result<PathBuf> {
        match self {
            Destination::Temporary => Ok(std::env::temp_dir()),
            Destination::NamedFolder(name) => documents_root
                .map(|root| root.join(name))
                .ok_or(CacheError::NoDocumentDir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_resolves_to_temp_dir() {
        let dir = Destination::Temporary.resolve().unwrap();
        assert_eq!(dir, std::env::temp_dir());
    }

    #[test]
    fn test_named_folder_joins_documents_root() {
        let dest = Destination::NamedFolder("thumbnails".to_string());
        let dir = dest.resolve_in(Some(Path::new("/home/me/Documents"))).unwrap();
        assert_eq!(dir, PathBuf::from("/home/me/Documents/thumbnails"));
    }

    #[test]
    fn test_named_folder_without_documents_root() {
        let dest = Destination::NamedFolder("thumbnails".to_string());
        assert!(matches!(
            dest.resolve_in(None),
            Err(CacheError::NoDocumentDir)
        ));
    }
}
