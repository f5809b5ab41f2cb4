//! Shared-link parsing.
//!
//! # Design
//! - Parsing is pure: no network access, no normalisation beyond trimming.
//! - File links are matched against an ordered list of shapes; first match wins.
//! - The plausibility check is a length floor only. It filters obvious junk and
//!   is not an authorization or existence check.

use regex::Regex;

use crate::error::{LinkError, LinkKind};

/// Minimum identifier length accepted by [`LinkParser::ensure_plausible`].
pub const MIN_IDENTIFIER_LEN: usize = 10;

const FOLDER_MARKER: &str = "/folders/";
const FILE_PATH_PATTERN: &str = r"/file/d/([^/?#]+)";
const OPEN_QUERY_PATTERN: &str = r"open\?(?:[^#]*&)?id=([^&#]+)";
const UC_QUERY_PATTERN: &str = r"uc\?(?:[^#]*&)?id=([^&#]+)";

/// Extracts Drive identifiers from shared links.
#[derive(Debug, Clone)]
pub struct LinkParser {
    file_shapes: Vec<Regex>,
}

impl LinkParser {
    /// Compile the recognised file-link shapes.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::RegexCompile`] if a built-in pattern fails to compile.
    pub fn new() -> Result<Self, LinkError> {
        let file_shapes = [FILE_PATH_PATTERN, OPEN_QUERY_PATTERN, UC_QUERY_PATTERN]
            .into_iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| LinkError::RegexCompile { pattern, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { file_shapes })
    }

    /// Extract the folder identifier from a `/folders/<id>` link.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidLink`] when the marker is absent or the
    /// identifier segment is empty.
    #[allow(clippy::unused_self)]
    pub fn parse_folder_id(&self, link: &str) -> Result<String, LinkError> {
        let invalid = || LinkError::InvalidLink {
            kind: LinkKind::Folder,
        };
        let (_, tail) = link.trim().split_once(FOLDER_MARKER).ok_or_else(invalid)?;
        let id = tail
            .split(['?', '#', '/'])
            .next()
            .unwrap_or_default();
        if id.is_empty() {
            return Err(invalid());
        }
        Ok(id.to_string())
    }

    /// Extract the file identifier from a shared file link.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidLink`] when no recognised shape matches.
    pub fn parse_file_id(&self, link: &str) -> Result<String, LinkError> {
        let link = link.trim();
        self.file_shapes
            .iter()
            .find_map(|shape| shape.captures(link))
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str().to_string())
            .ok_or(LinkError::InvalidLink {
                kind: LinkKind::File,
            })
    }

    /// Reject identifiers shorter than [`MIN_IDENTIFIER_LEN`] characters.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidIdentifier`] for identifiers that are too short.
    #[allow(clippy::unused_self)]
    pub fn ensure_plausible(&self, kind: LinkKind, id: &str) -> Result<(), LinkError> {
        if id.chars().count() >= MIN_IDENTIFIER_LEN {
            Ok(())
        } else {
            Err(LinkError::InvalidIdentifier {
                kind,
                value: id.to_string(),
            })
        }
    }
}
