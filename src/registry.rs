//! The share registry, and the mapping from request paths to
//! filesystem paths.

use std::path::PathBuf;

use crate::config::{ConfigError, Share};
use crate::davpath::DavPath;

/// The ordered list of configured shares. Built once at startup,
/// read-only afterwards; handlers share it behind an `Arc`.
#[derive(Debug)]
pub struct ShareRegistry {
    shares: Vec<Share>,
}

/// What a request path points at.
///
/// Existence and kind of an `Entry` are not checked here; the
/// handlers ask the filesystem when they need to know, so the answer
/// always reflects live state.
#[derive(Debug, PartialEq, Eq)]
pub enum ResolvedTarget<'a> {
    /// The synthetic `/` collection listing all shares.
    VirtualRoot,
    /// The top of a share.
    ShareRoot(&'a Share),
    /// A path inside a share, joined onto the share's real root.
    Entry { share: &'a Share, real: PathBuf },
}

impl ShareRegistry {
    /// Validate the share list. Aliases must be non-empty, must not
    /// contain a slash, and must be unique.
    pub fn new(shares: Vec<Share>) -> Result<ShareRegistry, ConfigError> {
        for (i, share) in shares.iter().enumerate() {
            let a = &share.alias;
            if a.is_empty() || a == "." || a == ".." || a.contains('/') {
                return Err(ConfigError::InvalidAlias(a.clone()));
            }
            if shares[..i].iter().any(|s| &s.alias == a) {
                return Err(ConfigError::DuplicateAlias(a.clone()));
            }
        }
        Ok(ShareRegistry { shares })
    }

    /// Shares in configuration order. The order decides root listing
    /// order; aliases are unique so it does not affect matching.
    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    /// Map a request path onto a share. `None` means no alias matched.
    pub fn resolve<'a>(&'a self, path: &DavPath) -> Option<ResolvedTarget<'a>> {
        let (alias, rest) = match path.split_first() {
            None => return Some(ResolvedTarget::VirtualRoot),
            Some(x) => x,
        };
        let share = self.shares.iter().find(|s| s.alias == alias)?;
        if rest.is_empty() {
            Some(ResolvedTarget::ShareRoot(share))
        } else {
            let mut real = share.path.clone();
            real.extend(rest);
            Some(ResolvedTarget::Entry { share, real })
        }
    }
}
