//! This file contains the file list used by disc image browsers: a fixed
//! capacity table of names, with a separate listing order so entries can be
//! sorted and filtered without moving the names about.
//!
//! Entries are stored in the order they are added.  The listing order starts
//! out the same, and is rearranged by [`FileList::sort`] and
//! [`FileList::clean`].  Positions passed to [`FileList::get`] and
//! [`FileList::index_of`] are positions in the listing.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use core::cmp::Ordering;
use core::fmt;
use heapless::{String, Vec};

/// Longest name stored, in bytes.  Longer names are cut short.
pub const MAX_NAME_LEN: usize = 255;

/// Default number of entries in a [`FileList`].
pub const MAX_FILE_ITEMS: usize = 4096;

const BIN_SUFFIX: &str = ".bin";
const CUE_SUFFIX: &str = ".cue";

/// File list errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CatalogError {
    /// The list has no room for another entry.
    Full,

    /// The index is beyond the end of the list.
    OutOfRange,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Full => write!(f, "File list full"),
            CatalogError::OutOfRange => write!(f, "Index out of range"),
        }
    }
}

/// A directory or file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub is_dir: bool,
    pub name: String<MAX_NAME_LEN>,
}

impl FileEntry {
    /// Create an entry, cutting `name` short at [`MAX_NAME_LEN`] bytes if
    /// needed.  The cut is made on a character boundary.
    pub fn new(is_dir: bool, name: &str) -> Self {
        let mut end = name.len().min(MAX_NAME_LEN);
        while !name.is_char_boundary(end) {
            end -= 1;
        }

        let mut stored = String::new();
        // Can't fail - end is within capacity.
        let _ = stored.push_str(&name[..end]);

        Self {
            is_dir,
            name: stored,
        }
    }

    // Directories first, then by name, byte by byte.
    fn listing_cmp(&self, other: &Self) -> Ordering {
        other
            .is_dir
            .cmp(&self.is_dir)
            .then_with(|| self.name.as_bytes().cmp(other.name.as_bytes()))
    }
}

/// A list of up to `N` entries.
///
/// Entries are stored inline, so a list is large - over 1MB at the default
/// capacity.  Keep a full size list in a `static`, behind whatever lock the
/// platform uses, rather than on the stack - [`FileList::new`] is `const` for
/// this.  Or pick a smaller `N`.
#[derive(Debug, Clone)]
pub struct FileList<const N: usize = MAX_FILE_ITEMS> {
    entries: Vec<FileEntry, N>,
    order: Vec<u16, N>,
}

impl<const N: usize> Default for FileList<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FileList<N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Store an entry at `index`, where `index` is in storage order.
    ///
    /// An index equal to the number of stored entries appends.  Replacing an
    /// existing entry puts the listing back into storage order, as a sort or
    /// clean done before may no longer hold.
    pub fn set(&mut self, index: usize, is_dir: bool, name: &str) -> Result<(), CatalogError> {
        let entry = FileEntry::new(is_dir, name);
        let stored = self.entries.len();

        match index.cmp(&stored) {
            Ordering::Less => {
                self.entries[index] = entry;
                self.reset_order()
            }
            Ordering::Equal => {
                let id = u16::try_from(index).map_err(|_| CatalogError::Full)?;
                self.entries.push(entry).map_err(|_| CatalogError::Full)?;
                if self.order.len() != stored {
                    return self.reset_order();
                }
                self.order.push(id).map_err(|_| CatalogError::Full)
            }
            Ordering::Greater => Err(CatalogError::OutOfRange),
        }
    }

    /// The entry at `position` in the listing.
    pub fn get(&self, position: usize) -> Option<&FileEntry> {
        let index = self.index_of(position)?;
        self.entries.get(usize::from(index))
    }

    /// The storage index of the entry at `position` in the listing.
    pub fn index_of(&self, position: usize) -> Option<u16> {
        self.order.get(position).copied()
    }

    /// Entries in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> + '_ {
        self.order
            .iter()
            .filter_map(|index| self.entries.get(usize::from(*index)))
    }

    /// Sort the listing: directories first, then by name.
    pub fn sort(&mut self) {
        let entries = &self.entries;
        self.order.sort_unstable_by(|a, b| {
            entries[usize::from(*a)].listing_cmp(&entries[usize::from(*b)])
        });
    }

    /// Drop `.bin` entries which are immediately followed by a `.cue` of the
    /// same name - the cue sheet is the one to open.
    ///
    /// Best done after [`FileList::sort`], which puts the pairs next to each
    /// other.
    pub fn clean(&mut self) {
        let mut position = 0;
        while position + 1 < self.order.len() {
            if self.is_bin_for_next(position) {
                let index = self.order.remove(position);
                trace!("Hiding entry {=u16}, it has a cue sheet", index);
                continue;
            }
            position += 1;
        }
    }

    /// Number of entries in the listing.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn reset_order(&mut self) -> Result<(), CatalogError> {
        self.order.clear();
        for index in 0..self.entries.len() {
            let id = u16::try_from(index).map_err(|_| CatalogError::Full)?;
            self.order.push(id).map_err(|_| CatalogError::Full)?;
        }
        Ok(())
    }

    fn is_bin_for_next(&self, position: usize) -> bool {
        let (Some(bin), Some(cue)) = (self.get(position), self.get(position + 1)) else {
            return false;
        };
        let (bin, cue) = (bin.name.as_bytes(), cue.name.as_bytes());

        let Some(stem) = bin.strip_suffix(BIN_SUFFIX.as_bytes()) else {
            return false;
        };
        cue.strip_suffix(CUE_SUFFIX.as_bytes()) == Some(stem)
    }
}
