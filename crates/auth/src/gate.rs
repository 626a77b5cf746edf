//! Permission derivation and the permission gate.
//!
//! - No IO
//! - No panics
//! - No logging: a missing or damaged principal record silently grants nothing

use std::collections::HashSet;

use crate::{Authority, Principal};

/// Flattened union of every authority granted by a principal's roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(HashSet<Authority>);

impl PermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, authority: &Authority) -> bool {
        self.0.contains(authority)
    }

    /// `true` iff every authority is granted. Vacuously `true` for no authorities.
    pub fn contains_all<'a, I>(&self, authorities: I) -> bool
    where
        I: IntoIterator<Item = &'a Authority>,
    {
        authorities.into_iter().all(|a| self.contains(a))
    }

    /// `true` iff at least one authority is granted. `false` for no authorities.
    pub fn contains_any<'a, I>(&self, authorities: I) -> bool
    where
        I: IntoIterator<Item = &'a Authority>,
    {
        authorities.into_iter().any(|a| self.contains(a))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Authority> {
        self.0.iter()
    }

    /// Granted authorities in lexical order (for display).
    pub fn sorted(&self) -> Vec<Authority> {
        let mut list: Vec<Authority> = self.0.iter().cloned().collect();
        list.sort();
        list
    }
}

impl FromIterator<Authority> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Authority>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Derive the permission set of a principal.
///
/// Pure function of its input: `None` (signed out, or an unreadable record)
/// yields the empty set.
pub fn derive_permissions(principal: Option<&Principal>) -> PermissionSet {
    principal
        .map(|p| {
            p.roles
                .iter()
                .flat_map(|role| role.authority_names())
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

pub fn has_authority(principal: Option<&Principal>, authority: &Authority) -> bool {
    derive_permissions(principal).contains(authority)
}

pub fn has_all_authorities<'a, I>(principal: Option<&Principal>, authorities: I) -> bool
where
    I: IntoIterator<Item = &'a Authority>,
{
    derive_permissions(principal).contains_all(authorities)
}

pub fn has_any_authority<'a, I>(principal: Option<&Principal>, authorities: I) -> bool
where
    I: IntoIterator<Item = &'a Authority>,
{
    derive_permissions(principal).contains_any(authorities)
}

/// Where the gate reads the current principal from.
///
/// The application wires this to the persisted session; tests can wire it to
/// anything.
pub trait PrincipalSource {
    /// The persisted principal record exactly as stored, if any.
    fn raw_record(&self) -> Option<String>;

    /// Changes every time this handle rewrites or removes the record.
    fn revision(&self) -> u64;
}

impl<T> PrincipalSource for &T
where
    T: PrincipalSource + ?Sized,
{
    fn raw_record(&self) -> Option<String> {
        (**self).raw_record()
    }

    fn revision(&self) -> u64 {
        (**self).revision()
    }
}

/// What the source held when the gate was cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClearMark {
    revision: u64,
    record: Option<String>,
}

/// Answers authorization questions about the current principal.
///
/// Every query re-reads the source and re-derives the set; nothing is cached
/// between calls, so a login or logout is visible to the very next check.
///
/// [`PermissionGate::clear`] forces "no permissions" regardless of what the
/// source holds, until a new principal record is persisted: either through
/// this source, or by anyone else writing a different record.
#[derive(Debug)]
pub struct PermissionGate<P> {
    source: P,
    cleared: Option<ClearMark>,
}

impl<P: PrincipalSource> PermissionGate<P> {
    pub fn new(source: P) -> Self {
        Self {
            source,
            cleared: None,
        }
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    /// Mutable access to the source (login, logout, profile refresh).
    pub fn source_mut(&mut self) -> &mut P {
        &mut self.source
    }

    pub fn is_cleared(&self) -> bool {
        self.is_cleared_for(&self.source.raw_record())
    }

    fn is_cleared_for(&self, record: &Option<String>) -> bool {
        self.cleared
            .as_ref()
            .is_some_and(|mark| mark.revision == self.source.revision() && mark.record == *record)
    }

    /// The principal the gate currently answers for.
    ///
    /// `None` after [`PermissionGate::clear`] even if the source still holds a
    /// record.
    pub fn principal(&self) -> Option<Principal> {
        let record = self.source.raw_record();
        if self.is_cleared_for(&record) {
            return None;
        }
        Principal::from_record(&record?)
    }

    /// Freshly derived permission set.
    pub fn permissions(&self) -> PermissionSet {
        derive_permissions(self.principal().as_ref())
    }

    pub fn has_authority(&self, authority: &Authority) -> bool {
        self.permissions().contains(authority)
    }

    pub fn has_all_authorities<'a, I>(&self, authorities: I) -> bool
    where
        I: IntoIterator<Item = &'a Authority>,
    {
        self.permissions().contains_all(authorities)
    }

    pub fn has_any_authority<'a, I>(&self, authorities: I) -> bool
    where
        I: IntoIterator<Item = &'a Authority>,
    {
        self.permissions().contains_any(authorities)
    }

    /// Drop every permission until a new principal record is persisted.
    pub fn clear(&mut self) {
        self.cleared = Some(ClearMark {
            revision: self.source.revision(),
            record: self.source.raw_record(),
        });
    }
}
