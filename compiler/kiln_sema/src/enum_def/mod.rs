//! Enum records and their staged construction.

use kiln_ir::Name;
use kiln_types::Idx;
use rustc_hash::FxHashMap;

use crate::Linkage;

/// A registered enum. Immutable once committed to a namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enum {
    pub linkage: Linkage,
    pub once_tag: Option<String>,
    /// The public enum type.
    pub ty: Idx,
    /// Integer type of the backing member.
    pub underlying: Idx,
    members: Vec<(Name, i128)>,
    index: FxHashMap<Name, usize>,
}

impl Enum {
    pub fn member_value(&self, name: Name) -> Option<i128> {
        self.index.get(&name).map(|&i| self.members[i].1)
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[(Name, i128)] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Why a member could not be added.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemberError {
    /// The name is already a member of this enum.
    Duplicate,
    /// The value does not fit the underlying type.
    OutOfRange(i128),
}

/// Local, unpublished member table for an enum under construction.
///
/// A declaration builds one of these, and only a fully validated builder is
/// turned into an [`Enum`] and registered, so a failing declaration never
/// leaves a partial enum behind.
#[derive(Clone, Debug)]
pub struct EnumBuilder {
    members: Vec<(Name, i128)>,
    index: FxHashMap<Name, usize>,
    next: i128,
    min: i128,
    max: i128,
}

impl EnumBuilder {
    /// Builder for an underlying integer of `bits` bits.
    pub fn new(bits: u32, signed: bool) -> Self {
        let (min, max) = int_range(bits, signed);
        EnumBuilder {
            members: Vec::new(),
            index: FxHashMap::default(),
            next: 0,
            min,
            max,
        }
    }

    /// Add a member valued one past the previous member (0 for the first).
    pub fn add_auto(&mut self, name: Name) -> Result<i128, MemberError> {
        let value = self.next;
        self.add(name, value)?;
        Ok(value)
    }

    /// Add a member with an explicit value; later auto members continue from it.
    pub fn add_explicit(&mut self, name: Name, value: i128) -> Result<(), MemberError> {
        self.add(name, value)
    }

    fn add(&mut self, name: Name, value: i128) -> Result<(), MemberError> {
        if self.index.contains_key(&name) {
            return Err(MemberError::Duplicate);
        }
        if value < self.min || value > self.max {
            return Err(MemberError::OutOfRange(value));
        }
        self.index.insert(name, self.members.len());
        self.members.push((name, value));
        // i128::MAX + 1 only matters if another auto member follows, and
        // that one is then rejected as out of range.
        self.next = value.saturating_add(1);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn finish(
        self,
        linkage: Linkage,
        once_tag: Option<String>,
        ty: Idx,
        underlying: Idx,
    ) -> Enum {
        Enum {
            linkage,
            once_tag,
            ty,
            underlying,
            members: self.members,
            index: self.index,
        }
    }
}

/// Inclusive value range of an integer type, clamped to `i128`.
pub(crate) fn int_range(bits: u32, signed: bool) -> (i128, i128) {
    match (signed, bits) {
        (true, b) if b >= 128 => (i128::MIN, i128::MAX),
        (true, b) => (-(1i128 << (b - 1)), (1i128 << (b - 1)) - 1),
        (false, b) if b >= 127 => (0, i128::MAX),
        (false, b) => (0, (1i128 << b) - 1),
    }
}
