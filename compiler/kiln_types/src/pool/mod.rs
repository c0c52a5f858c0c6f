//! The type pool: storage, interning and classification queries.

use kiln_ir::{Name, StringInterner};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{Idx, Tag, TargetInfo, TypeFlags};

/// Compact type record: a tag plus one word of tag-specific data.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
struct Item {
    tag: Tag,
    data: u32,
}

/// Structural key for deduplicating constructed types.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
enum TypeKey {
    Pointer(Idx),
    Named(Tag, Name, SmallVec<[Name; 4]>),
}

/// Single owner of every type of a unit.
///
/// Parse results, namespace entries and backing structs hold `Idx`
/// handles only.
#[derive(Clone, Debug)]
pub struct Pool {
    items: Vec<Item>,
    flags: Vec<TypeFlags>,
    /// Named-type records: `[name, path_len, path...]`.
    extra: Vec<u32>,
    intern_map: FxHashMap<TypeKey, Idx>,
    target: TargetInfo,
}

impl Pool {
    pub fn new(target: TargetInfo) -> Self {
        let mut pool = Pool {
            items: Vec::with_capacity(64),
            flags: Vec::with_capacity(64),
            extra: Vec::new(),
            intern_map: FxHashMap::default(),
            target,
        };
        for tag in Tag::PRIMITIVES {
            pool.items.push(Item { tag, data: 0 });
            pool.flags.push(primitive_flags(tag));
        }
        debug_assert_eq!(pool.items.len(), Idx::PRIMITIVE_COUNT as usize);
        pool
    }

    pub fn target(&self) -> TargetInfo {
        self.target
    }

    fn push(&mut self, item: Item, flags: TypeFlags) -> Idx {
        let raw = u32::try_from(self.items.len()).unwrap_or(u32::MAX);
        self.items.push(item);
        self.flags.push(flags);
        Idx::from_raw(raw)
    }

    /// Number of types, primitives included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ── Construction ────────────────────────────────────────────────

    /// The interned pointer type `(p pointee)`.
    pub fn pointer_to(&mut self, pointee: Idx) -> Idx {
        let key = TypeKey::Pointer(pointee);
        if let Some(&idx) = self.intern_map.get(&key) {
            return idx;
        }
        let idx = self.push(
            Item {
                tag: Tag::Pointer,
                data: pointee.raw(),
            },
            TypeFlags::IS_POINTER,
        );
        self.intern_map.insert(key, idx);
        idx
    }

    /// The interned struct type `name` declared under namespace `path`.
    pub fn named_struct(&mut self, name: Name, path: &[Name]) -> Idx {
        self.named(Tag::Struct, name, path)
    }

    /// The interned enum type `name` declared under namespace `path`.
    pub fn named_enum(&mut self, name: Name, path: &[Name]) -> Idx {
        self.named(Tag::Enum, name, path)
    }

    fn named(&mut self, tag: Tag, name: Name, path: &[Name]) -> Idx {
        debug_assert!(tag.is_named());
        let key = TypeKey::Named(tag, name, SmallVec::from_slice(path));
        if let Some(&idx) = self.intern_map.get(&key) {
            return idx;
        }
        let data = u32::try_from(self.extra.len()).unwrap_or(u32::MAX);
        self.extra.push(name.raw());
        self.extra
            .push(u32::try_from(path.len()).unwrap_or(u32::MAX));
        self.extra.extend(path.iter().map(|n| n.raw()));
        let idx = self.push(
            Item { tag, data },
            TypeFlags::IS_AGGREGATE | TypeFlags::IS_NAMED,
        );
        self.intern_map.insert(key, idx);
        idx
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[inline]
    pub fn tag(&self, idx: Idx) -> Tag {
        self.items[idx.index()].tag
    }

    #[inline]
    pub fn flags(&self, idx: Idx) -> TypeFlags {
        self.flags[idx.index()]
    }

    /// Pointee of a pointer type; `None` for every other type.
    pub fn pointee(&self, idx: Idx) -> Option<Idx> {
        let item = self.items[idx.index()];
        (item.tag == Tag::Pointer).then(|| Idx::from_raw(item.data))
    }

    pub fn is_pointer(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_POINTER)
    }

    pub fn is_void(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_VOID)
    }

    pub fn is_integer(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_INTEGER)
    }

    pub fn is_signed(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_SIGNED)
    }

    pub fn is_float(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_FLOAT)
    }

    /// Bit width of an integer type under this pool's target.
    pub fn int_width(&self, idx: Idx) -> Option<u32> {
        let width = match self.tag(idx) {
            Tag::Char | Tag::Int8 | Tag::UInt8 => 8,
            Tag::Int16 | Tag::UInt16 => 16,
            Tag::Int32 | Tag::UInt32 => 32,
            Tag::Int64 | Tag::UInt64 => 64,
            Tag::Int128 | Tag::UInt128 => 128,
            Tag::Int | Tag::UInt => self.target.int_width,
            Tag::IntPtr | Tag::Size | Tag::PtrDiff => self.target.pointer_width,
            _ => return None,
        };
        Some(width)
    }

    pub fn float_width(&self, idx: Idx) -> Option<u32> {
        match self.tag(idx) {
            Tag::Float => Some(32),
            Tag::Double => Some(64),
            Tag::LongDouble => Some(self.target.long_double_width),
            _ => None,
        }
    }

    /// Declared name and namespace path of a struct or enum type.
    pub fn named_parts(&self, idx: Idx) -> Option<(Name, Vec<Name>)> {
        let item = self.items[idx.index()];
        if !item.tag.is_named() {
            return None;
        }
        let at = item.data as usize;
        let name = Name::from_raw(self.extra[at]);
        let len = self.extra[at + 1] as usize;
        let path = self.extra[at + 2..at + 2 + len]
            .iter()
            .map(|&raw| Name::from_raw(raw))
            .collect();
        Some((name, path))
    }

    /// Printable form used in diagnostics: `int`, `(p int)`, `ns.Colour`.
    pub fn format_type(&self, idx: Idx, interner: &StringInterner) -> String {
        let mut out = String::new();
        self.write_type(&mut out, idx, interner);
        out
    }

    fn write_type(&self, out: &mut String, idx: Idx, interner: &StringInterner) {
        if idx.is_none() {
            out.push_str("<none>");
            return;
        }
        if let Some(name) = idx.name() {
            out.push_str(name);
            return;
        }
        if let Some(pointee) = self.pointee(idx) {
            out.push_str("(p ");
            self.write_type(out, pointee, interner);
            out.push(')');
        } else if let Some((name, path)) = self.named_parts(idx) {
            for segment in path {
                out.push_str(interner.lookup(segment));
                out.push('.');
            }
            out.push_str(interner.lookup(name));
        }
    }
}

fn primitive_flags(tag: Tag) -> TypeFlags {
    let kind = match tag {
        Tag::Void => TypeFlags::IS_VOID,
        Tag::Bool => TypeFlags::empty(),
        Tag::Char
        | Tag::Int
        | Tag::Int8
        | Tag::Int16
        | Tag::Int32
        | Tag::Int64
        | Tag::Int128
        | Tag::IntPtr
        | Tag::PtrDiff => TypeFlags::IS_INTEGER | TypeFlags::IS_SIGNED,
        Tag::UInt
        | Tag::UInt8
        | Tag::UInt16
        | Tag::UInt32
        | Tag::UInt64
        | Tag::UInt128
        | Tag::Size => TypeFlags::IS_INTEGER,
        Tag::Float | Tag::Double | Tag::LongDouble => TypeFlags::IS_FLOAT,
        Tag::Pointer | Tag::Struct | Tag::Enum => {
            debug_assert!(false, "{tag:?} is not a primitive");
            TypeFlags::empty()
        }
    };
    kind | TypeFlags::IS_PRIMITIVE
}

impl Default for Pool {
    fn default() -> Self {
        Self::new(TargetInfo::default())
    }
}
