use crate::LlTypeId;

/// Backend type.
///
/// Pointers are typed so that `load` and `store` can check their operands.
/// Named structs are nominal: two named structs with the same fields are
/// still distinct types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LlType {
    Void,
    Int(u32),
    Float(u32),
    Ptr(LlTypeId),
    Struct {
        name: Option<String>,
        fields: Vec<LlTypeId>,
    },
}
