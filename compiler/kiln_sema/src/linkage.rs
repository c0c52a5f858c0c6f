/// Visibility of a declared symbol.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Linkage {
    /// Local to the unit.
    Intern,
    /// Visible to other units.
    Extern,
}

impl Linkage {
    pub fn from_keyword(text: &str) -> Option<Self> {
        match text {
            "intern" => Some(Linkage::Intern),
            "extern" => Some(Linkage::Extern),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Linkage::Intern => "intern",
            Linkage::Extern => "extern",
        }
    }

    pub fn backend(self) -> kiln_backend::Linkage {
        match self {
            Linkage::Intern => kiln_backend::Linkage::Internal,
            Linkage::Extern => kiln_backend::Linkage::External,
        }
    }
}
