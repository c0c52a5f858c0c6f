//! Error codes for all compiler diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E2001`) with the first digit
//! indicating the phase that raised it.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: Form shape and arity errors
/// - E2xxx: Type errors
/// - E3xxx: Declaration / redeclaration errors
/// - E4xxx: Lifetime (destruction) errors
/// - E5xxx: Backend IR errors
/// - E6xxx: Macro expansion errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Form Errors (E1xxx)
    /// Incorrect number of arguments
    E1001,
    /// Too few arguments
    E1002,
    /// Unexpected element in a form
    E1003,
    /// Argument has the wrong shape (list vs atom)
    E1004,
    /// Invalid linkage specifier
    E1005,
    /// Empty list cannot be evaluated
    E1006,

    // Type Errors (E2xxx)
    /// Cannot dereference non-pointer
    E2001,
    /// Cannot dereference void pointer
    E2002,
    /// Variable not in scope
    E2003,
    /// Type not in scope
    E2004,
    /// Enum type must be integer
    E2005,
    /// Integer literal out of range for its type
    E2006,
    /// No function or macro overload matches the arguments
    E2007,
    /// Cannot take the address of a non-lvalue
    E2008,
    /// Branches of a conditional have different types
    E2009,
    /// Condition is not a boolean
    E2010,
    /// Body type does not match the declared return type
    E2011,
    /// Value type does not match the destination type
    E2012,

    // Declaration Errors (E3xxx)
    /// Redeclaration of enum
    E3001,
    /// Redeclaration of struct
    E3002,
    /// Redeclaration of enum element
    E3003,
    /// Redeclaration of function
    E3004,
    /// Redeclaration of variable
    E3005,

    // Lifetime Errors (E4xxx)
    /// Destructor could not be emitted
    E4001,
    /// Value is owned by one branch and borrowed by the other
    E4002,

    // Backend Errors (E5xxx)
    /// Backend rejected an instruction or definition
    E5001,

    // Macro Errors (E6xxx)
    /// Macro expansion failed
    E6001,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// One-line summary used when a diagnostic carries no custom message.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "incorrect number of arguments",
            ErrorCode::E1002 => "too few arguments",
            ErrorCode::E1003 => "unexpected element",
            ErrorCode::E1004 => "incorrect argument type",
            ErrorCode::E1005 => "invalid linkage",
            ErrorCode::E1006 => "empty list cannot be evaluated",
            ErrorCode::E2001 => "cannot dereference non-pointer",
            ErrorCode::E2002 => "cannot dereference void pointer",
            ErrorCode::E2003 => "variable not in scope",
            ErrorCode::E2004 => "type not in scope",
            ErrorCode::E2005 => "enum type must be integer",
            ErrorCode::E2006 => "integer literal out of range",
            ErrorCode::E2007 => "no matching function or macro",
            ErrorCode::E2008 => "cannot take address of non-lvalue",
            ErrorCode::E2009 => "branch types differ",
            ErrorCode::E2010 => "condition must be bool",
            ErrorCode::E2011 => "return type mismatch",
            ErrorCode::E2012 => "incorrect value type",
            ErrorCode::E3001 => "redeclaration of enum",
            ErrorCode::E3002 => "redeclaration of struct",
            ErrorCode::E3003 => "redeclaration of enum element",
            ErrorCode::E3004 => "redeclaration of function",
            ErrorCode::E3005 => "redeclaration of variable",
            ErrorCode::E4001 => "destructor could not be emitted",
            ErrorCode::E4002 => "branches differ in ownership",
            ErrorCode::E5001 => "backend error",
            ErrorCode::E6001 => "macro expansion failed",
            ErrorCode::E9001 => "internal compiler error",
        }
    }

    /// Check if this is a form shape or arity error (E1xxx range).
    pub fn is_form_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001
                | ErrorCode::E1002
                | ErrorCode::E1003
                | ErrorCode::E1004
                | ErrorCode::E1005
                | ErrorCode::E1006
        )
    }

    /// Check if this is a type error (E2xxx range).
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E2001
                | ErrorCode::E2002
                | ErrorCode::E2003
                | ErrorCode::E2004
                | ErrorCode::E2005
                | ErrorCode::E2006
                | ErrorCode::E2007
                | ErrorCode::E2008
                | ErrorCode::E2009
                | ErrorCode::E2010
                | ErrorCode::E2011
                | ErrorCode::E2012
        )
    }

    /// Check if this is a redeclaration error (E3xxx range).
    pub fn is_declaration_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E3001
                | ErrorCode::E3002
                | ErrorCode::E3003
                | ErrorCode::E3004
                | ErrorCode::E3005
        )
    }

    /// Check if this is a lifetime error (E4xxx range).
    pub fn is_lifetime_error(&self) -> bool {
        matches!(self, ErrorCode::E4001 | ErrorCode::E4002)
    }

    /// Check if this is a backend error (E5xxx range).
    pub fn is_backend_error(&self) -> bool {
        matches!(self, ErrorCode::E5001)
    }

    /// Check if this is a macro expansion error (E6xxx range).
    pub fn is_macro_error(&self) -> bool {
        matches!(self, ErrorCode::E6001)
    }

    /// Check if this is an internal compiler error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests;
