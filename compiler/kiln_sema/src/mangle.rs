//! Symbol mangling.
//!
//! # Scheme
//!
//! ```text
//! _kiln_[<ns>$...]<name>[$$<param>$C<param>...]
//! ```
//!
//! - `_kiln_` marks every kiln symbol
//! - enclosing namespaces are joined with `$`
//! - identifiers keep `[A-Za-z0-9_]`; punctuation becomes a `$` escape
//! - function symbols append their parameter types after `$$`, so each
//!   overload gets its own symbol
//!
//! | Declaration | Symbol |
//! |-------------|--------|
//! | `MyEnum` at root | `_kiln_MyEnum` |
//! | `Colour` in `gfx` | `_kiln_gfx$Colour` |
//! | `(= (a E) (b E))` in root | `_kiln_$EQ$$E$CE` |
//! | `destroy ((p (p int)))` | `_kiln_destroy$$$LPp_$LPp_int$RP$RP` |

use std::fmt::Write;

/// Prefix of every mangled symbol.
pub const MANGLE_PREFIX: &str = "_kiln_";

/// Prefix of the backend name of a struct type.
pub const STRUCT_PREFIX: &str = "struct_";

const NAMESPACE_SEP: char = '$';
const PARAMS_SEP: &str = "$$";
const PARAM_SEP: &str = "$C";

#[derive(Debug, Clone, Copy, Default)]
pub struct Mangler;

impl Mangler {
    pub fn new() -> Self {
        Mangler
    }

    /// Symbol for `name` declared under `path`.
    pub fn mangle_name(&self, path: &[&str], name: &str) -> String {
        let mut out = String::with_capacity(32);
        out.push_str(MANGLE_PREFIX);
        for segment in path {
            self.encode_identifier(&mut out, segment);
            out.push(NAMESPACE_SEP);
        }
        self.encode_identifier(&mut out, name);
        out
    }

    /// Symbol for one overload of a function. `params` are printable type names.
    pub fn mangle_function(&self, path: &[&str], name: &str, params: &[String]) -> String {
        let mut out = self.mangle_name(path, name);
        if !params.is_empty() {
            out.push_str(PARAMS_SEP);
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(PARAM_SEP);
                }
                self.encode_identifier(&mut out, param);
            }
        }
        out
    }

    /// Backend type name for a struct declared as `name` under `path`.
    pub fn struct_symbol(&self, path: &[&str], name: &str) -> String {
        format!("{STRUCT_PREFIX}{}", self.mangle_name(path, name))
    }

    #[allow(clippy::unused_self)]
    fn encode_identifier(&self, out: &mut String, name: &str) {
        for c in name.chars() {
            match c {
                c if c.is_ascii_alphanumeric() || c == '_' => out.push(c),
                ' ' => out.push('_'),
                '<' => out.push_str("$LT"),
                '>' => out.push_str("$GT"),
                '=' => out.push_str("$EQ"),
                '!' => out.push_str("$BG"),
                '-' => out.push_str("$D"),
                '@' => out.push_str("$AT"),
                '#' => out.push_str("$HS"),
                '(' => out.push_str("$LP"),
                ')' => out.push_str("$RP"),
                '.' => out.push_str("$DT"),
                _ => {
                    let _ = write!(out, "${:02x}", c as u32);
                }
            }
        }
    }
}
