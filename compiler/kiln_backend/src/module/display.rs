//! Textual IR rendering, used by trace logging and tests.

use std::fmt::{self, Write};

use super::{IrModule, ValueKind};
use crate::{Instr, LlType, LlTypeId, Terminator, ValueId};

impl IrModule {
    /// Printable form of a backend type: `i32`, `i8*`, `%struct_k4Enum`.
    pub fn type_name(&self, id: LlTypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, id);
        out
    }

    fn write_type(&self, out: &mut String, id: LlTypeId) {
        match self.llty(id) {
            LlType::Void => out.push_str("void"),
            LlType::Int(bits) => {
                let _ = write!(out, "i{bits}");
            }
            LlType::Float(32) => out.push_str("float"),
            LlType::Float(64) => out.push_str("double"),
            LlType::Float(bits) => {
                let _ = write!(out, "f{bits}");
            }
            LlType::Ptr(inner) => {
                self.write_type(out, *inner);
                out.push('*');
            }
            LlType::Struct {
                name: Some(name), ..
            } => {
                out.push('%');
                out.push_str(name);
            }
            LlType::Struct { name: None, fields } => self.write_fields(out, fields),
        }
    }

    fn write_fields(&self, out: &mut String, fields: &[LlTypeId]) {
        out.push_str("{ ");
        for (i, &field) in fields.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(out, field);
        }
        out.push_str(" }");
    }

    /// Operand form of a value: constants inline, everything else `%vN`.
    pub fn value_name(&self, value: ValueId) -> String {
        match self.value_kind(value) {
            ValueKind::ConstInt(_) => self
                .const_int_value(value)
                .map_or_else(String::new, |v| v.to_string()),
            ValueKind::ConstFloat(f) => format!("{f:?}"),
            ValueKind::Undef => "undef".to_owned(),
            ValueKind::GlobalString(text) => format!("c{text:?}"),
            ValueKind::Param { .. } | ValueKind::Instr => format!("%v{}", value.raw()),
        }
    }

    fn typed(&self, value: ValueId) -> String {
        format!(
            "{} {}",
            self.type_name(self.value_type(value)),
            self.value_name(value)
        )
    }

    fn write_instr(&self, f: &mut fmt::Formatter<'_>, instr: &Instr) -> fmt::Result {
        match instr {
            Instr::Alloca { dst, ty } => {
                write!(f, "%v{} = alloca {}", dst.raw(), self.type_name(*ty))
            }
            Instr::Load { dst, ptr } => write!(
                f,
                "%v{} = load {}, {}",
                dst.raw(),
                self.type_name(self.value_type(*dst)),
                self.typed(*ptr)
            ),
            Instr::Store { value, ptr } => {
                write!(f, "store {}, {}", self.typed(*value), self.typed(*ptr))
            }
            Instr::Call { dst, callee, args } => {
                let func = self.function(*callee);
                if let Some(dst) = dst {
                    write!(f, "%v{} = ", dst.raw())?;
                }
                let args: Vec<String> = args.iter().map(|&a| self.typed(a)).collect();
                write!(
                    f,
                    "call {} @{}({})",
                    self.type_name(func.ret()),
                    func.symbol(),
                    args.join(", ")
                )
            }
            Instr::ExtractValue {
                dst,
                aggregate,
                index,
            } => write!(
                f,
                "%v{} = extractvalue {}, {index}",
                dst.raw(),
                self.typed(*aggregate)
            ),
            Instr::InsertValue {
                dst,
                aggregate,
                value,
                index,
            } => write!(
                f,
                "%v{} = insertvalue {}, {}, {index}",
                dst.raw(),
                self.typed(*aggregate),
                self.typed(*value)
            ),
            Instr::ICmp {
                dst,
                pred,
                lhs,
                rhs,
            } => write!(
                f,
                "%v{} = icmp {} {}, {}",
                dst.raw(),
                pred.as_str(),
                self.typed(*lhs),
                self.value_name(*rhs)
            ),
            Instr::Phi { dst, incoming } => {
                write!(
                    f,
                    "%v{} = phi {}",
                    dst.raw(),
                    self.type_name(self.value_type(*dst))
                )?;
                for (i, (value, block)) in incoming.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(
                        f,
                        "{sep}[ {}, %{} ]",
                        self.value_name(*value),
                        self.block_label(*block)
                    )?;
                }
                Ok(())
            }
        }
    }

    fn write_terminator(&self, f: &mut fmt::Formatter<'_>, term: &Terminator) -> fmt::Result {
        match term {
            Terminator::Ret(Some(v)) => write!(f, "ret {}", self.typed(*v)),
            Terminator::Ret(None) => write!(f, "ret void"),
            Terminator::Br(target) => write!(f, "br label %{}", self.block_label(*target)),
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => write!(
                f,
                "br {}, label %{}, label %{}",
                self.typed(*cond),
                self.block_label(*then_block),
                self.block_label(*else_block)
            ),
            Terminator::Unreachable => write!(f, "unreachable"),
        }
    }

    fn block_label(&self, block: crate::BlockId) -> String {
        format!("{}.{}", self.block(block).label(), block.raw())
    }
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; module {}", self.name)?;
        for ty in &self.types {
            if let LlType::Struct {
                name: Some(name),
                fields,
            } = ty
            {
                let mut body = String::new();
                self.write_fields(&mut body, fields);
                writeln!(f, "%{name} = type {body}")?;
            }
        }
        for (_, func) in self.functions() {
            let params: Vec<String> = func.params().iter().map(|&p| self.typed(p)).collect();
            let head = format!(
                "{} {} @{}({})",
                func.linkage().as_str(),
                self.type_name(func.ret()),
                func.symbol(),
                params.join(", ")
            );
            if func.is_declaration() {
                writeln!(f, "declare {head}")?;
                continue;
            }
            writeln!(f, "define {head} {{")?;
            for &block in func.blocks() {
                writeln!(f, "{}:", self.block_label(block))?;
                let data = self.block(block);
                for instr in data.instrs() {
                    write!(f, "  ")?;
                    self.write_instr(f, instr)?;
                    writeln!(f)?;
                }
                if let Some(term) = data.terminator() {
                    write!(f, "  ")?;
                    self.write_terminator(f, term)?;
                    writeln!(f)?;
                }
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}
