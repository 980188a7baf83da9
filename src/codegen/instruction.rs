use std::fmt::Display;

/// Storage class of a value on the operand stack or in a local slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `int` and `bool`
    Int,
    Float,
    /// strings and arrays
    Ref,
}

impl ValueKind {
    fn prefix(&self) -> char {
        match self {
            ValueKind::Int => 'i',
            ValueKind::Float => 'f',
            ValueKind::Ref => 'a',
        }
    }
}

/// Element kind of a JVM array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Int,
    Float,
    Bool,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Condition {
    fn suffix(&self) -> &'static str {
        match self {
            Condition::Eq => "eq",
            Condition::Ne => "ne",
            Condition::Lt => "lt",
            Condition::Le => "le",
            Condition::Gt => "gt",
            Condition::Ge => "ge",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Instruction {
    IConst(i32),
    FConst(f32),
    LdcString(String),
    AConstNull,
    Load(ValueKind, u16),
    Store(ValueKind, u16),
    GetStatic(String, String),
    PutStatic(String, String),
    NewArray(ElementKind),
    ArrayLoad(ElementKind),
    ArrayStore(ElementKind),
    Add(ValueKind),
    Subtract(ValueKind),
    Multiply(ValueKind),
    Divide(ValueKind),
    Negate(ValueKind),
    IntToFloat,
    /// float comparison pushing 1 when either operand is NaN
    FCmpG,
    /// float comparison pushing -1 when either operand is NaN
    FCmpL,
    If(Condition, usize),
    IfICmp(Condition, usize),
    Goto(usize),
    Dup,
    Pop,
    New(String),
    InvokeStatic(String),
    InvokeVirtual(String),
    InvokeSpecial(String),
    Return(Option<ValueKind>),
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::IConst(value) => match *value {
                -1 => write!(f, "iconst_m1"),
                0..=5 => write!(f, "iconst_{value}"),
                -128..=127 => write!(f, "bipush {value}"),
                -32768..=32767 => write!(f, "sipush {value}"),
                _ => write!(f, "ldc {value}"),
            },
            Instruction::FConst(value) => {
                if *value == 0.0 && value.is_sign_positive() {
                    write!(f, "fconst_0")
                } else if *value == 1.0 {
                    write!(f, "fconst_1")
                } else if *value == 2.0 {
                    write!(f, "fconst_2")
                } else {
                    write!(f, "ldc {}", float_literal(*value))
                }
            }
            Instruction::LdcString(text) => write!(f, "ldc \"{text}\""),
            Instruction::AConstNull => write!(f, "aconst_null"),
            Instruction::Load(kind, slot) => write_slot(f, kind.prefix(), "load", *slot),
            Instruction::Store(kind, slot) => write_slot(f, kind.prefix(), "store", *slot),
            Instruction::GetStatic(field, desc) => write!(f, "getstatic {field} {desc}"),
            Instruction::PutStatic(field, desc) => write!(f, "putstatic {field} {desc}"),
            Instruction::NewArray(element) => match element {
                ElementKind::Int => write!(f, "newarray int"),
                ElementKind::Float => write!(f, "newarray float"),
                ElementKind::Bool => write!(f, "newarray boolean"),
                ElementKind::String => write!(f, "anewarray java/lang/String"),
            },
            Instruction::ArrayLoad(element) => write!(f, "{}aload", element_prefix(element)),
            Instruction::ArrayStore(element) => write!(f, "{}astore", element_prefix(element)),
            Instruction::Add(kind) => write!(f, "{}add", kind.prefix()),
            Instruction::Subtract(kind) => write!(f, "{}sub", kind.prefix()),
            Instruction::Multiply(kind) => write!(f, "{}mul", kind.prefix()),
            Instruction::Divide(kind) => write!(f, "{}div", kind.prefix()),
            Instruction::Negate(kind) => write!(f, "{}neg", kind.prefix()),
            Instruction::IntToFloat => write!(f, "i2f"),
            Instruction::FCmpG => write!(f, "fcmpg"),
            Instruction::FCmpL => write!(f, "fcmpl"),
            Instruction::If(cond, label) => write!(f, "if{} Label{label}", cond.suffix()),
            Instruction::IfICmp(cond, label) => write!(f, "if_icmp{} Label{label}", cond.suffix()),
            Instruction::Goto(label) => write!(f, "goto Label{label}"),
            Instruction::Dup => write!(f, "dup"),
            Instruction::Pop => write!(f, "pop"),
            Instruction::New(class) => write!(f, "new {class}"),
            Instruction::InvokeStatic(method) => write!(f, "invokestatic {method}"),
            Instruction::InvokeVirtual(method) => write!(f, "invokevirtual {method}"),
            Instruction::InvokeSpecial(method) => write!(f, "invokespecial {method}"),
            Instruction::Return(None) => write!(f, "return"),
            Instruction::Return(Some(kind)) => write!(f, "{}return", kind.prefix()),
        }
    }
}

fn write_slot(
    f: &mut std::fmt::Formatter<'_>,
    prefix: char,
    name: &str,
    slot: u16,
) -> std::fmt::Result {
    if slot <= 3 {
        write!(f, "{prefix}{name}_{slot}")
    } else {
        write!(f, "{prefix}{name} {slot}")
    }
}

fn element_prefix(element: &ElementKind) -> char {
    match element {
        ElementKind::Int => 'i',
        ElementKind::Float => 'f',
        ElementKind::Bool => 'b',
        ElementKind::String => 'a',
    }
}

/// Float constant as the assembler reads it, always with a decimal point
fn float_literal(value: f32) -> String {
    let text = format!("{value:?}");
    match text.find('e') {
        Some(idx) if !text[..idx].contains('.') => {
            format!("{}.0{}", &text[..idx], &text[idx..])
        }
        _ => text,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn int_constants_pick_compact_encoding() {
        let data = [
            (-1, "iconst_m1"),
            (0, "iconst_0"),
            (5, "iconst_5"),
            (6, "bipush 6"),
            (-128, "bipush -128"),
            (-129, "sipush -129"),
            (32767, "sipush 32767"),
            (32768, "ldc 32768"),
            (i32::MIN, "ldc -2147483648"),
        ];
        for (value, expected) in data {
            assert_eq!(Instruction::IConst(value).to_string(), expected);
        }
    }

    #[test]
    fn float_constants() {
        assert_eq!(Instruction::FConst(0.0).to_string(), "fconst_0");
        assert_eq!(Instruction::FConst(1.0).to_string(), "fconst_1");
        assert_eq!(Instruction::FConst(2.0).to_string(), "fconst_2");
        assert_eq!(Instruction::FConst(3.5).to_string(), "ldc 3.5");
        assert_eq!(Instruction::FConst(-0.0).to_string(), "ldc -0.0");
        assert_eq!(Instruction::FConst(1e-7).to_string(), "ldc 1.0e-7");
    }

    #[test]
    fn slot_access_encodings() {
        let data = [
            (Instruction::Load(ValueKind::Int, 0), "iload_0"),
            (Instruction::Load(ValueKind::Float, 3), "fload_3"),
            (Instruction::Load(ValueKind::Ref, 4), "aload 4"),
            (Instruction::Store(ValueKind::Int, 2), "istore_2"),
            (Instruction::Store(ValueKind::Float, 17), "fstore 17"),
            (Instruction::Store(ValueKind::Ref, 1), "astore_1"),
        ];
        for (instr, expected) in data {
            assert_eq!(instr.to_string(), expected);
        }
    }

    #[test]
    fn branches_and_arrays() {
        let data = [
            (Instruction::If(Condition::Eq, 3), "ifeq Label3"),
            (Instruction::IfICmp(Condition::Ge, 0), "if_icmpge Label0"),
            (Instruction::Goto(12), "goto Label12"),
            (Instruction::NewArray(ElementKind::Bool), "newarray boolean"),
            (
                Instruction::NewArray(ElementKind::String),
                "anewarray java/lang/String",
            ),
            (Instruction::ArrayLoad(ElementKind::Bool), "baload"),
            (Instruction::ArrayStore(ElementKind::Float), "fastore"),
            (Instruction::Return(Some(ValueKind::Ref)), "areturn"),
            (Instruction::Return(None), "return"),
        ];
        for (instr, expected) in data {
            assert_eq!(instr.to_string(), expected);
        }
    }
}
