use cpu::register::RegisterId;

/// A literal value or an as-yet-unresolved identifier, resolved against the
/// symbol table in pass 2 (or immediately in pass 1 for `.EQU`/`.ORG`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Literal(i32),
    Symbol(String),
    Negate(Box<Expr>),
}

/// One parsed operand. Mirrors the tagged variant DESIGN NOTES describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Immediate(Expr),
    Register(RegisterId),
    Direct(Expr),
    Indexed(RegisterId, Expr),
    /// A bare expression used only as a branch/jump/call target.
    Bare(Expr),
}

/// The mnemonic as written in source. `LD`/`ST` are not yet split by
/// destination register — that happens during encoding once the first
/// operand (the primary register) is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceMnemonic {
    NOP,
    HLT,
    CALL,
    RET,
    PUSH,
    POP,
    INC,
    DEC,
    JMP,
    BZ,
    BNZ,
    BC,
    BNC,
    LD,
    ST,
    ADD,
    SUB,
    AND,
    OR,
    XOR,
    CMP,
}

impl SourceMnemonic {
    pub fn from_name(name: &str) -> Option<SourceMnemonic> {
        use SourceMnemonic::*;
        Some(match name.to_ascii_uppercase().as_str() {
            "NOP" => NOP,
            "HLT" => HLT,
            "CALL" => CALL,
            "RET" => RET,
            "PUSH" => PUSH,
            "POP" => POP,
            "INC" => INC,
            "DEC" => DEC,
            "JMP" => JMP,
            "BZ" => BZ,
            "BNZ" => BNZ,
            "BC" => BC,
            "BNC" => BNC,
            "LD" => LD,
            "ST" => ST,
            "ADD" => ADD,
            "SUB" => SUB,
            "AND" => AND,
            "OR" => OR,
            "XOR" => XOR,
            "CMP" => CMP,
            _ => return None,
        })
    }
}

impl std::fmt::Display for SourceMnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    Org(Expr),
    Equ(String, Expr),
    Db(Vec<Expr>),
    Ds(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineBody {
    Empty,
    Directive(Directive),
    Instruction(SourceMnemonic, Vec<Operand>),
}

/// One source line, already stripped of its comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub line_no: usize,
    pub label: Option<String>,
    pub body: LineBody,
    pub text: String,
}
