//! Data model for JSON conformance scripts.
//!
//! A script is the JSON document emitted by `wast2json`: a source filename and
//! an ordered list of commands that load modules, invoke exported functions,
//! read exported globals and assert expected results. Every type here is
//! read-only once deserialized.

use serde::Deserialize;
use std::fmt;

/// A parsed conformance script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Name of the `.wast` file the script was generated from. Informational only.
    #[serde(default)]
    pub source_filename: String,
    pub commands: Vec<Command>,
}

/// A single entry of a script's `commands` list.
#[derive(Debug, Clone, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    /// Line in the originating `.wast` file, used for reporting.
    #[serde(default)]
    pub line: u32,
    /// Module binary, relative to the script's own directory.
    #[serde(default)]
    pub filename: Option<String>,
    /// Alias under which a loaded module can be referenced by later actions.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub action: Option<Action>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub module_type: Option<String>,
    #[serde(default)]
    pub expected: Vec<ValueLiteral>,
}

/// An interaction with a loaded module instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Target module alias; absent or empty means the current module.
    #[serde(default)]
    pub module: Option<String>,
    pub field: String,
    #[serde(default)]
    pub args: Vec<ValueLiteral>,
    #[serde(default)]
    pub expected: Vec<ValueLiteral>,
}

impl Action {
    /// The named module this action targets, with empty names treated as absent.
    pub fn target_module(&self) -> Option<&str> {
        self.module.as_deref().filter(|name| !name.is_empty())
    }
}

/// A typed literal: a type tag plus its textual value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValueLiteral {
    #[serde(rename = "type")]
    pub ty: ValueType,
    /// Absent for the result types listed by `assert_trap` and friends.
    #[serde(default)]
    pub value: LiteralText,
}

impl ValueLiteral {
    pub fn new(ty: ValueType, value: impl Into<String>) -> Self {
        ValueLiteral {
            ty,
            value: LiteralText::Scalar(value.into()),
        }
    }
}

/// Raw text of a literal. Vector constants arrive as a list of lane strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LiteralText {
    Scalar(String),
    Lanes(Vec<String>),
}

impl Default for LiteralText {
    fn default() -> Self {
        LiteralText::Scalar(String::new())
    }
}

impl fmt::Display for LiteralText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralText::Scalar(text) => f.write_str(text),
            LiteralText::Lanes(lanes) => write!(f, "[{}]", lanes.join(" ")),
        }
    }
}

/// Declared type of a literal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ValueType {
    I32,
    I64,
    F32,
    F64,
    Other(String),
}

impl From<String> for ValueType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "i32" => ValueType::I32,
            "i64" => ValueType::I64,
            "f32" => ValueType::F32,
            "f64" => ValueType::F64,
            _ => ValueType::Other(tag),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::I32 => f.write_str("i32"),
            ValueType::I64 => f.write_str("i64"),
            ValueType::F32 => f.write_str("f32"),
            ValueType::F64 => f.write_str("f64"),
            ValueType::Other(tag) => f.write_str(tag),
        }
    }
}

/// Command discriminant (`type` field).
///
/// Unknown discriminants are kept verbatim so the dispatcher can reject them
/// by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum CommandKind {
    Module,
    Action,
    AssertReturn,
    AssertTrap,
    AssertMalformed,
    AssertInvalid,
    AssertExhaustion,
    AssertUnlinkable,
    AssertReturnCanonicalNan,
    AssertReturnArithmeticNan,
    Other(String),
}

impl CommandKind {
    pub fn as_str(&self) -> &str {
        match self {
            CommandKind::Module => "module",
            CommandKind::Action => "action",
            CommandKind::AssertReturn => "assert_return",
            CommandKind::AssertTrap => "assert_trap",
            CommandKind::AssertMalformed => "assert_malformed",
            CommandKind::AssertInvalid => "assert_invalid",
            CommandKind::AssertExhaustion => "assert_exhaustion",
            CommandKind::AssertUnlinkable => "assert_unlinkable",
            CommandKind::AssertReturnCanonicalNan => "assert_return_canonical_nan",
            CommandKind::AssertReturnArithmeticNan => "assert_return_arithmetic_nan",
            CommandKind::Other(kind) => kind,
        }
    }

    /// Categories this harness records as skipped instead of executing.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            CommandKind::AssertTrap
                | CommandKind::AssertMalformed
                | CommandKind::AssertInvalid
                | CommandKind::AssertExhaustion
                | CommandKind::AssertUnlinkable
                | CommandKind::AssertReturnCanonicalNan
                | CommandKind::AssertReturnArithmeticNan
        )
    }
}

impl From<String> for CommandKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "module" => CommandKind::Module,
            "action" => CommandKind::Action,
            "assert_return" => CommandKind::AssertReturn,
            "assert_trap" => CommandKind::AssertTrap,
            "assert_malformed" => CommandKind::AssertMalformed,
            "assert_invalid" => CommandKind::AssertInvalid,
            "assert_exhaustion" => CommandKind::AssertExhaustion,
            "assert_unlinkable" => CommandKind::AssertUnlinkable,
            "assert_return_canonical_nan" => CommandKind::AssertReturnCanonicalNan,
            "assert_return_arithmetic_nan" => CommandKind::AssertReturnArithmeticNan,
            _ => CommandKind::Other(kind),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action discriminant (`action.type` field).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ActionKind {
    /// Call an exported function.
    Invoke,
    /// Read an exported global.
    Get,
    Other(String),
}

impl From<String> for ActionKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "invoke" => ActionKind::Invoke,
            "get" => ActionKind::Get,
            _ => ActionKind::Other(kind),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Invoke => f.write_str("invoke"),
            ActionKind::Get => f.write_str("get"),
            ActionKind::Other(kind) => f.write_str(kind),
        }
    }
}
