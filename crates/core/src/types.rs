//! Static type model and the oracle interface the rewriter queries.
//!
//! The oracle is supplied by the host front-end. [`TypeInfo`] is a concrete, serializable
//! implementation that front-ends fill in and that test fixtures build by hand.

use crate::ast::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Go basic kinds, including the untyped constant kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    /// Also spelled `byte`.
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
    UntypedNil,
}

impl BasicKind {
    pub fn is_untyped(self) -> bool {
        matches!(
            self,
            BasicKind::UntypedBool
                | BasicKind::UntypedInt
                | BasicKind::UntypedRune
                | BasicKind::UntypedFloat
                | BasicKind::UntypedComplex
                | BasicKind::UntypedString
                | BasicKind::UntypedNil
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BasicKind::Int
                | BasicKind::Int8
                | BasicKind::Int16
                | BasicKind::Int32
                | BasicKind::Int64
                | BasicKind::Uint
                | BasicKind::Uint8
                | BasicKind::Uint16
                | BasicKind::Uint32
                | BasicKind::Uint64
                | BasicKind::Uintptr
                | BasicKind::UntypedInt
                | BasicKind::UntypedRune
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            BasicKind::Uint
                | BasicKind::Uint8
                | BasicKind::Uint16
                | BasicKind::Uint32
                | BasicKind::Uint64
                | BasicKind::Uintptr
        )
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            BasicKind::Float32 | BasicKind::Float64 | BasicKind::UntypedFloat
        )
    }

    pub fn is_string(self) -> bool {
        matches!(self, BasicKind::String | BasicKind::UntypedString)
    }

    /// Storage width in bits. `int`, `uint` and `uintptr` are treated as 64-bit.
    pub fn bit_size(self) -> Option<u32> {
        match self {
            BasicKind::Int8 | BasicKind::Uint8 => Some(8),
            BasicKind::Int16 | BasicKind::Uint16 => Some(16),
            BasicKind::Int32 | BasicKind::Uint32 | BasicKind::Float32 => Some(32),
            BasicKind::Int
            | BasicKind::Int64
            | BasicKind::Uint
            | BasicKind::Uint64
            | BasicKind::Uintptr
            | BasicKind::Float64
            | BasicKind::UntypedInt
            | BasicKind::UntypedFloat => Some(64),
            _ => None,
        }
    }

    /// The typed kind an untyped constant defaults to.
    pub fn default_kind(self) -> BasicKind {
        match self {
            BasicKind::UntypedBool => BasicKind::Bool,
            BasicKind::UntypedInt => BasicKind::Int,
            BasicKind::UntypedRune => BasicKind::Int32,
            BasicKind::UntypedFloat => BasicKind::Float64,
            BasicKind::UntypedComplex => BasicKind::Complex128,
            BasicKind::UntypedString => BasicKind::String,
            other => other,
        }
    }

    /// Unsigned kind of the same width, used to assemble integers byte by byte.
    pub fn unsigned_of_width(bits: u32) -> Option<BasicKind> {
        match bits {
            8 => Some(BasicKind::Uint8),
            16 => Some(BasicKind::Uint16),
            32 => Some(BasicKind::Uint32),
            64 => Some(BasicKind::Uint64),
            _ => None,
        }
    }

    /// Go spelling of the kind.
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
            BasicKind::UnsafePointer => "unsafe.Pointer",
            BasicKind::UntypedBool => "untyped bool",
            BasicKind::UntypedInt => "untyped int",
            BasicKind::UntypedRune => "untyped rune",
            BasicKind::UntypedFloat => "untyped float",
            BasicKind::UntypedComplex => "untyped complex",
            BasicKind::UntypedString => "untyped string",
            BasicKind::UntypedNil => "untyped nil",
        }
    }

    /// Looks up a predeclared type name. `byte` and `rune` resolve to their aliases.
    pub fn from_name(name: &str) -> Option<BasicKind> {
        Some(match name {
            "bool" => BasicKind::Bool,
            "int" => BasicKind::Int,
            "int8" => BasicKind::Int8,
            "int16" => BasicKind::Int16,
            "int32" | "rune" => BasicKind::Int32,
            "int64" => BasicKind::Int64,
            "uint" => BasicKind::Uint,
            "uint8" | "byte" => BasicKind::Uint8,
            "uint16" => BasicKind::Uint16,
            "uint32" => BasicKind::Uint32,
            "uint64" => BasicKind::Uint64,
            "uintptr" => BasicKind::Uintptr,
            "float32" => BasicKind::Float32,
            "float64" => BasicKind::Float64,
            "complex64" => BasicKind::Complex64,
            "complex128" => BasicKind::Complex128,
            "string" => BasicKind::String,
            _ => return None,
        })
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved static type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Basic(BasicKind),
    /// A defined type. `local` types are declared in the package being rewritten, so
    /// their bare name can be spelled in a conversion.
    Named {
        name: String,
        local: bool,
        underlying: Box<Type>,
    },
    Array {
        len: u64,
        elem: Box<Type>,
    },
    Slice(Box<Type>),
    Pointer(Box<Type>),
    Map {
        key: Box<Type>,
        value: Box<Type>,
    },
    Struct,
    Func,
    Interface,
}

impl Type {
    pub fn byte() -> Self {
        Type::Basic(BasicKind::Uint8)
    }

    pub fn string() -> Self {
        Type::Basic(BasicKind::String)
    }

    pub fn byte_slice() -> Self {
        Type::Slice(Box::new(Type::byte()))
    }

    pub fn byte_array(len: u64) -> Self {
        Type::Array {
            len,
            elem: Box::new(Type::byte()),
        }
    }

    pub fn named(name: impl Into<String>, underlying: Type) -> Self {
        Type::Named {
            name: name.into(),
            local: true,
            underlying: Box::new(underlying),
        }
    }

    /// Strips every named layer.
    pub fn underlying(&self) -> &Type {
        match self {
            Type::Named { underlying, .. } => underlying.underlying(),
            other => other,
        }
    }

    /// The basic kind if this type is exactly a basic type, not a named one.
    pub fn as_basic(&self) -> Option<BasicKind> {
        match self {
            Type::Basic(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Returns true for exactly the byte primitive.
    pub fn is_byte(&self) -> bool {
        matches!(self, Type::Basic(BasicKind::Uint8))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(kind) => write!(f, "{kind}"),
            Type::Named { name, .. } => f.write_str(name),
            Type::Array { len, elem } => write!(f, "[{len}]{elem}"),
            Type::Slice(elem) => write!(f, "[]{elem}"),
            Type::Pointer(elem) => write!(f, "*{elem}"),
            Type::Map { key, value } => write!(f, "map[{key}]{value}"),
            Type::Struct => f.write_str("struct{...}"),
            Type::Func => f.write_str("func(...)"),
            Type::Interface => f.write_str("interface{...}"),
        }
    }
}

/// Identity of a declared name. This is the symbol object the blacklist is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Const,
    Var,
    Field,
    TypeName,
    Func,
    Builtin,
    Nil,
    PkgName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
    pub typ: Type,
    /// Declared in the universe scope rather than in user code.
    #[serde(default)]
    pub universe: bool,
}

/// Static type and name resolution queries answered by the host front-end.
pub trait TypeOracle {
    /// Static type of an expression node, after implicit conversion.
    fn type_of(&self, id: NodeId) -> Option<&Type>;

    /// Object an identifier (declaring or referring) resolves to.
    fn object_of(&self, id: NodeId) -> Option<ObjectId>;

    fn object(&self, obj: ObjectId) -> Option<&Object>;

    /// Universe-scope object by name, e.g. `true`.
    fn universe(&self, name: &str) -> Option<ObjectId>;
}

/// Concrete oracle tables produced by a front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    #[serde(default)]
    types: HashMap<NodeId, Type>,
    #[serde(default)]
    uses: HashMap<NodeId, ObjectId>,
    objects: Vec<Object>,
}

const UNIVERSE: [(&str, ObjectKind, Type); 3] = [
    ("true", ObjectKind::Const, Type::Basic(BasicKind::UntypedBool)),
    ("false", ObjectKind::Const, Type::Basic(BasicKind::UntypedBool)),
    ("nil", ObjectKind::Nil, Type::Basic(BasicKind::UntypedNil)),
];

impl TypeInfo {
    /// Creates tables holding only the universe objects.
    pub fn new() -> Self {
        let objects = UNIVERSE
            .iter()
            .map(|(name, kind, typ)| Object {
                name: name.to_string(),
                kind: *kind,
                typ: typ.clone(),
                universe: true,
            })
            .collect();
        Self {
            types: HashMap::new(),
            uses: HashMap::new(),
            objects,
        }
    }

    /// Records the static type of an expression node.
    pub fn record_type(&mut self, id: NodeId, typ: Type) {
        self.types.insert(id, typ);
    }

    /// Declares a new object.
    pub fn declare(&mut self, name: impl Into<String>, kind: ObjectKind, typ: Type) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(Object {
            name: name.into(),
            kind,
            typ,
            universe: false,
        });
        id
    }

    /// Records that identifier node `id` resolves to `obj`.
    pub fn record_use(&mut self, id: NodeId, obj: ObjectId) {
        self.uses.insert(id, obj);
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

impl Default for TypeInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeOracle for TypeInfo {
    fn type_of(&self, id: NodeId) -> Option<&Type> {
        if id.is_dummy() {
            return None;
        }
        self.types.get(&id)
    }

    fn object_of(&self, id: NodeId) -> Option<ObjectId> {
        if id.is_dummy() {
            return None;
        }
        self.uses.get(&id).copied()
    }

    fn object(&self, obj: ObjectId) -> Option<&Object> {
        self.objects.get(obj.0 as usize)
    }

    fn universe(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.universe && o.name == name)
            .map(|idx| ObjectId(idx as u32))
    }
}
