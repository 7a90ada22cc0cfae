use std::fmt;

/// Comparison operators that may prefix a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Gte,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Lte,
    /// Equal (`=`)
    Eq,
    /// Not equal (`!`)
    Neq,
    /// Fuzzy match (`~`)
    Fuzz,
    /// Negated fuzzy match (`!~`)
    NFuzz,
}

impl CmpOp {
    pub const ALL: [CmpOp; 8] = [
        CmpOp::Gt,
        CmpOp::Gte,
        CmpOp::Lt,
        CmpOp::Lte,
        CmpOp::Eq,
        CmpOp::Neq,
        CmpOp::Fuzz,
        CmpOp::NFuzz,
    ];

    /// The textual operator as written in a query.
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Gt => ">",
            CmpOp::Gte => ">=",
            CmpOp::Lt => "<",
            CmpOp::Lte => "<=",
            CmpOp::Eq => "=",
            CmpOp::Neq => "!",
            CmpOp::Fuzz => "~",
            CmpOp::NFuzz => "!~",
        }
    }

    /// The operator's name as used in the query-list interchange format.
    pub fn name(self) -> &'static str {
        match self {
            CmpOp::Gt => "gt",
            CmpOp::Gte => "gte",
            CmpOp::Lt => "lt",
            CmpOp::Lte => "lte",
            CmpOp::Eq => "eq",
            CmpOp::Neq => "neq",
            CmpOp::Fuzz => "fuzz",
            CmpOp::NFuzz => "nfuzz",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CmpOp::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
