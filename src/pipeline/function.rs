/// The closed set of scalar functions an expression tree can call.
///
/// Dispatch over this enum is a single exhaustive `match` in the
/// evaluator, so adding an operator without wiring its semantics is a
/// compile error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
    Pow,
    Sqrt,
    Exp,
    Ln,
    Log,
    Log10,
    Abs,
    Ceil,
    Floor,
    Round,
    RoundToPrecision,
    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    // Field and value checks
    IsNull,
    IsNotNull,
    IsNan,
    IsNotNan,
    Exists,
    // Logical
    And,
    Or,
    Xor,
    Not,
    // Selection
    Cond,
    LogicalMaximum,
    LogicalMinimum,
    // Membership
    EqAny,
    NotEqAny,
    ArrayContains,
    ArrayContainsAll,
    ArrayContainsAny,
    // Arrays and maps
    ArrayGet,
    ArrayLength,
    ArrayReverse,
    MapGet,
    MapMerge,
    MapRemove,
    // Strings
    CharLength,
    ByteLength,
    StrConcat,
    ToLower,
    ToUpper,
    Trim,
    StrContains,
    StartsWith,
    EndsWith,
    StrReverse,
    Substr,
    Like,
    RegexContains,
    RegexMatch,
    Join,
    // Timestamps
    TimestampAdd,
    TimestampSub,
    UnixSecondsToTimestamp,
    UnixMillisToTimestamp,
    UnixMicrosToTimestamp,
    TimestampToUnixSeconds,
    TimestampToUnixMillis,
    TimestampToUnixMicros,
}

impl Function {
    /// The operator's public name, as surfaced in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Function::Add => "add",
            Function::Subtract => "subtract",
            Function::Multiply => "multiply",
            Function::Divide => "divide",
            Function::Mod => "mod",
            Function::Pow => "pow",
            Function::Sqrt => "sqrt",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Log => "log",
            Function::Log10 => "log10",
            Function::Abs => "abs",
            Function::Ceil => "ceil",
            Function::Floor => "floor",
            Function::Round => "round",
            Function::RoundToPrecision => "roundToPrecision",
            Function::Equal => "equal",
            Function::NotEqual => "notEqual",
            Function::LessThan => "lessThan",
            Function::LessThanOrEqual => "lessThanOrEqual",
            Function::GreaterThan => "greaterThan",
            Function::GreaterThanOrEqual => "greaterThanOrEqual",
            Function::IsNull => "isNull",
            Function::IsNotNull => "isNotNull",
            Function::IsNan => "isNan",
            Function::IsNotNan => "isNotNan",
            Function::Exists => "exists",
            Function::And => "and",
            Function::Or => "or",
            Function::Xor => "xor",
            Function::Not => "not",
            Function::Cond => "cond",
            Function::LogicalMaximum => "logicalMaximum",
            Function::LogicalMinimum => "logicalMinimum",
            Function::EqAny => "eqAny",
            Function::NotEqAny => "notEqAny",
            Function::ArrayContains => "arrayContains",
            Function::ArrayContainsAll => "arrayContainsAll",
            Function::ArrayContainsAny => "arrayContainsAny",
            Function::ArrayGet => "arrayGet",
            Function::ArrayLength => "arrayLength",
            Function::ArrayReverse => "arrayReverse",
            Function::MapGet => "mapGet",
            Function::MapMerge => "mapMerge",
            Function::MapRemove => "mapRemove",
            Function::CharLength => "charLength",
            Function::ByteLength => "byteLength",
            Function::StrConcat => "strConcat",
            Function::ToLower => "toLower",
            Function::ToUpper => "toUpper",
            Function::Trim => "trim",
            Function::StrContains => "strContains",
            Function::StartsWith => "startsWith",
            Function::EndsWith => "endsWith",
            Function::StrReverse => "strReverse",
            Function::Substr => "substr",
            Function::Like => "like",
            Function::RegexContains => "regexContains",
            Function::RegexMatch => "regexMatch",
            Function::Join => "join",
            Function::TimestampAdd => "timestampAdd",
            Function::TimestampSub => "timestampSub",
            Function::UnixSecondsToTimestamp => "unixSecondsToTimestamp",
            Function::UnixMillisToTimestamp => "unixMillisToTimestamp",
            Function::UnixMicrosToTimestamp => "unixMicrosToTimestamp",
            Function::TimestampToUnixSeconds => "timestampToUnixSeconds",
            Function::TimestampToUnixMillis => "timestampToUnixMillis",
            Function::TimestampToUnixMicros => "timestampToUnixMicros",
        }
    }
}
