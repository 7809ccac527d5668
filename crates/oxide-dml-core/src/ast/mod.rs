//! Parsed statement types.

mod condition;
mod statement;

pub use condition::{CompareOp, Condition, LogicalOp};
pub use statement::{
    CreateListStatement, CreateRecordStatement, DeleteStatement, DmlStatement, FieldDef,
    FieldType, FieldValues, InsertRows, InsertStatement, ListOptions, ListValue, StatementKind,
    Translation, UpdateStatement,
};
