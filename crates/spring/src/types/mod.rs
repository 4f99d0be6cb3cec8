//! Java type strings as they appear in metadata, and the oracle that
//! classifies them.

mod java_type;
mod oracle;
mod registry;

pub use java_type::JavaType;
pub use oracle::JavaTypeOracle;
pub use registry::{ClassDescriptor, EnumConstant, FieldDescriptor, TypeRegistry};
