pub mod module;

pub use module::ModuleMetadata;
