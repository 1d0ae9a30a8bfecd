pub mod chain;
pub mod descriptive;
pub mod errors;
pub mod loader;
pub mod params;

pub use chain::{chain, describe, render_srg};
pub use descriptive::{load_csv_map, parse_csv_map, parse_descriptive_csv, DescriptiveNames};
pub use errors::MappingError;
pub use loader::{MappingSet, MethodDescriptor, NameTable, CONF_MAPPINGS};
pub use params::{parse_exc, ExcEntry, ExcNames, ParameterMap, TranslatedParameters, CONSTRUCTOR};
