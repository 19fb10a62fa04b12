//! The legacy XML "pool file catalog" read and written by external applications.
mod file_type;
mod reader;
mod register;
mod writer;

pub use file_type::guess_file_type;
pub use reader::{from_pool_xml, merge_pool_xml};
pub use register::{register_outputs, OutputPattern};
pub use writer::to_pool_xml;

const ROOT_ELEMENT: &str = "POOLFILECATALOG";
const FILE_ELEMENT: &str = "File";
const PHYSICAL_ELEMENT: &str = "physical";
const LOGICAL_ELEMENT: &str = "logical";
const PFN_ELEMENT: &str = "pfn";
const LFN_ELEMENT: &str = "lfn";
const ID_ATTRIBUTE: &str = "ID";
const NAME_ATTRIBUTE: &str = "name";
const FILETYPE_ATTRIBUTE: &str = "filetype";
