use super::file_type::guess_file_type;
use super::{
    FILETYPE_ATTRIBUTE, FILE_ELEMENT, ID_ATTRIBUTE, LFN_ELEMENT, LOGICAL_ELEMENT, NAME_ATTRIBUTE,
    PFN_ELEMENT, PHYSICAL_ELEMENT, ROOT_ELEMENT,
};
use crate::errors::{CatalogError, Result};
use crate::model::{CatalogEntry, LogicalFileName, ReplicaCatalog};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

/// Consumers compare the declaration and doctype literally.
const PREAMBLE: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\" ?>\n",
    "<!-- Edited By POOL -->\n",
    "<!DOCTYPE POOLFILECATALOG SYSTEM \"InMemory\">\n",
);

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(CatalogError::pool_xml)
}

fn write_file(
    writer: &mut Writer<Vec<u8>>,
    lfn: &LogicalFileName,
    entry: &CatalogEntry,
) -> Result<()> {
    let mut file = BytesStart::new(FILE_ELEMENT);
    // records without a GUID carry no ID rather than an empty one
    if let Some(guid) = entry.guid() {
        file.push_attribute((ID_ATTRIBUTE, guid.as_str()));
    }
    write(writer, Event::Start(file))?;

    write(writer, Event::Start(BytesStart::new(PHYSICAL_ELEMENT)))?;
    let file_type = guess_file_type(lfn.as_str());
    for replica in entry.replicas() {
        let mut pfn = BytesStart::new(PFN_ELEMENT);
        if let Some(file_type) = &file_type {
            pfn.push_attribute((FILETYPE_ATTRIBUTE, file_type.as_str()));
        }
        pfn.push_attribute((NAME_ATTRIBUTE, replica.url.as_str()));
        write(writer, Event::Empty(pfn))?;
    }
    write(writer, Event::End(BytesEnd::new(PHYSICAL_ELEMENT)))?;

    write(writer, Event::Start(BytesStart::new(LOGICAL_ELEMENT)))?;
    let mut lfn_element = BytesStart::new(LFN_ELEMENT);
    lfn_element.push_attribute((NAME_ATTRIBUTE, lfn.as_str()));
    write(writer, Event::Empty(lfn_element))?;
    write(writer, Event::End(BytesEnd::new(LOGICAL_ELEMENT)))?;

    write(writer, Event::End(BytesEnd::new(FILE_ELEMENT)))
}

/// Renders `catalog` as a pool XML catalog document, one `File` record per LFN.
pub fn to_pool_xml(catalog: &ReplicaCatalog) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write(&mut writer, Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
    for (lfn, entry) in catalog.iter() {
        write_file(&mut writer, lfn, entry)?;
    }
    write(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

    let body = String::from_utf8(writer.into_inner()).map_err(CatalogError::pool_xml)?;
    Ok(format!("{}{}\n", PREAMBLE, body))
}
