/// Known extensions and the file type consumers expect for them.
const FILE_TYPES: &[(&str, &str)] = &[
    ("sim", "SIM"),
    ("digi", "DIGI"),
    ("xdigi", "XDIGI"),
    ("dst", "DST"),
    ("mdst", "MDST"),
    ("ldst", "LDST"),
    ("rdst", "RDST"),
    ("mdf", "MDF"),
    ("raw", "RAW"),
    ("root", "ROOT"),
];

/// Guesses the pool file type of a file from its name. Unknown extensions are uppercased; a
/// name without extension has no type.
pub fn guess_file_type(name: &str) -> Option<String> {
    let base_name = name.rsplit('/').next().unwrap_or(name);
    let (stem, extension) = base_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    let extension = extension.to_ascii_lowercase();
    let file_type = FILE_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, file_type)| file_type.to_string())
        .unwrap_or_else(|| extension.to_ascii_uppercase());
    Some(file_type)
}
