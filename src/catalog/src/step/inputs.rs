//! Typed workflow inputs.
//!
//! A step receives its inputs as a JSON object whose values may be CWL `File` and `Directory`
//! objects, arrays and nested records. They are converted once, at the boundary, into
//! [`InputValue`]s; logical references are validated there and never re-inspected ad hoc.
use crate::errors::ValidationError;
use crate::model::{is_logical_reference, LogicalFileName};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

const CLASS: &str = "class";
const LOCATION: &str = "location";
const PATH: &str = "path";
const SIZE: &str = "size";
const CHECKSUM: &str = "checksum";
const SECONDARY_FILES: &str = "secondaryFiles";
const LISTING: &str = "listing";

/// A CWL `File` value.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReference {
    /// `location`, falling back to `path`. File literals carrying only `contents` have none.
    pub location: Option<String>,
    /// Set when the file is referenced by LFN.
    pub lfn: Option<LogicalFileName>,
    pub size: Option<u64>,
    pub checksum: Option<String>,
    pub secondary_files: Vec<InputValue>,
    /// Remaining fields, kept verbatim.
    fields: Map<String, Value>,
}

/// A CWL `Directory` value.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryReference {
    pub location: Option<String>,
    pub listing: Vec<InputValue>,
    fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    File(FileReference),
    Directory(DirectoryReference),
    Array(Vec<InputValue>),
    Record(BTreeMap<String, InputValue>),
    Scalar(Value),
}

fn location_of(fields: &Map<String, Value>) -> Option<&str> {
    let location = fields.get(LOCATION).and_then(Value::as_str);
    let path = fields.get(PATH).and_then(Value::as_str);
    // a logical path wins over a non-logical location
    match (location, path) {
        (Some(location), Some(path)) if !is_logical_reference(location) && is_logical_reference(path) => {
            Some(path)
        }
        (Some(location), _) => Some(location),
        (None, path) => path,
    }
}

fn parse_list(value: Option<Value>, field: &str) -> Result<Vec<InputValue>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                InputValue::from_json(item).map_err(|e| e.within(format!("{}[{}]", field, i)))
            })
            .collect(),
        Some(_) => Err(ValidationError::new(field, "expected an array")),
    }
}

impl FileReference {
    fn from_fields(mut fields: Map<String, Value>) -> Result<Self, ValidationError> {
        let location = location_of(&fields).map(str::to_string);
        let lfn = match location.as_deref() {
            Some(location) if is_logical_reference(location) => {
                Some(LogicalFileName::new(location)?)
            }
            _ => None,
        };
        let size = match fields.remove(SIZE) {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                value
                    .as_u64()
                    .ok_or_else(|| ValidationError::new(SIZE, "expected a non-negative integer"))?,
            ),
        };
        let checksum = match fields.remove(CHECKSUM) {
            None | Some(Value::Null) => None,
            Some(Value::String(checksum)) => Some(checksum),
            Some(_) => return Err(ValidationError::new(CHECKSUM, "expected a string")),
        };
        let secondary_files = parse_list(fields.remove(SECONDARY_FILES), SECONDARY_FILES)?;
        Ok(Self {
            location,
            lfn,
            size,
            checksum,
            secondary_files,
            fields,
        })
    }

    fn to_json(&self) -> Value {
        let mut fields = self.fields.clone();
        if let Some(size) = self.size {
            fields.insert(SIZE.to_string(), Value::from(size));
        }
        if let Some(checksum) = &self.checksum {
            fields.insert(CHECKSUM.to_string(), Value::from(checksum.as_str()));
        }
        if !self.secondary_files.is_empty() {
            fields.insert(
                SECONDARY_FILES.to_string(),
                Value::Array(self.secondary_files.iter().map(InputValue::to_json).collect()),
            );
        }
        Value::Object(fields)
    }
}

impl DirectoryReference {
    fn from_fields(mut fields: Map<String, Value>) -> Result<Self, ValidationError> {
        let location = location_of(&fields).map(str::to_string);
        let listing = parse_list(fields.remove(LISTING), LISTING)?;
        Ok(Self {
            location,
            listing,
            fields,
        })
    }

    fn to_json(&self) -> Value {
        let mut fields = self.fields.clone();
        if !self.listing.is_empty() {
            fields.insert(
                LISTING.to_string(),
                Value::Array(self.listing.iter().map(InputValue::to_json).collect()),
            );
        }
        Value::Object(fields)
    }
}

impl InputValue {
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(fields) => match fields.get(CLASS).and_then(Value::as_str) {
                Some("File") => Ok(Self::File(FileReference::from_fields(fields)?)),
                Some("Directory") => Ok(Self::Directory(DirectoryReference::from_fields(fields)?)),
                _ => fields
                    .into_iter()
                    .map(|(key, value)| {
                        let value = Self::from_json(value).map_err(|e| e.within(&key))?;
                        Ok((key, value))
                    })
                    .collect::<Result<BTreeMap<_, _>, ValidationError>>()
                    .map(Self::Record),
            },
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| Self::from_json(item).map_err(|e| e.within(format!("[{}]", i))))
                .collect::<Result<Vec<_>, ValidationError>>()
                .map(Self::Array),
            scalar => Ok(Self::Scalar(scalar)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::File(file) => file.to_json(),
            Self::Directory(directory) => directory.to_json(),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Record(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Scalar(value) => value.clone(),
        }
    }

    fn collect_lfns(&self, lfns: &mut BTreeSet<LogicalFileName>) {
        match self {
            Self::File(file) => {
                if let Some(lfn) = &file.lfn {
                    lfns.insert(lfn.clone());
                }
                file.secondary_files.iter().for_each(|v| v.collect_lfns(lfns));
            }
            Self::Directory(directory) => directory.listing.iter().for_each(|v| v.collect_lfns(lfns)),
            Self::Array(items) => items.iter().for_each(|v| v.collect_lfns(lfns)),
            Self::Record(fields) => fields.values().for_each(|v| v.collect_lfns(lfns)),
            Self::Scalar(_) => {}
        }
    }

    fn for_each_file_mut(&mut self, f: &mut impl FnMut(&mut FileReference)) {
        match self {
            Self::File(file) => {
                f(file);
                file.secondary_files
                    .iter_mut()
                    .for_each(|v| v.for_each_file_mut(f));
            }
            Self::Directory(directory) => directory
                .listing
                .iter_mut()
                .for_each(|v| v.for_each_file_mut(f)),
            Self::Array(items) => items.iter_mut().for_each(|v| v.for_each_file_mut(f)),
            Self::Record(fields) => fields.values_mut().for_each(|v| v.for_each_file_mut(f)),
            Self::Scalar(_) => {}
        }
    }
}

/// The input object of one step, keyed by input name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInputs(BTreeMap<String, InputValue>);

impl StepInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(fields) => fields
                .into_iter()
                .map(|(key, value)| {
                    let value = InputValue::from_json(value).map_err(|e| e.within(&key))?;
                    Ok((key, value))
                })
                .collect::<Result<BTreeMap<_, _>, ValidationError>>()
                .map(Self),
            _ => Err(ValidationError::new(
                "inputs",
                "step inputs must be a JSON object",
            )),
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: InputValue) {
        self.0.insert(name.into(), value);
    }

    /// The distinct LFNs referenced anywhere in the inputs, secondary files included.
    pub fn logical_files(&self) -> BTreeSet<LogicalFileName> {
        let mut lfns = BTreeSet::new();
        self.0.values().for_each(|v| v.collect_lfns(&mut lfns));
        lfns
    }

    pub fn for_each_file_mut(&mut self, mut f: impl FnMut(&mut FileReference)) {
        self.0
            .values_mut()
            .for_each(|v| v.for_each_file_mut(&mut f));
    }
}
