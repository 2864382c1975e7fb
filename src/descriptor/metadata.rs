// src/descriptor/metadata.rs

//! Package metadata: the root of package.xml

use super::contents::ContentsTree;
use super::element::Element;
use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::Path;

/// Root element name of package.xml
pub const ROOT_ELEMENT: &str = "package";

/// Element holding the file tree
pub const CONTENTS_ELEMENT: &str = "contents";

/// Fields that must be present before a package can be written
const REQUIRED_FIELDS: &[&str] = &["name", "version"];

/// Scalar descriptor fields plus the generated contents tree
///
/// Scalar fields keep their insertion order. When the metadata was loaded
/// from a skeleton that already has a `<contents>` element, the rendered
/// contents take that element's position; otherwise they are appended last.
#[derive(Debug, Clone)]
pub struct PackageMetadata {
    root: Element,
    contents: ContentsTree,
}

impl Default for PackageMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageMetadata {
    /// Empty `<package/>` metadata
    pub fn new() -> Self {
        Self {
            root: Element::new(ROOT_ELEMENT),
            contents: ContentsTree::new(),
        }
    }

    /// Adopt a parsed document as the metadata skeleton
    pub fn from_element(mut root: Element) -> Self {
        let contents = match root.position(CONTENTS_ELEMENT) {
            Some(index) => {
                let existing = root.replace_child(index, Element::new(CONTENTS_ELEMENT));
                ContentsTree::from_element(&existing)
            }
            None => ContentsTree::new(),
        };
        Self { root, contents }
    }

    /// Parse a package.xml skeleton
    pub fn parse(xml: &str) -> Result<Self> {
        Ok(Self::from_element(Element::parse(xml)?))
    }

    /// Load a package.xml skeleton from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Set a scalar field
    ///
    /// An existing element with the same name has its text replaced and the
    /// given attributes merged in; otherwise a new element is appended.
    pub fn set_field(&mut self, name: &str, value: Option<&str>, attributes: &[(&str, &str)]) {
        let element = match self.root.child_mut(name) {
            Some(element) => element,
            None => self.root.append_child(Element::new(name)),
        };
        element.set_text(value.map(str::to_string));
        for (key, value) in attributes {
            element.set_attribute(*key, *value);
        }
    }

    /// Text of a scalar field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.root.child(name).and_then(Element::text)
    }

    /// Attribute of a scalar field
    pub fn field_attribute(&self, name: &str, attribute: &str) -> Option<&str> {
        self.root.child(name).and_then(|e| e.attribute(attribute))
    }

    pub fn name(&self) -> Option<&str> {
        self.field("name")
    }

    pub fn version(&self) -> Option<&str> {
        self.field("version")
    }

    /// Set the `date` (YYYY-MM-DD) and `time` (HH:MM:SS) fields
    pub fn set_release_date<Tz>(&mut self, date: &DateTime<Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.set_field("date", Some(&date.format("%Y-%m-%d").to_string()), &[]);
        self.set_field("time", Some(&date.format("%H:%M:%S").to_string()), &[]);
    }

    pub fn contents(&self) -> &ContentsTree {
        &self.contents
    }

    pub fn contents_mut(&mut self) -> &mut ContentsTree {
        &mut self.contents
    }

    /// Check the fields the packager relies on
    pub fn validate(&self) -> Result<()> {
        for field in REQUIRED_FIELDS {
            match self.field(field) {
                Some(value) if !value.trim().is_empty() => {}
                _ => return Err(Error::Validation(format!("missing required field '{}'", field))),
            }
        }
        Ok(())
    }

    /// Assemble the full document tree
    pub fn to_element(&self) -> Element {
        let mut root = self.root.clone();
        let contents = self.contents.to_element();
        match root.position(CONTENTS_ELEMENT) {
            Some(index) => {
                root.replace_child(index, contents);
            }
            None => {
                root.append_child(contents);
            }
        }
        root
    }

    /// Serialize as package.xml
    pub fn to_xml(&self) -> Result<String> {
        self.to_element().to_xml()
    }
}
