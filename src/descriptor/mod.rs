// src/descriptor/mod.rs

//! package.xml generation
//!
//! The descriptor lists the package's scalar metadata and, under
//! `<contents>`, every shipped file grouped by installation target:
//!
//! ```xml
//! <package>
//!   <name>Foo_Bar</name>
//!   <version>1.2.3</version>
//!   <contents>
//!     <target name="magelocal">
//!       <dir name="Foo">
//!         <file name="Bar.php" hash="..."/>
//!       </dir>
//!     </target>
//!   </contents>
//! </package>
//! ```

mod contents;
mod element;
mod metadata;

pub use contents::{ClassifiedFile, ContentsTree, DirNode, TargetNode};
pub use element::Element;
pub use metadata::{PackageMetadata, CONTENTS_ELEMENT, ROOT_ELEMENT};

/// Default file name of the descriptor inside a package
pub const DESCRIPTOR_FILE: &str = "package.xml";

/// Add every classified file to the metadata's contents tree
pub fn build<'a, I>(files: I, metadata: &mut PackageMetadata)
where
    I: IntoIterator<Item = &'a ClassifiedFile>,
{
    metadata.contents_mut().build(files);
}
