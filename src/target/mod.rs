// src/target/mod.rs

//! Installation targets for Magento Connect packages
//!
//! Every shipped file belongs to exactly one top-level installation target.
//! The installer resolves each target to a directory of the Magento root and
//! places the file at its relative path underneath it.
//!
//! # Default Targets
//!
//! | Source prefix | Target |
//! |---------------|--------|
//! | `app/code/community/` | `magecommunity` |
//! | `app/code/core/` | `magecore` |
//! | `app/code/local/` | `magelocal` |
//! | `app/design/` | `magedesign` |
//! | `app/etc/` | `mageetc` |
//! | `app/locale/` | `magelocale` |
//! | `lib/` | `magelib` |
//! | `media/` | `magemedia` |
//! | `skin/` | `mageskin` |
//! | `Test/` | `magetest` |
//! | anything else | `mage` |
//!
//! # Usage
//!
//! ```
//! use magepkg::target::TargetClassifier;
//!
//! let classifier = TargetClassifier::default();
//! let classified = classifier.classify("app/code/local/Foo/Bar.php");
//! assert_eq!(classified.target, "magelocal");
//! assert_eq!(classified.relative_path, "Foo/Bar.php");
//! ```

mod classifier;

pub use classifier::{ClassifiedPath, TargetClassifier, TargetRule, CATCH_ALL_TARGET};
