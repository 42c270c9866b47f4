//! Static page content.
//!
//! The [`PageRegistry`] holds each page's title and body in menu order.
//! Sessions refer to pages by menu position. It is built once at startup and shared read-only by
//! every session through an `Arc`, so no locking is involved.

use std::collections::HashSet;

use thiserror::Error;

/// Errors from building a [`PageRegistry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A registry needs at least one page to display.
    #[error("page registry is empty")]
    Empty,

    /// Two pages share an identifier.
    #[error("duplicate page id: {0}")]
    DuplicateId(String),
}

/// A displayable page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Stable identifier (e.g. `"home"`).
    pub id: String,
    /// Menu label.
    pub title: String,
    /// Pre-formatted body text.
    pub body: String,
}

impl Page {
    /// Create a page.
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), body: body.into() }
    }
}

/// Immutable page table in menu order.
///
/// Every menu entry is a page of the table by construction: the menu is the
/// sequence of pages handed to [`PageRegistry::new`].
#[derive(Debug, Clone)]
pub struct PageRegistry {
    pages: Vec<Page>,
}

impl PageRegistry {
    /// Build a registry. Menu order follows iteration order.
    pub fn new(pages: impl IntoIterator<Item = Page>) -> Result<Self, RegistryError> {
        let pages: Vec<Page> = pages.into_iter().collect();
        if pages.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::with_capacity(pages.len());
        if let Some(page) = pages.iter().find(|page| !seen.insert(page.id.as_str())) {
            return Err(RegistryError::DuplicateId(page.id.clone()));
        }

        Ok(Self { pages })
    }

    /// The stock pages: home, about, interests, contact.
    pub fn builtin() -> Self {
        Self {
            pages: vec![
                Page::new("home", "Home", HOME),
                Page::new("about", "About", ABOUT),
                Page::new("interests", "Interests", INTERESTS),
                Page::new("contact", "Contact", CONTACT),
            ],
        }
    }

    /// Number of menu entries. Always at least one.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page at a menu position.
    pub fn at(&self, position: usize) -> Option<&Page> {
        self.pages.get(position)
    }

    /// Page at a menu position, clamped to the last entry.
    pub(crate) fn clamped(&self, position: usize) -> &Page {
        &self.pages[position.min(self.pages.len() - 1)]
    }

    /// Pages in menu order.
    pub fn menu(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }
}

const HOME: &str = r"
  _                          _ _
 | |_ ___ _ __ _ __ ___  ___(_) |_ ___
 | __/ _ \ '__| '_ ` _ \/ __| | __/ _ \
 | ||  __/ |  | | | | | \__ \ | ||  __/
  \__\___|_|  |_| |_| |_|___/_|\__\___|

Welcome!

Navigate with the arrow keys or j/k
Press Enter to select
Press 1-4 to jump to a page
Press q to quit
";

const ABOUT: &str = "
+---------------------------------------+
|                ABOUT                  |
+---------------------------------------+

A small personal site that lives in
your terminal.

The same menu is served over SSH and
to the browser through a WebSocket,
one isolated session per connection.
";

const INTERESTS: &str = "
+---------------------------------------+
|               INTERESTS               |
+---------------------------------------+

  * Systems programming in Rust
  * Network protocols
  * Terminal user interfaces
";

const CONTACT: &str = "
+---------------------------------------+
|                CONTACT                |
+---------------------------------------+

Say hi, I am always open to
interesting collaborations.

  GitHub:  https://github.com/
  Email:   hello@example.com
";
