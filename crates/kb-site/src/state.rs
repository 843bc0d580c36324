//! Site tree with efficient path lookups.
//!
//! Pages live in a flat `Vec<Page>` with parent/child relationships held
//! as indices, giving O(1) path lookup through a `HashMap` and O(d)
//! breadcrumb building where d is the page depth. The structure is
//! immutable once built; [`Site`](crate::Site) swaps whole snapshots.

use std::collections::HashMap;

use serde::Serialize;

/// One page of the site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Display title.
    pub title: String,
    /// URL path without leading slash ("" for the root page).
    pub path: String,
}

/// Navigation tree node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Display title.
    pub title: String,
    /// URL path without leading slash.
    pub path: String,
    /// Child items.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

/// Breadcrumb entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BreadcrumbItem {
    /// Display title.
    pub title: String,
    /// URL path without leading slash ("" for Home).
    pub path: String,
}

/// Immutable page tree for one site snapshot.
pub struct SiteState {
    pages: Vec<Page>,
    children: Vec<Vec<usize>>,
    parents: Vec<Option<usize>>,
    roots: Vec<usize>,
    path_index: HashMap<String, usize>,
}

impl SiteState {
    fn new(
        pages: Vec<Page>,
        children: Vec<Vec<usize>>,
        parents: Vec<Option<usize>>,
        roots: Vec<usize>,
    ) -> Self {
        let path_index = pages
            .iter()
            .enumerate()
            .map(|(i, page)| (page.path.clone(), i))
            .collect();

        Self {
            pages,
            children,
            parents,
            roots,
            path_index,
        }
    }

    /// Look up a page by URL path (without leading slash, "" for root).
    #[must_use]
    pub fn get_page(&self, path: &str) -> Option<&Page> {
        self.path_index.get(path).map(|&i| &self.pages[i])
    }

    /// All pages in insertion order.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Build the navigation tree.
    ///
    /// The top level is the root page's children when a root page exists,
    /// otherwise the root-level pages themselves (sites without a top
    /// `index.md` still get navigation).
    #[must_use]
    pub fn navigation(&self) -> Vec<NavItem> {
        let top: &[usize] = match self.path_index.get("") {
            Some(&root) => &self.children[root],
            None => &self.roots,
        };

        top.iter().map(|&idx| self.nav_item(idx)).collect()
    }

    fn nav_item(&self, idx: usize) -> NavItem {
        let page = &self.pages[idx];
        NavItem {
            title: page.title.clone(),
            path: page.path.clone(),
            children: self.children[idx]
                .iter()
                .map(|&child| self.nav_item(child))
                .collect(),
        }
    }

    /// Build breadcrumbs for a path.
    ///
    /// Non-root pages get a leading "Home" crumb followed by their
    /// ancestors; the page itself is not included. The root page gets no
    /// breadcrumbs. Unknown paths get just "Home" so a 404 page still has
    /// a way back.
    #[must_use]
    pub fn breadcrumbs(&self, path: &str) -> Vec<BreadcrumbItem> {
        if path.is_empty() {
            return Vec::new();
        }

        let home = BreadcrumbItem {
            title: "Home".to_owned(),
            path: String::new(),
        };

        let Some(&idx) = self.path_index.get(path) else {
            return vec![home];
        };

        // Collect ancestors root-first, excluding the page itself and the
        // root page (Home already stands for it).
        let mut chain = Vec::new();
        let mut current = self.parents[idx];
        while let Some(i) = current {
            if !self.pages[i].path.is_empty() {
                chain.push(BreadcrumbItem {
                    title: self.pages[i].title.clone(),
                    path: self.pages[i].path.clone(),
                });
            }
            current = self.parents[i];
        }
        chain.push(home);
        chain.reverse();
        chain
    }
}

/// Incremental constructor for [`SiteState`].
///
/// Pages must be added parents-first; `add_page` returns the index to use
/// as `parent` for subsequent children.
pub(crate) struct SiteStateBuilder {
    pages: Vec<Page>,
    children: Vec<Vec<usize>>,
    parents: Vec<Option<usize>>,
    roots: Vec<usize>,
}

impl SiteStateBuilder {
    pub(crate) fn new() -> Self {
        Self {
            pages: Vec::new(),
            children: Vec::new(),
            parents: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub(crate) fn add_page(&mut self, title: String, path: String, parent: Option<usize>) -> usize {
        let idx = self.pages.len();

        self.pages.push(Page { title, path });
        self.children.push(Vec::new());
        self.parents.push(parent);

        match parent {
            Some(p) => self.children[p].push(idx),
            None => self.roots.push(idx),
        }

        idx
    }

    pub(crate) fn build(self) -> SiteState {
        SiteState::new(self.pages, self.children, self.parents, self.roots)
    }
}
