//! Interned hierarchical capability tags.
//!
//! Tags are dotted paths (`Parkour.Action.Mantle`). A path is interned once into a
//! compact [`GameplayTag`] handle; matching is hierarchical, so `Parkour.Action.Mantle`
//! matches the parent `Parkour.Action` but not `Parkour.Act`.
//!
//! Other systems can own the tag namespace by registering a [`TagResolver`]. When none
//! is registered (or it does not know a name) the local [`TagTable`] interns the path
//! directly.

use std::collections::HashMap;

use crate::action::{ClimbStyle, LogicalState, ParkourAction, TraversalDirection};

/// Compact handle for an interned tag path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameplayTag(u32);

impl GameplayTag {
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Maps a symbolic tag name to a handle owned by some external tag system.
pub trait TagResolver {
    fn resolve(&self, name: &str) -> Option<GameplayTag>;

    /// Reverse lookup, used for hierarchical matching of resolved tags.
    fn path(&self, tag: GameplayTag) -> Option<&str>;
}

#[derive(Clone, Debug, Default)]
pub struct TagTable {
    paths: Vec<String>,
    by_path: HashMap<String, GameplayTag>,
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table pre-populated with every tag the engine can publish.
    pub fn with_parkour_tags() -> Self {
        let mut table = Self::new();
        for action in ParkourAction::ALL {
            table.intern(&action.tag_path());
        }
        for state in [
            LogicalState::NotBusy,
            LogicalState::Mantle,
            LogicalState::Vault,
            LogicalState::Climb,
            LogicalState::ReachLedge,
            LogicalState::TicTac,
            LogicalState::CornerMove,
            LogicalState::BeamHidden,
        ] {
            table.intern(&state.tag_path());
        }
        for style in [ClimbStyle::None, ClimbStyle::FreeHang, ClimbStyle::Braced] {
            table.intern(&style.tag_path());
        }
        for dir in [
            TraversalDirection::None,
            TraversalDirection::Forward,
            TraversalDirection::Backward,
            TraversalDirection::Left,
            TraversalDirection::Right,
            TraversalDirection::Up,
            TraversalDirection::UpLeft,
            TraversalDirection::UpRight,
        ] {
            table.intern(&dir.tag_path());
        }
        table
    }

    /// Return the handle for `path`, interning it on first use.
    pub fn intern(&mut self, path: &str) -> GameplayTag {
        if let Some(tag) = self.by_path.get(path) {
            return *tag;
        }
        let tag = GameplayTag(self.paths.len() as u32);
        self.paths.push(path.to_owned());
        self.by_path.insert(path.to_owned(), tag);
        tag
    }

    pub fn get(&self, path: &str) -> Option<GameplayTag> {
        self.by_path.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// All interned tags at or below `parent_path`.
    pub fn children_of<'a>(&'a self, parent_path: &'a str) -> impl Iterator<Item = GameplayTag> + 'a {
        self.paths
            .iter()
            .enumerate()
            .filter(move |(_, p)| path_matches(p, parent_path))
            .map(|(i, _)| GameplayTag(i as u32))
    }
}

impl TagResolver for TagTable {
    fn resolve(&self, name: &str) -> Option<GameplayTag> {
        self.get(name)
    }

    fn path(&self, tag: GameplayTag) -> Option<&str> {
        self.paths.get(tag.0 as usize).map(String::as_str)
    }
}

/// `path` equals `parent` or sits below it in the dotted hierarchy.
pub fn path_matches(path: &str, parent: &str) -> bool {
    match path.strip_prefix(parent) {
        Some("") => true,
        Some(rest) => rest.starts_with('.'),
        None => false,
    }
}

/// Resolves names through an optional external resolver, falling back to a local table.
#[derive(Default)]
pub struct TagRegistry {
    table: TagTable,
    resolver: Option<Box<dyn TagResolver>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self {
            table: TagTable::with_parkour_tags(),
            resolver: None,
        }
    }

    pub fn set_resolver(&mut self, resolver: Box<dyn TagResolver>) {
        self.resolver = Some(resolver);
    }

    pub fn resolve(&mut self, name: &str) -> GameplayTag {
        if let Some(tag) = self.resolver.as_ref().and_then(|r| r.resolve(name)) {
            return tag;
        }
        self.table.intern(name)
    }

    pub fn path(&self, tag: GameplayTag) -> Option<&str> {
        self.resolver
            .as_ref()
            .and_then(|r| r.path(tag))
            .or_else(|| TagResolver::path(&self.table, tag))
    }

    /// Hierarchical match of `tag` against a parent path.
    pub fn matches(&self, tag: GameplayTag, parent_path: &str) -> bool {
        self.path(tag).is_some_and(|p| path_matches(p, parent_path))
    }
}
