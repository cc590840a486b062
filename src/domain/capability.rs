// Capabilities an entity provider declares when it registers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Every provider has this one
    EntityProvider,
    CoreEntityProvider,
    ReferenceParseable,
    ViewUrlCustomizable,
    Resolvable,
    CollectionResolvable,
    ActionsExecutable,
    Describeable,
    BrowseSearchable,
    Exportable,
    InputTranslatable,
    Redirectable,
}

impl Capability {
    pub const ALL: [Capability; 12] = [
        Capability::EntityProvider,
        Capability::CoreEntityProvider,
        Capability::ReferenceParseable,
        Capability::ViewUrlCustomizable,
        Capability::Resolvable,
        Capability::CollectionResolvable,
        Capability::ActionsExecutable,
        Capability::Describeable,
        Capability::BrowseSearchable,
        Capability::Exportable,
        Capability::InputTranslatable,
        Capability::Redirectable,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// A set of capabilities stored as a bitset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities(u16);

impl Capabilities {
    /// Only the root capability
    pub fn root() -> Self {
        Self(Capability::EntityProvider.bit())
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.insert(capability);
        self
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub fn remove(&mut self, capability: Capability) {
        self.0 &= !capability.bit();
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::root()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::root(), Self::with)
    }
}

impl Serialize for Capabilities {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_always_present() {
        let caps: Capabilities = vec![Capability::Resolvable].into_iter().collect();
        assert!(caps.contains(Capability::EntityProvider));
        assert!(caps.contains(Capability::Resolvable));
        assert!(!caps.contains(Capability::ActionsExecutable));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut caps = Capabilities::root().with(Capability::Describeable);
        caps.remove(Capability::Describeable);
        assert_eq!(caps, Capabilities::root());
    }

    #[test]
    fn test_serializes_as_list() {
        let caps = Capabilities::root().with(Capability::ViewUrlCustomizable);
        let json = serde_json::to_string(&caps).unwrap();
        assert_eq!(json, r#"["entity_provider","view_url_customizable"]"#);
    }
}
