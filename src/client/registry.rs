use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use super::Client;

/// Stable handle to a client record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

/// Owns every client record. Ordering lives in the monitors' `clients` and
/// `stack` sequences; swallowed clients stay here while detached from both.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, Client>,
    next_id: u64,
}

impl ClientRegistry {
    pub fn insert(&mut self, client: Client) -> ClientId {
        let id = ClientId(self.next_id);
        self.next_id += 1;
        self.clients.insert(id, client);
        id
    }

    pub fn remove(&mut self, id: ClientId) -> Option<Client> {
        self.clients.remove(&id)
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClientId, &Client)> {
        self.clients.iter().map(|(&id, client)| (id, client))
    }
}

/// Handles come from monitor sequences that are kept in sync with the
/// registry, so a missing entry is a broken invariant.
impl Index<ClientId> for ClientRegistry {
    type Output = Client;

    fn index(&self, id: ClientId) -> &Client {
        self.get(id)
            .unwrap_or_else(|| panic!("client {:?} is not registered", id))
    }
}

impl IndexMut<ClientId> for ClientRegistry {
    fn index_mut(&mut self, id: ClientId) -> &mut Client {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("client {:?} is not registered", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn test_ids_are_not_reused() {
        let mut registry = ClientRegistry::default();
        let first = registry.insert(Client::new(1, Rect::default(), 0, 0));
        registry.remove(first);
        let second = registry.insert(Client::new(2, Rect::default(), 0, 0));
        assert_ne!(first, second);
        assert!(!registry.contains(first));
        assert_eq!(registry[second].window(), 2);
    }

    #[test]
    #[should_panic(expected = "is not registered")]
    fn test_mutable_lookup_of_removed_client_panics() {
        let mut registry = ClientRegistry::default();
        let id = registry.insert(Client::new(1, Rect::default(), 0, 0));
        registry.remove(id);
        registry[id].is_floating = true;
    }

    #[test]
    #[should_panic(expected = "is not registered")]
    fn test_lookup_of_removed_client_panics() {
        let mut registry = ClientRegistry::default();
        let id = registry.insert(Client::new(1, Rect::default(), 0, 0));
        registry.remove(id);
        let _ = registry[id].window();
    }
}
