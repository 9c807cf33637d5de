use {
  crowdfund_network::PeerId,
  crowdfund_primitives::{Address, Party},
  parking_lot::RwLock,
  serde::{Deserialize, Serialize},
  std::sync::Arc,
};

/// A node known to the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
  pub party: Party,
  pub notary: bool,
}

impl NodeInfo {
  pub fn peer_id(&self) -> PeerId {
    peer_id(&self.party)
  }
}

/// Name under which a party's node is reachable.
pub fn peer_id(party: &Party) -> PeerId {
  PeerId::new(party.name.as_str())
}

/// Directory of all nodes on the network and their well-known
/// identities. Shared by all nodes of one network.
#[derive(Clone, Default)]
pub struct NetworkMap {
  nodes: Arc<RwLock<Vec<NodeInfo>>>,
}

impl NetworkMap {
  pub fn register(&self, info: NodeInfo) {
    let mut nodes = self.nodes.write();
    nodes.retain(|n| n.party.name != info.party.name);
    nodes.push(info);
  }

  pub fn all_nodes(&self) -> Vec<NodeInfo> {
    self.nodes.read().clone()
  }

  pub fn notary_identities(&self) -> Vec<Party> {
    self
      .nodes
      .read()
      .iter()
      .filter(|n| n.notary)
      .map(|n| n.party.clone())
      .collect()
  }

  pub fn is_notary(&self, party: &Party) -> bool {
    self
      .nodes
      .read()
      .iter()
      .any(|n| n.notary && n.party == *party)
  }

  pub fn party_for_key(&self, key: &Address) -> Option<Party> {
    self
      .nodes
      .read()
      .iter()
      .find(|n| n.party.owning_key == *key)
      .map(|n| n.party.clone())
  }

  pub fn party_by_name(&self, name: &str) -> Option<Party> {
    self
      .nodes
      .read()
      .iter()
      .find(|n| n.party.name == name)
      .map(|n| n.party.clone())
  }
}
