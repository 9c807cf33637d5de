use {
  crate::{
    clock::{Clock, SystemClock},
    flows::dispatch,
    identity::IdentityService,
    keys::KeyManagementService,
    network_map::{NetworkMap, NodeInfo},
    notary::NotaryService,
    rpc::CrowdfundRpc,
    storage::{InMemoryStorage, Storage, StorageError},
    vault::Vault,
    ServiceHub,
  },
  crowdfund_network::{self as network, Network},
  crowdfund_primitives::{Keypair, Party},
  parking_lot::RwLock,
  std::{collections::HashMap, sync::Arc},
  thiserror::Error,
  tokio::task::JoinHandle,
  tracing::info,
};

#[derive(Debug, Error)]
pub enum NodeError {
  #[error("Network error: {0}")]
  Network(#[from] network::Error),

  #[error("Storage error: {0}")]
  Storage(#[from] StorageError),
}

/// Everything needed to start one node.
pub struct NodeConfig {
  name: String,
  notary: bool,
  storage: Box<dyn Storage>,
  clock: Arc<dyn Clock>,
}

impl NodeConfig {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      notary: false,
      storage: Box::<InMemoryStorage>::default(),
      clock: Arc::new(SystemClock),
    }
  }

  pub fn notary(mut self) -> Self {
    self.notary = true;
    self
  }

  pub fn with_storage(mut self, storage: Box<dyn Storage>) -> Self {
    self.storage = storage;
    self
  }

  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }
}

/// Running nodes by name, where RPC clients look for them.
#[derive(Clone, Default)]
pub struct NodeRegistry {
  nodes: Arc<RwLock<HashMap<String, Arc<ServiceHub>>>>,
}

impl NodeRegistry {
  pub fn get(&self, name: &str) -> Option<Arc<ServiceHub>> {
    self.nodes.read().get(name).cloned()
  }

  pub fn names(&self) -> Vec<String> {
    let mut names: Vec<_> = self.nodes.read().keys().cloned().collect();
    names.sort();
    names
  }

  fn insert(&self, name: String, hub: Arc<ServiceHub>) {
    self.nodes.write().insert(name, hub);
  }

  fn remove(&self, name: &str) {
    self.nodes.write().remove(name);
  }
}

/// A set of nodes sharing one network and one network map.
#[derive(Clone)]
pub struct Cluster {
  network: Network,
  network_map: NetworkMap,
  registry: NodeRegistry,
}

impl Cluster {
  pub fn new(config: network::Config) -> Self {
    Self {
      network: Network::new(config),
      network_map: NetworkMap::default(),
      registry: NodeRegistry::default(),
    }
  }

  pub fn network(&self) -> &Network {
    &self.network
  }

  pub fn network_map(&self) -> &NetworkMap {
    &self.network_map
  }

  pub fn registry(&self) -> &NodeRegistry {
    &self.registry
  }

  /// Joins a new node to the network and starts answering
  /// sessions other nodes open with it.
  pub fn start_node(&self, config: NodeConfig) -> Result<Node, NodeError> {
    let NodeConfig {
      name,
      notary,
      storage,
      clock,
    } = config;

    let endpoint = self.network.join(name.as_str())?;
    let keys =
      KeyManagementService::new(&name, Keypair::generate(&mut rand::thread_rng()));
    let party = keys.party().clone();

    let hub = Arc::new(ServiceHub {
      identities: IdentityService::new(self.network_map.clone()),
      vault: Vault::new(storage)?,
      network_map: self.network_map.clone(),
      notary: notary.then(|| NotaryService::new(Arc::clone(&clock))),
      dialer: endpoint.dialer(),
      session_timeout: self.network.config().session_timeout,
      clock,
      keys,
    });

    self.network_map.register(NodeInfo {
      party: party.clone(),
      notary,
    });

    let dispatcher = tokio::spawn(dispatch(Arc::clone(&hub), endpoint));
    self.registry.insert(name.clone(), Arc::clone(&hub));

    info!("started node {name} with key {}", party.owning_key);
    Ok(Node {
      hub,
      dispatcher,
      registry: self.registry.clone(),
    })
  }
}

/// A running node. Dropping it takes the node off the network.
pub struct Node {
  hub: Arc<ServiceHub>,
  dispatcher: JoinHandle<()>,
  registry: NodeRegistry,
}

impl Node {
  pub fn hub(&self) -> &Arc<ServiceHub> {
    &self.hub
  }

  pub fn party(&self) -> &Party {
    self.hub.party()
  }

  pub fn rpc(&self) -> CrowdfundRpc {
    CrowdfundRpc::new(Arc::clone(&self.hub))
  }
}

impl Drop for Node {
  fn drop(&mut self) {
    self.dispatcher.abort();
    self.registry.remove(&self.hub.party().name);
  }
}
