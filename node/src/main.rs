use {
  crate::settings::SystemSettings,
  clap::Parser,
  crowdfund_network::Config,
  crowdfund_node::{
    CampaignProposal,
    Cluster,
    CrowdfundRpc,
    DonationProposal,
    Node,
    NodeConfig,
    OnDiskStorage,
  },
  metrics_exporter_prometheus::PrometheusBuilder,
  time::OffsetDateTime,
  tracing::{info, subscriber::set_global_default, warn},
  tracing_subscriber::{EnvFilter, FmtSubscriber},
};

mod settings;

const NOTARY: &str = "Notary";
const FUNDRAISER: &str = "Fundraiser";
const RECIPIENT: &str = "Recipient";

fn node_config(
  settings: &SystemSettings,
  name: String,
) -> anyhow::Result<NodeConfig> {
  let config = NodeConfig::new(name.as_str());
  Ok(match settings.data_dir() {
    Some(path) => config.with_storage(Box::new(OnDiskStorage::new(
      path,
      &format!("{}/{name}", settings.network_id()),
    )?)),
    None => config,
  })
}

// notary, fundraiser and recipient, then donors and observers.
fn start_cluster(
  settings: &SystemSettings,
) -> anyhow::Result<(Cluster, Vec<Node>)> {
  let cluster = Cluster::new(Config::default());
  let mut nodes = vec![cluster.start_node(
    node_config(settings, NOTARY.to_owned())?.notary(),
  )?];

  let names = [FUNDRAISER.to_owned(), RECIPIENT.to_owned()]
    .into_iter()
    .chain((1..=settings.donors()).map(|i| format!("Donor{i}")))
    .chain((1..=settings.observers()).map(|i| format!("Observer{i}")));

  for name in names {
    nodes.push(cluster.start_node(node_config(settings, name)?)?);
  }

  Ok((cluster, nodes))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // configure logging
  set_global_default(
    FmtSubscriber::builder()
      .with_env_filter(
        EnvFilter::try_from_default_env()
          .unwrap_or_else(|_| EnvFilter::new("info")),
      )
      .finish(),
  )?;

  // gather CLI parameters
  let settings = SystemSettings::parse();
  info!("startup settings: {settings:#?}");

  if let Some(addr) = settings.prometheus() {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!("serving metrics on {addr}");
  }

  // the nodes stay on the network for as long as they are held
  let (cluster, _nodes) = start_cluster(&settings)?;
  let retry = settings.retry();

  let fundraiser =
    CrowdfundRpc::connect(cluster.registry(), FUNDRAISER, &retry).await?;
  let campaign = fundraiser
    .propose_campaign(CampaignProposal {
      name: settings.campaign_name().to_owned(),
      target: settings.target().clone(),
      recipient: RECIPIENT.to_owned(),
      deadline: OffsetDateTime::now_utc() + settings.campaign_duration(),
      category: "community".to_owned(),
      external_id: None,
    })
    .await?;
  info!(
    "campaign {} started by {FUNDRAISER}, raising {}",
    campaign.state.linear_id, campaign.state.target
  );

  // donations run one after another, each donor sees the
  // campaign version committed by the one before it.
  for i in 1..=settings.donors() {
    let donor = format!("Donor{i}");
    let rpc = CrowdfundRpc::connect(cluster.registry(), &donor, &retry).await?;
    match rpc
      .propose_donation(DonationProposal {
        campaign_id: campaign.state.linear_id.clone(),
        amount: settings.donation().clone(),
        broadcast: true,
      })
      .await
    {
      Ok(donation) => info!("{donor} donated {}", donation.state.amount),
      Err(e) => warn!("donation by {donor} failed: {e}"),
    }
  }

  if let Some(latest) = fundraiser.campaign(&campaign.state.linear_id) {
    info!(
      "campaign {} raised {} of {}",
      latest.state.name, latest.state.raised, latest.state.target
    );
  }

  info!("nodes: {:?}", cluster.registry().names());
  tokio::signal::ctrl_c().await?;
  Ok(())
}
