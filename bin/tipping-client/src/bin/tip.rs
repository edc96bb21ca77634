use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use dotenv::dotenv;
use futures::StreamExt;
use std::env;
use std::str::FromStr;
use tipjar_client::config::ClientConfig;
use tipjar_client::resolver::RecipientResolver;
use tipjar_client::submission::{build_call, TransferSubmitter};
use tipjar_client::wallet::rpc::RpcWallet;
use tipjar_client::wallet::TransferWallet;
use tipjar_primitives::address::{checksum, short_address};
use tipjar_primitives::alloy::network::EthereumWallet;
use tipjar_primitives::alloy::providers::ProviderBuilder;
use tipjar_primitives::alloy::signers::PrivateKeySigner;
use tipjar_primitives::amount::{format_balance, is_preset, DEFAULT_TIP_AMOUNT};
use tipjar_primitives::chains::chain_name;
use tipjar_primitives::lifecycle::LifecycleState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Load environment variables from the `.env` file
    dotenv().ok();
    let config = ClientConfig::from_env()?;

    // setup tracing for client execution
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(config.log_level()?)
        .init();

    let recipient = env::var("RECIPIENT").wrap_err("RECIPIENT must be set")?;
    let amount = env::var("AMOUNT").unwrap_or_else(|_| DEFAULT_TIP_AMOUNT.to_string());
    let priv_key = env::var("SENDER_PRIVATE_KEY").wrap_err("SENDER_PRIVATE_KEY must be set")?;

    // build signer and provider
    let signer = PrivateKeySigner::from_str(&priv_key)?;
    let sender = signer.address();
    let rpc_provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::new(signer))
        .on_http(config.rpc_url()?);

    // resolve who we are tipping
    let resolver = RecipientResolver::from_config(&config, rpc_provider.clone())?;
    let resolution = resolver.resolve(&recipient).await;
    if let Some(error) = resolution.error() {
        bail!("could not resolve {recipient}: {error}");
    }
    let Some(to) = resolution.address() else {
        bail!("RECIPIENT is empty");
    };
    tracing::info!(
        "tipping {} ({}) via {:?}",
        resolution.display_name().unwrap_or(&recipient),
        short_address(&to),
        resolution.kind()
    );

    if !is_preset(&amount) {
        tracing::info!("using custom amount {} ETH", amount);
    }
    let call = build_call(&checksum(&to), &amount)
        .ok_or_else(|| eyre!("invalid tip amount {amount:?}"))?;

    let wallet = RpcWallet::new(rpc_provider, sender, config.confirmation_timeout());
    let balance = wallet.balance(sender).await?;
    tracing::info!("sender {} holds {} ETH", short_address(&sender), format_balance(balance));

    let submitter = TransferSubmitter::new(wallet, config.chain_id);
    if !submitter.chain_matches().await? {
        tracing::warn!("rpc is not on {}, requesting switch", chain_name(config.chain_id));
        submitter
            .switch_to_required_chain()
            .await
            .wrap_err("failed to switch network")?;
    }

    let mut states = submitter.submit(Some(call), config.sponsorship());
    while let Some(state) = states.next().await {
        match &state {
            LifecycleState::Pending { handle } => tracing::info!("submitted {}", handle),
            LifecycleState::Success { tx_hash } => tracing::info!("tip confirmed in {}", tx_hash),
            LifecycleState::Error(failure) => tracing::error!("{}", failure),
            other => tracing::info!("{}", other.name()),
        }
    }
    drop(states);

    if submitter.take_celebration() {
        tracing::info!("sent {} ETH to {}", amount, checksum(&to));
    }

    match submitter.state() {
        LifecycleState::Error(failure) => Err(eyre!(failure.message)),
        _ => Ok(()),
    }
}
