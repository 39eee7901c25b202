use desmo_hub_reader::cli::{
    AllocArgs, Cli, Command, DecodeArgs, EncodeArgs, EncodeValue, HubArgs, HubQuery,
};
use desmo_hub_reader::codec::{
    decode_callback, decode_query_result, encode_query_result, parse_decimal, QueryResult,
    ResultEnvelope,
};
use desmo_hub_reader::hub::{hub_contract_alloc, HubLayout, HubSnapshot, HubStorage};
use desmo_hub_reader::output;
use desmo_hub_reader::storage::{GenesisStorageReader, RpcStorageReader, StorageReader};

use clap::Parser;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Main entry point for the hub reader
#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.log_json);

    match cli.command {
        Command::Decode(args) => decode(args),
        Command::Encode(args) => encode(args),
        Command::Hub(args) => hub(args).await,
        Command::Alloc(args) => alloc(args),
    }
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn decode(args: DecodeArgs) -> eyre::Result<()> {
    if args.envelope {
        output::print_envelope(&ResultEnvelope::decode(&args.payload)?);
    } else if args.callback {
        output::print_query_result(&decode_callback(&args.payload)?);
    } else {
        output::print_query_result(&decode_query_result(&args.payload)?);
    }
    Ok(())
}

fn encode(args: EncodeArgs) -> eyre::Result<()> {
    let value = match args.value {
        EncodeValue::Integer { value } => QueryResult::integer(value),
        EncodeValue::Decimal { value } => parse_decimal(&value)?,
        EncodeValue::Text { value } => QueryResult::Text(value),
    };

    let payload = match args.request_id {
        Some(request_id) => ResultEnvelope::new(request_id, args.sources, value)?.encode(),
        None => encode_query_result(&value),
    };
    output::print_encoded(&payload);
    Ok(())
}

/// Default layout, then the layout file, then the address override.
fn resolve_layout(
    layout: Option<&Path>,
    hub_address: Option<alloy_primitives::Address>,
) -> eyre::Result<HubLayout> {
    let mut resolved = match layout {
        Some(path) => HubLayout::from_file(path)?,
        None => HubLayout::default(),
    };
    if let Some(address) = hub_address {
        resolved = resolved.with_contract(address);
    }
    Ok(resolved)
}

async fn hub(args: HubArgs) -> eyre::Result<()> {
    let layout = resolve_layout(args.layout.as_deref(), args.hub_address)?;

    if let Some(path) = &args.genesis {
        info!(
            target: "desmo::cli",
            genesis = %path.display(),
            contract = %layout.contract,
            "reading hub from genesis"
        );
        let reader = GenesisStorageReader::from_file(path)?;
        return run_hub(HubStorage::new(reader, layout), args.query).await;
    }

    let url =
        args.rpc_url.ok_or_else(|| eyre::eyre!("either --rpc-url or --genesis is required"))?;
    info!(
        target: "desmo::cli",
        %url,
        block = %args.block,
        contract = %layout.contract,
        "reading hub over RPC"
    );
    let reader = RpcStorageReader::new(&url)?.at_block(args.block);
    run_hub(HubStorage::new(reader, layout), args.query).await
}

async fn run_hub<R: StorageReader>(hub: HubStorage<R>, query: HubQuery) -> eyre::Result<()> {
    match query {
        HubQuery::Summary => {
            let (subset_size, counter, storager_length) = futures_util::try_join!(
                hub.tdd_subset_size(),
                hub.tdd_counter(),
                hub.tdd_storager_length()
            )?;
            output::print_hub_summary(hub.layout(), subset_size, counter, storager_length);
        }
        HubQuery::Registered => output::print_registered(&hub.registered_addresses().await?),
        HubQuery::Tdd { keys } => output::print_tdds(&hub.tdd_storager(&keys).await?),
        HubQuery::Selected { keys } => output::print_selected(&hub.selected_tdds(&keys).await?),
    }
    Ok(())
}

fn alloc(args: AllocArgs) -> eyre::Result<()> {
    let layout = resolve_layout(args.layout.as_deref(), args.hub_address)?;
    let snapshot: HubSnapshot =
        serde_json::from_reader(std::io::BufReader::new(std::fs::File::open(&args.snapshot)?))?;
    if snapshot.tdd_counter != snapshot.tdd_storager.len() as u64 {
        output::print_warning(&format!(
            "tddCounter is {} but the snapshot holds {} TDD records",
            snapshot.tdd_counter,
            snapshot.tdd_storager.len()
        ));
    }

    let account = hub_contract_alloc(&layout, &snapshot)?;
    let alloc = BTreeMap::from([(layout.contract, account)]);
    println!("{}", serde_json::to_string_pretty(&alloc)?);
    Ok(())
}
