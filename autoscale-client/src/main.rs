use anyhow::{Context, bail};
use autoscale_client::logger::init_logger_with_file;
use autoscale_client::{LaunchConfigSync, LaunchConfigurationSpec, RefreshChannel, SyncConfig, SyncState};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// Create or delete autoscaling launch configurations
#[derive(Debug, Parser)]
#[command(name = "lc-sync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a launch configuration
    Create(CreateArgs),
    /// Delete a launch configuration by name
    Delete {
        #[arg(long)]
        name: String,
    },
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// Read attributes from a JSON object; flags override its values
    #[arg(long, value_name = "FILE")]
    from_json: Option<PathBuf>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    image_id: Option<String>,
    #[arg(long)]
    key_name: Option<String>,
    /// File whose contents are sent verbatim as user data
    #[arg(long, value_name = "FILE")]
    user_data_file: Option<PathBuf>,
    #[arg(long)]
    instance_type: Option<String>,
    #[arg(long)]
    kernel_id: Option<String>,
    #[arg(long)]
    ramdisk_id: Option<String>,
    #[arg(long)]
    instance_monitoring: Option<bool>,
    #[arg(long)]
    spot_price: Option<String>,
    #[arg(long)]
    instance_profile_name: Option<String>,
    /// Repeat for each security group
    #[arg(long = "security-group")]
    security_groups: Vec<String>,
}

impl CreateArgs {
    fn into_spec(self) -> anyhow::Result<LaunchConfigurationSpec> {
        let mut spec = match &self.from_json {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let mut attributes: serde_json::Value = serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?;
                if let (Some(name), Some(map)) = (&self.name, attributes.as_object_mut()) {
                    map.insert("name".into(), name.clone().into());
                }
                LaunchConfigurationSpec::from_attributes(attributes)
                    .with_context(|| format!("decoding {}", path.display()))?
            }
            None => match &self.name {
                Some(name) => LaunchConfigurationSpec::new(name.clone()),
                None => bail!("--name is required unless --from-json provides it"),
            },
        };

        if let Some(path) = &self.user_data_file {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            spec.user_data = Some(data);
        }
        if !self.security_groups.is_empty() {
            spec.security_groups = Some(self.security_groups);
        }
        spec.image_id = self.image_id.or(spec.image_id);
        spec.key_name = self.key_name.or(spec.key_name);
        spec.instance_type = self.instance_type.or(spec.instance_type);
        spec.kernel_id = self.kernel_id.or(spec.kernel_id);
        spec.ramdisk_id = self.ramdisk_id.or(spec.ramdisk_id);
        spec.instance_monitoring = self.instance_monitoring.or(spec.instance_monitoring);
        spec.spot_price = self.spot_price.or(spec.spot_price);
        spec.instance_profile_name = self.instance_profile_name.or(spec.instance_profile_name);

        Ok(spec)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = SyncConfig::from_env();
    init_logger_with_file(Some(config.log_level.as_str()), config.log_dir.as_deref());

    let listing = Arc::new(RefreshChannel::default());
    let mut refreshes = listing.subscribe();
    let sync = LaunchConfigSync::from_config(&config, listing.clone())
        .context("building launch configuration client")?;

    tracing::info!(base_url = %config.base_url, "lc-sync starting");

    let pending = match cli.command {
        Command::Create(args) => sync.create(args.into_spec()?),
        Command::Delete { name } => sync.delete(LaunchConfigurationSpec::new(name)),
    };
    let name = pending.name().to_string();
    let action = pending.action();

    match pending.wait().await {
        SyncState::Succeeded => {
            if refreshes.try_recv().is_ok() {
                tracing::info!("Launch configuration listing is stale, refresh requested");
            }
            Ok(())
        }
        state => bail!("{} for {} ended in {:?}", action, name, state),
    }
}
