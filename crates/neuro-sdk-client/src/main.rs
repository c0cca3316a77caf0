//! neuro-sdk demo integration
//!
//! Connects to the endpoint from `neuro.yaml` (or `NEURO_GAME` /
//! `NEURO_SDK_WS_URL`), registers a couple of actions, opens one action
//! window and logs whatever the peer does until Ctrl-C.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, value::RawValue};
use tracing_subscriber::{fmt, EnvFilter};

use neuro_sdk_client::{config, ActionHandler, Client, Validation};
use neuro_sdk_core::protocol::{parse_action_data, ActionSchema, ForceOptions, Priority};
use neuro_sdk_core::Result;

const CONFIG_PATH: &str = "neuro.yaml";

struct Greet;

#[async_trait]
impl ActionHandler for Greet {
    type State = ();

    fn name(&self) -> &str {
        "greet"
    }

    fn description(&self) -> &str {
        "Say hello to the player"
    }

    fn validate(&self, _data: Option<&RawValue>) -> Validation<()> {
        Validation::success((), "Greeting the player")
    }

    async fn execute(&self, _state: ()) {
        tracing::info!("hello, player");
    }
}

#[derive(Debug, Default, Deserialize)]
struct GiveItemArgs {
    item: String,
    #[serde(default)]
    amount: Option<u32>,
}

struct GiveItem;

#[async_trait]
impl ActionHandler for GiveItem {
    type State = GiveItemArgs;

    fn name(&self) -> &str {
        "give_item"
    }

    fn description(&self) -> &str {
        "Give the player an item"
    }

    fn schema(&self) -> Option<ActionSchema> {
        Some(
            ActionSchema::default()
                .property("item", json!({ "type": "string", "enum": ["apple", "sword", "shield"] }))
                .property("amount", json!({ "type": "integer", "minimum": 1, "maximum": 10 }))
                .required("item"),
        )
    }

    fn validate(&self, data: Option<&RawValue>) -> Validation<GiveItemArgs> {
        let args: GiveItemArgs = match parse_action_data(data) {
            Ok(args) => args,
            Err(e) => return Validation::failure(format!("Invalid data: {e}")),
        };
        if args.item.is_empty() {
            return Validation::failure("Missing item");
        }
        let message = format!("Giving {} x{}", args.item, args.amount.unwrap_or(1));
        Validation::success(args, message)
    }

    async fn execute(&self, args: GiveItemArgs) {
        tracing::info!(item = %args.item, amount = args.amount.unwrap_or(1), "item given");
    }
}

/// One of the rewards offered in the reward window.
struct Reward(&'static str);

#[async_trait]
impl ActionHandler for Reward {
    type State = ();

    fn name(&self) -> &str {
        self.0
    }

    fn description(&self) -> &str {
        "Pick this reward"
    }

    fn validate(&self, _data: Option<&RawValue>) -> Validation<()> {
        Validation::success((), format!("Picked {}", self.0))
    }

    async fn execute(&self, _state: ()) {
        tracing::info!(reward = self.0, "reward picked");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = if Path::new(CONFIG_PATH).exists() {
        config::load_from_file(CONFIG_PATH)?
    } else {
        config::from_env("Example Game")?
    };

    let client = Client::new(cfg)?;
    let mut errors = client.errors()?;
    tokio::spawn(async move {
        while let Some(e) = errors.next().await {
            tracing::error!(code = e.kind().as_str(), error = %e, "client error");
        }
    });

    tracing::info!(game = client.game(), url = %client.config().websocket_url, "neuro-sdk demo starting");
    client.connect().await?;

    client
        .register_actions(&[Greet.into(), GiveItem.into()])
        .await?;
    client
        .send_context("The demo game has started. The player is idle.", false)
        .await?;

    let mut window = client.new_action_window();
    window
        .add_action(Reward("take_gold"))
        .add_action(Reward("take_sword"))
        .set_force(
            "Pick a reward for the player",
            ForceOptions::new()
                .with_state("The player just cleared the first dungeon")
                .with_priority(Priority::Medium),
        );
    window.register().await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
    }

    window.end().await?;
    client.send_shutdown_ready().await?;
    client.close().await?;
    tracing::info!(metrics = %client.metrics().render(), "neuro-sdk demo stopped");
    Ok(())
}
