//! Protein interaction graph CLI.
//!
//! Provides the `proteograph` binary for working with network payloads
//! offline. `summary` builds the base graph from a network payload and
//! prints its shape; `replay` additionally applies a script of
//! expand/collapse operations and emits the resulting model snapshot as
//! JSON.
//!
//! Uses the same `proteograph_core::InteractionModel` engine as the
//! interactive frontend, so replayed sessions behave identically.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use proteograph_core::{
    ExpansionState, InteractionModel, ModelConfig, NetworkPayload, ProteinId, SubgraphPayload,
};

/// Protein interaction graph tools.
#[derive(Parser)]
#[command(name = "proteograph", about = "Protein interaction graph tools")]
struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Build the base graph from a network payload and print its shape.
    Summary {
        /// Path to the network payload JSON file.
        network: PathBuf,
    },

    /// Apply a script of expand/collapse operations and print the final
    /// snapshot as JSON.
    Replay {
        /// Path to the network payload JSON file.
        network: PathBuf,

        /// Path to the operation script (JSON array).
        script: PathBuf,
    },
}

/// One scripted operation.
///
/// `expand` on an already-expanded owner collapses it instead, matching
/// the frontend's toggle behavior.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum ScriptOp {
    Expand { owner: String, payload: Value },
    Collapse { owner: String },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Commands::Summary { network } => run_summary(&network),
        Commands::Replay { network, script } => run_replay(&network, &script),
    };
    process::exit(exit_code);
}

/// Execute the summary subcommand.
///
/// Returns exit code: 0 = success, 1 = bad payload, 3 = I/O error.
fn run_summary(network: &PathBuf) -> i32 {
    let model = match load_model(network) {
        Ok(model) => model,
        Err(code) => return code,
    };

    println!("root:   {}", model.root());
    println!("nodes:  {}", model.node_count());
    println!("links:  {}", model.link_count());
    let max_depth = model
        .nodes()
        .map(|node| model.depth(&node.id))
        .max()
        .unwrap_or(0);
    println!("depth:  {max_depth}");
    0
}

/// Execute the replay subcommand.
///
/// Returns exit code: 0 = success, 1 = bad payload or script,
/// 3 = I/O error.
fn run_replay(network: &PathBuf, script: &PathBuf) -> i32 {
    let mut model = match load_model(network) {
        Ok(model) => model,
        Err(code) => return code,
    };

    let raw = match fs::read_to_string(script) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: failed to read script '{}': {}", script.display(), e);
            return 3;
        }
    };
    let ops: Vec<ScriptOp> = match serde_json::from_str(&raw) {
        Ok(ops) => ops,
        Err(e) => {
            eprintln!("Error: failed to parse script '{}': {}", script.display(), e);
            return 1;
        }
    };

    for (index, op) in ops.into_iter().enumerate() {
        apply_op(&mut model, index, op);
    }

    match serde_json::to_string_pretty(&model.snapshot()) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize snapshot: {}", e);
            return 1;
        }
    }
}

/// Apply one scripted operation. Failures are reported and skipped so a
/// replay keeps going, the way an interactive session would.
fn apply_op(model: &mut InteractionModel, index: usize, op: ScriptOp) {
    match op {
        ScriptOp::Expand { owner, payload } => {
            let owner = ProteinId::from(owner);
            if model.expansion_state(&owner) == ExpansionState::Expanded {
                model.collapse(&owner);
                return;
            }
            let payload = match SubgraphPayload::from_value(payload) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("op {index}: rejected payload for {owner}: {e}");
                    return;
                }
            };
            if let Err(e) = model.merge_expansion(&owner, payload) {
                warn!("op {index}: cannot expand {owner}: {e}");
            }
        }
        ScriptOp::Collapse { owner } => {
            let owner = ProteinId::from(owner);
            if model.collapse(&owner).is_none() {
                warn!("op {index}: {owner} is not expanded; ignoring");
            }
        }
    }
}

/// Load and build the model from a network payload file.
fn load_model(network: &PathBuf) -> Result<InteractionModel, i32> {
    let raw = fs::read_to_string(network).map_err(|e| {
        eprintln!("Error: failed to read '{}': {}", network.display(), e);
        3
    })?;
    let payload: NetworkPayload = serde_json::from_str(&raw).map_err(|e| {
        eprintln!("Error: failed to parse '{}': {}", network.display(), e);
        1
    })?;
    InteractionModel::build(payload, ModelConfig::default()).map_err(|e| {
        eprintln!("Error: {}", e);
        1
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> InteractionModel {
        let payload = NetworkPayload {
            main: "P1".to_owned(),
            proteins: vec!["P1".to_owned(), "P2".to_owned()],
            interactions: vec![],
        };
        InteractionModel::build(payload, ModelConfig::default()).unwrap()
    }

    #[test]
    fn script_ops_deserialize() {
        let raw = json!([
            {"op": "expand", "owner": "P2", "payload": {"proteins": [], "interactions": []}},
            {"op": "collapse", "owner": "P2"},
        ]);
        let ops: Vec<ScriptOp> = serde_json::from_value(raw).unwrap();
        assert!(matches!(ops[0], ScriptOp::Expand { .. }));
        assert!(matches!(ops[1], ScriptOp::Collapse { .. }));
    }

    #[test]
    fn expand_toggles_when_already_expanded() {
        let mut m = model();
        let payload = json!({"proteins": ["P3"], "interactions": []});
        apply_op(
            &mut m,
            0,
            ScriptOp::Expand {
                owner: "P2".to_owned(),
                payload: payload.clone(),
            },
        );
        assert_eq!(m.expansion_state(&"P2".into()), ExpansionState::Expanded);

        apply_op(
            &mut m,
            1,
            ScriptOp::Expand {
                owner: "P2".to_owned(),
                payload,
            },
        );
        assert_eq!(m.expansion_state(&"P2".into()), ExpansionState::Collapsed);
    }

    #[test]
    fn bad_ops_are_skipped_without_poisoning_the_replay() {
        let mut m = model();
        apply_op(
            &mut m,
            0,
            ScriptOp::Expand {
                owner: "GHOST".to_owned(),
                payload: json!({"proteins": [], "interactions": []}),
            },
        );
        apply_op(&mut m, 1, ScriptOp::Collapse { owner: "P2".to_owned() });
        assert_eq!(m.node_count(), 2);
    }
}
