//! # Command-Line Surface
//!
//! Every subcommand runs under the data directory lock and prints one JSON
//! document on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dr_title_registry::{TitleRegistryApi, WorkflowError};
use serde_json::{json, Value};
use shared_types::{DocumentRef, Identity, PropertyId, Role};

use crate::config::{NodeConfig, DEFAULT_DATA_DIR};
use crate::store::{DataDir, StoreError};

/// Deed Node: property title registry operator CLI
#[derive(Parser, Debug)]
#[command(name = "deed-node")]
#[command(about = "Role-gated property registration and transfer with an audit trail")]
pub struct Cli {
    /// Registry data directory
    #[arg(long, env = "DEED_DATA_DIR", default_value = DEFAULT_DATA_DIR, global = true)]
    pub data_dir: PathBuf,

    /// Log level filter, overrides DEED_LOG_LEVEL
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: NodeCommand,
}

#[derive(Args, Debug, Clone)]
pub struct Actor {
    /// Identity performing the operation
    #[arg(long)]
    pub caller: Identity,

    /// Property identifier
    #[arg(long)]
    pub property: PropertyId,
}

#[derive(Args, Debug, Clone)]
pub struct RoleChange {
    /// Admin performing the change
    #[arg(long)]
    pub caller: Identity,

    /// Identity gaining or losing the role
    #[arg(long)]
    pub identity: Identity,

    /// admin, notary or registrar
    #[arg(long)]
    pub role: Role,
}

#[derive(Subcommand, Debug, Clone)]
pub enum NodeCommand {
    /// Create an empty registry with a single admin
    Init {
        #[arg(long)]
        admin: Identity,
    },
    /// Grant a role (admin only)
    Grant(RoleChange),
    /// Revoke a role (admin only)
    Revoke(RoleChange),
    /// Open or resubmit a registration request
    RequestRegistration {
        #[command(flatten)]
        actor: Actor,
        /// Document reference, repeatable
        #[arg(long = "doc")]
        documents: Vec<DocumentRef>,
    },
    /// Approve registration documentation (notary)
    ApproveRegistration(Actor),
    /// Register the pending owner (registrar)
    FinalizeRegistration(Actor),
    /// Ask to transfer a property (current owner)
    RequestTransfer {
        #[command(flatten)]
        actor: Actor,
        #[arg(long)]
        new_owner: Identity,
        /// Document reference, repeatable
        #[arg(long = "doc")]
        documents: Vec<DocumentRef>,
    },
    /// Approve transfer documentation (notary)
    ApproveTransfer(Actor),
    /// Record payment and move ownership (registrar)
    FinalizeTransfer {
        #[command(flatten)]
        actor: Actor,
        #[arg(long)]
        payment: String,
    },
    /// Show owner and request for a property
    Show {
        #[arg(long)]
        property: PropertyId,
    },
    /// Print audit records
    Audit {
        /// Only records for this property
        #[arg(long)]
        property: Option<PropertyId>,
        /// Only records with sequence >= this value
        #[arg(long, default_value_t = 0)]
        since: u64,
    },
    /// Check the hash chain and that replay reproduces live state
    Verify,
}

impl NodeCommand {
    fn name(&self) -> &'static str {
        match self {
            NodeCommand::Init { .. } => "init",
            NodeCommand::Grant(_) => "grant_role",
            NodeCommand::Revoke(_) => "revoke_role",
            NodeCommand::RequestRegistration { .. } => "request_registration",
            NodeCommand::ApproveRegistration(_) => "approve_registration_docs",
            NodeCommand::FinalizeRegistration(_) => "finalize_registration",
            NodeCommand::RequestTransfer { .. } => "request_transfer",
            NodeCommand::ApproveTransfer(_) => "approve_transfer_docs",
            NodeCommand::FinalizeTransfer { .. } => "record_payment_and_finalize",
            NodeCommand::Show { .. } => "show",
            NodeCommand::Audit { .. } => "audit",
            NodeCommand::Verify => "verify",
        }
    }
}

/// Renders a rejected workflow operation the way it is printed on stdout.
pub fn workflow_error_json(err: &WorkflowError) -> Value {
    json!({
        "error": {
            "kind": err.kind().as_str(),
            "message": err.to_string(),
        }
    })
}

/// Runs one command against the data directory in `config`.
pub fn execute(config: &NodeConfig, command: NodeCommand) -> Result<Value> {
    let store = DataDir::new(&config.data_dir);
    let _lock = store
        .lock()
        .with_context(|| format!("locking {}", config.data_dir.display()))?;
    tracing::debug!(command = command.name(), data_dir = %config.data_dir.display(), "Running command");

    if let NodeCommand::Init { admin } = &command {
        let roles = store.initialize(admin.clone())?;
        return Ok(json!({
            "data_dir": config.data_dir,
            "roles": roles,
        }));
    }

    let engine = store
        .open_engine(config.workflow.clone())
        .context("restoring registry from data directory")?;

    let output = match command {
        NodeCommand::Init { .. } => {
            return Err(StoreError::AlreadyInitialized(config.data_dir.clone()).into())
        }
        NodeCommand::Grant(change) => {
            let changed = engine.grant_role(&change.caller, change.identity.clone(), change.role)?;
            store.save_roles(&engine.roles())?;
            json!({ "identity": change.identity, "role": change.role, "changed": changed })
        }
        NodeCommand::Revoke(change) => {
            let changed = engine.revoke_role(&change.caller, &change.identity, change.role)?;
            store.save_roles(&engine.roles())?;
            json!({ "identity": change.identity, "role": change.role, "changed": changed })
        }
        NodeCommand::RequestRegistration { actor, documents } => {
            json!(engine.request_registration(&actor.caller, actor.property, documents)?)
        }
        NodeCommand::ApproveRegistration(actor) => {
            json!(engine.approve_registration_docs(&actor.caller, actor.property)?)
        }
        NodeCommand::FinalizeRegistration(actor) => {
            json!(engine.finalize_registration(&actor.caller, actor.property)?)
        }
        NodeCommand::RequestTransfer {
            actor,
            new_owner,
            documents,
        } => json!(engine.request_transfer(&actor.caller, actor.property, new_owner, documents)?),
        NodeCommand::ApproveTransfer(actor) => {
            json!(engine.approve_transfer_docs(&actor.caller, actor.property)?)
        }
        NodeCommand::FinalizeTransfer { actor, payment } => {
            json!(engine.record_payment_and_finalize(&actor.caller, actor.property, payment)?)
        }
        NodeCommand::Show { property } => json!(engine.property(property)),
        NodeCommand::Audit { property, since } => {
            let records = match property {
                Some(property) => engine.audit_records_for(property),
                None => engine.audit_records(),
            };
            let records: Vec<_> = records.into_iter().filter(|r| r.sequence >= since).collect();
            json!(records)
        }
        NodeCommand::Verify => {
            engine.audit_log().verify()?;
            engine.verify_replay()?;
            json!({
                "records": engine.audit_log().len(),
                "head_hash": engine.audit_log().head_hash(),
                "owners": engine.ledger().len(),
                "active_requests": engine.requests().active_count(),
            })
        }
    };
    Ok(output)
}
