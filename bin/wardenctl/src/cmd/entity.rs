//! Inspect, delete or manipulate entities and their aliases.
use anyhow::Result;
use clap::Args;
use clap::Parser;
use clap::Subcommand;

use crate::Globals;

/// Inspect, delete or manipulate entities and their aliases.
#[derive(Debug, Parser)]
pub struct EntityCli {
    /// Select the `wardenctl entity` command to run.
    #[command(subcommand)]
    pub command: EntityCmd,
}

/// Possible entity commands to run.
#[derive(Debug, Subcommand)]
pub enum EntityCmd {
    /// Bind an authentication mount alias to an entity.
    AliasAttach(AliasOpt),

    /// Remove an authentication mount alias from an entity.
    AliasDetach(AliasOpt),

    /// Create a new entity.
    Create(PoliciesOpt),

    /// Delete an entity and all of its aliases.
    Delete(EntityOpt),

    /// Lookup details for an entity.
    Get(EntityOpt),

    /// Replace the policies assigned directly to an entity.
    Policies(SetPoliciesOpt),
}

/// Select an entity alias.
#[derive(Args, Debug)]
pub struct AliasOpt {
    /// ID of the entity.
    pub entity: String,

    /// ID of the authentication mount the alias is bound to.
    #[arg(long)]
    pub mount: String,

    /// Name of the principal as known to the authentication mount.
    #[arg(long)]
    pub name: String,
}

/// Select an entity.
#[derive(Args, Debug)]
pub struct EntityOpt {
    /// ID of the entity.
    pub entity: String,
}

/// Policies to assign.
#[derive(Args, Debug)]
pub struct PoliciesOpt {
    /// Name of a policy to assign (can be repeated).
    #[arg(long = "policy")]
    pub policies: Vec<String>,
}

/// Select an entity and the policies to assign to it.
#[derive(Args, Debug)]
pub struct SetPoliciesOpt {
    /// ID of the entity.
    pub entity: String,

    #[command(flatten)]
    pub policies: PoliciesOpt,
}

/// Execute the selected `wardenctl entity` command.
pub async fn run(globals: &Globals, cmd: &EntityCli) -> Result<i32> {
    let context = &globals.context;
    let entities = globals.entities().await?;
    match &cmd.command {
        EntityCmd::AliasAttach(opt) => {
            entities
                .attach_alias(context, &opt.entity, &opt.mount, &opt.name)
                .await?;
            println!("Alias attached to entity '{}'.", opt.entity);
        }
        EntityCmd::AliasDetach(opt) => {
            entities
                .detach_alias(context, &opt.entity, &opt.mount, &opt.name)
                .await?;
            println!("Alias detached from entity '{}'.", opt.entity);
        }
        EntityCmd::Create(opt) => {
            let id = entities
                .create_entity(context, opt.policies.clone())
                .await?;
            let entity = entities.get_entity(context, &id).await?;
            crate::output::json(&entity)?;
        }
        EntityCmd::Delete(opt) => {
            entities.delete_entity(context, &opt.entity).await?;
            println!("Entity '{}' deleted.", opt.entity);
        }
        EntityCmd::Get(opt) => {
            let entity = entities.get_entity(context, &opt.entity).await?;
            crate::output::json(&entity)?;
        }
        EntityCmd::Policies(opt) => {
            entities
                .set_policies(context, &opt.entity, opt.policies.policies.clone())
                .await?;
            let entity = entities.get_entity(context, &opt.entity).await?;
            crate::output::json(&entity)?;
        }
    };
    Ok(0)
}
