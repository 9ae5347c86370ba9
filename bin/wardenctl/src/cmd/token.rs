//! Issue, inspect, renew and revoke tokens.
use anyhow::Result;
use clap::Args;
use clap::Parser;
use clap::Subcommand;

use warden_tokens::AuthResponse;
use warden_tokens::IssueRequest;

use crate::Globals;

/// Issue, inspect, renew and revoke tokens.
#[derive(Debug, Parser)]
pub struct TokenCli {
    /// Select the `wardenctl token` command to run.
    #[command(subcommand)]
    pub command: TokenCmd,
}

/// Possible token commands to run.
#[derive(Debug, Subcommand)]
pub enum TokenCmd {
    /// Issue a token for an arbitrary entity, mount and set of policies.
    Issue(IssueOpt),

    /// Issue a token as an authentication method would after a successful login.
    Login(LoginOpt),

    /// Lookup a token and the policies it grants.
    Lookup(TokenOpt),

    /// Renew a token, refreshing its external group memberships.
    Renew(RenewOpt),

    /// Revoke a token.
    Revoke(TokenOpt),

    /// Remove revoked and expired tokens from the store.
    Tidy,
}

/// Details of a token to issue.
#[derive(Args, Debug)]
pub struct IssueOpt {
    /// ID of the entity to issue the token to.
    #[arg(long)]
    pub entity: Option<String>,

    /// External group names reported by the authentication mount (can be repeated).
    #[arg(long = "external-group")]
    pub external_groups: Vec<String>,

    /// ID of the authentication mount the external groups were reported under.
    #[arg(long)]
    pub mount: Option<String>,

    /// Issue a token that can not be renewed.
    #[arg(long = "no-renew")]
    pub no_renew: bool,

    /// Name of a policy to assign to the token (can be repeated).
    #[arg(long = "policy")]
    pub policies: Vec<String>,

    /// Lifetime of the token, in seconds.
    #[arg(long = "ttl")]
    pub ttl_sec: Option<u64>,
}

/// Details of an authenticated principal.
#[derive(Args, Debug)]
pub struct LoginOpt {
    /// External group names reported by the authentication mount (can be repeated).
    #[arg(long = "external-group")]
    pub external_groups: Vec<String>,

    /// ID of the authentication mount the principal authenticated with.
    #[arg(long)]
    pub mount: String,

    /// Name of a policy to assign to the token (can be repeated).
    #[arg(long = "policy")]
    pub policies: Vec<String>,

    /// Name of the principal as known to the authentication mount.
    #[arg(long)]
    pub principal: String,
}

/// Select a token to renew.
#[derive(Args, Debug)]
pub struct RenewOpt {
    /// ID of the token.
    pub token: String,

    /// Requested extension of the token lifetime, in seconds.
    #[arg(long = "increment")]
    pub increment_sec: Option<u64>,
}

/// Select a token.
#[derive(Args, Debug)]
pub struct TokenOpt {
    /// ID of the token.
    pub token: String,
}

/// Execute the selected `wardenctl token` command.
pub async fn run(globals: &Globals, cmd: &TokenCli) -> Result<i32> {
    let context = &globals.context;
    let tokens = globals.tokens().await?;
    match &cmd.command {
        TokenCmd::Issue(opt) => {
            let request = IssueRequest {
                entity_id: opt.entity.clone(),
                external_group_names: opt.external_groups.clone(),
                mount_id: opt.mount.clone(),
                policies: opt.policies.clone(),
                renewable: !opt.no_renew,
                ttl_sec: opt.ttl_sec,
            };
            let token = tokens.issue(context, request).await?;
            crate::output::json(&token)?;
        }
        TokenCmd::Login(opt) => {
            let auth = AuthResponse {
                external_group_names: opt.external_groups.clone(),
                mount_id: opt.mount.clone(),
                policies: opt.policies.clone(),
                principal_name: opt.principal.clone(),
            };
            let token = tokens.login(context, auth).await?;
            crate::output::json(&token)?;
        }
        TokenCmd::Lookup(opt) => {
            let lookup = tokens.lookup(context, &opt.token).await?;
            let report = serde_json::json!({
                "token": lookup.token,
                "token_policies": lookup.policies.token_policies,
                "identity_policies": lookup.policies.identity_policies,
                "policies": lookup.policies.policies(),
            });
            crate::output::json(&report)?;
        }
        TokenCmd::Renew(opt) => {
            let token = tokens.renew(context, &opt.token, opt.increment_sec).await?;
            crate::output::json(&token)?;
        }
        TokenCmd::Revoke(opt) => {
            tokens.revoke(context, &opt.token).await?;
            println!("Token '{}' revoked.", opt.token);
        }
        TokenCmd::Tidy => {
            let removed = tokens.tidy(context).await?;
            println!("Removed {} revoked or expired tokens.", removed);
        }
    };
    Ok(0)
}
