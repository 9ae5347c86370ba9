//! Inspect, delete or manipulate groups and group aliases.
use anyhow::Result;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

use warden_models::GroupType;
use warden_models::Member;

use super::entity::PoliciesOpt;
use crate::Globals;

/// Inspect, delete or manipulate groups and group aliases.
#[derive(Debug, Parser)]
pub struct GroupCli {
    /// Select the `wardenctl group` command to run.
    #[command(subcommand)]
    pub command: GroupCmd,
}

/// Possible group commands to run.
#[derive(Debug, Subcommand)]
pub enum GroupCmd {
    /// Bind an external group name under a mount to an external group.
    AliasCreate(GroupAliasCreateOpt),

    /// Delete a group alias.
    AliasDelete(GroupAliasOpt),

    /// Lookup the group alias for an external group name under a mount.
    AliasGet(GroupAliasOpt),

    /// Create a new group.
    Create(GroupCreateOpt),

    /// Delete a group and all its aliases.
    Delete(GroupOpt),

    /// Lookup details for a group.
    Get(GroupOpt),

    /// List all groups.
    List,

    /// Add an entity or a group to the members of an internal group.
    MemberAdd(MemberOpt),

    /// Remove an entity or a group from the members of an internal group.
    MemberRemove(MemberOpt),

    /// Replace the policies assigned directly to a group.
    Policies(SetPoliciesOpt),
}

/// Kind of group to create.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GroupTypeOpt {
    /// Members are inferred from group aliases matching authentication responses.
    External,

    /// Members are managed explicitly.
    Internal,
}

impl From<GroupTypeOpt> for GroupType {
    fn from(value: GroupTypeOpt) -> Self {
        match value {
            GroupTypeOpt::External => GroupType::External,
            GroupTypeOpt::Internal => GroupType::Internal,
        }
    }
}

/// Select a group alias to create.
#[derive(Args, Debug)]
pub struct GroupAliasCreateOpt {
    /// ID of the external group the alias targets.
    pub group: String,

    #[command(flatten)]
    pub alias: GroupAliasOpt,
}

/// Select a group alias.
#[derive(Args, Debug)]
pub struct GroupAliasOpt {
    /// ID of the authentication mount the alias is bound to.
    #[arg(long)]
    pub mount: String,

    /// Name of the group as known to the authentication mount.
    #[arg(long)]
    pub name: String,
}

/// Details of a new group.
#[derive(Args, Debug)]
pub struct GroupCreateOpt {
    /// Kind of group to create.
    #[arg(long = "type", value_enum)]
    pub group_type: GroupTypeOpt,

    #[command(flatten)]
    pub policies: PoliciesOpt,
}

/// Select a group.
#[derive(Args, Debug)]
pub struct GroupOpt {
    /// ID of the group.
    pub group: String,
}

/// Select an internal group and one of its members.
#[derive(Args, Debug)]
pub struct MemberOpt {
    /// ID of the internal group.
    pub group: String,

    #[command(flatten)]
    pub member: MemberSelect,
}

/// Select an entity or a group as a member.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct MemberSelect {
    /// ID of a member entity.
    #[arg(long = "entity")]
    pub entity: Option<String>,

    /// ID of a member group.
    #[arg(long = "member-group")]
    pub member_group: Option<String>,
}

impl MemberSelect {
    fn member(&self) -> Member {
        match (&self.entity, &self.member_group) {
            (Some(entity), _) => Member::Entity(entity.clone()),
            (None, Some(group)) => Member::Group(group.clone()),
            (None, None) => unreachable!("clap requires one member argument"),
        }
    }
}

/// Select a group and the policies to assign to it.
#[derive(Args, Debug)]
pub struct SetPoliciesOpt {
    /// ID of the group.
    pub group: String,

    #[command(flatten)]
    pub policies: PoliciesOpt,
}

/// Execute the selected `wardenctl group` command.
pub async fn run(globals: &Globals, cmd: &GroupCli) -> Result<i32> {
    let context = &globals.context;
    let groups = globals.groups().await?;
    match &cmd.command {
        GroupCmd::AliasCreate(opt) => {
            let alias = groups
                .create_group_alias(context, &opt.group, &opt.alias.mount, &opt.alias.name)
                .await?;
            crate::output::json(&alias)?;
        }
        GroupCmd::AliasDelete(opt) => {
            groups
                .delete_group_alias(context, &opt.mount, &opt.name)
                .await?;
            println!("Group alias '{}' for mount '{}' deleted.", opt.name, opt.mount);
        }
        GroupCmd::AliasGet(opt) => {
            let alias = groups
                .lookup_group_alias(context, &opt.mount, &opt.name)
                .await?;
            crate::output::json(&alias)?;
        }
        GroupCmd::Create(opt) => {
            let group_type = GroupType::from(opt.group_type);
            let id = groups
                .create_group(context, group_type, opt.policies.policies.clone())
                .await?;
            let group = groups.get_group(context, &id).await?;
            crate::output::json(&group)?;
        }
        GroupCmd::Delete(opt) => {
            groups.delete_group(context, &opt.group).await?;
            println!("Group '{}' deleted.", opt.group);
        }
        GroupCmd::Get(opt) => {
            let group = groups.get_group(context, &opt.group).await?;
            crate::output::json(&group)?;
        }
        GroupCmd::List => {
            let list = groups.list_groups(context).await?;
            crate::output::json(&list)?;
        }
        GroupCmd::MemberAdd(opt) => {
            groups
                .add_member(context, &opt.group, opt.member.member())
                .await?;
            let group = groups.get_group(context, &opt.group).await?;
            crate::output::json(&group)?;
        }
        GroupCmd::MemberRemove(opt) => {
            groups
                .remove_member(context, &opt.group, opt.member.member())
                .await?;
            let group = groups.get_group(context, &opt.group).await?;
            crate::output::json(&group)?;
        }
        GroupCmd::Policies(opt) => {
            groups
                .set_policies(context, &opt.group, opt.policies.policies.clone())
                .await?;
            let group = groups.get_group(context, &opt.group).await?;
            crate::output::json(&group)?;
        }
    };
    Ok(0)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use warden_models::Member;

    use super::GroupCmd;
    use crate::cmd::Command;
    use crate::Cli;

    fn group_cmd(args: &[&str]) -> GroupCmd {
        let mut argv = vec!["wardenctl", "group"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Group(cmd) => cmd.command,
            _ => panic!("expected a group command"),
        }
    }

    #[test]
    fn parse_member_add() {
        match group_cmd(&["member-add", "g1", "--entity", "e1"]) {
            GroupCmd::MemberAdd(opt) => {
                assert_eq!(opt.group, "g1");
                assert_eq!(opt.member.member(), Member::Entity("e1".into()));
            }
            _ => panic!("expected member-add"),
        }
        match group_cmd(&["member-remove", "g1", "--member-group", "g2"]) {
            GroupCmd::MemberRemove(opt) => {
                assert_eq!(opt.member.member(), Member::Group("g2".into()));
            }
            _ => panic!("expected member-remove"),
        }
    }

    #[test]
    fn member_selection_is_exclusive() {
        let argv = [
            "wardenctl", "group", "member-add", "g1", "--entity", "e1", "--member-group", "g2",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
        let argv = ["wardenctl", "group", "member-add", "g1"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn parse_create() {
        match group_cmd(&["create", "--type", "external", "--policy", "p5"]) {
            GroupCmd::Create(opt) => {
                assert!(matches!(opt.group_type, super::GroupTypeOpt::External));
                assert_eq!(opt.policies.policies, ["p5"]);
            }
            _ => panic!("expected create"),
        }
    }
}
