//! # Info Commands
//!
//! Definitions for /role and /server lookups.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_role_command(), create_server_command()]
}

fn create_role_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("role")
        .description("Show detailed information about a role")
        .create_option(|option| {
            option
                .name("role")
                .description("The role to inspect")
                .kind(CommandOptionType::Role)
                .required(true)
        });
    command
}

fn create_server_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("server")
        .description("Show information about this server");
    command
}
