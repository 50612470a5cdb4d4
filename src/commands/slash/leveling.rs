//! # Leveling Commands
//!
//! Definition for /rank.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_rank_command()]
}

fn create_rank_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("rank")
        .description("Show a user's level and experience")
        .create_option(|option| {
            option
                .name("user")
                .description("The user to look up (defaults to you)")
                .kind(CommandOptionType::User)
                .required(false)
        });
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rank_command() {
        let commands = create_commands();
        assert_eq!(commands.len(), 1);
        let name = commands[0].0.get("name").unwrap().as_str().unwrap();
        assert_eq!(name, "rank");
    }
}
