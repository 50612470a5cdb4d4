//! # Owner Commands
//!
//! Definitions for /botban and /reload. Both are restricted to bot owners at
//! dispatch time; the ADMINISTRATOR default permission just hides them from
//! everyone else in the guild UI.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.5.0
//!
//! ## Changelog
//! - 1.1.0: /botban list action
//! - 1.0.0: Initial implementation

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::permissions::Permissions;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_botban_command(), create_reload_command()]
}

fn create_botban_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("botban")
        .description("Manage the bot-level ban lists")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .create_option(|option| {
            option
                .name("kind")
                .description("Which ban list to operate on")
                .kind(CommandOptionType::String)
                .required(true)
                .add_string_choice("guild", "guild")
                .add_string_choice("user", "user")
        })
        .create_option(|option| {
            option
                .name("action")
                .description("What to do with the list")
                .kind(CommandOptionType::String)
                .required(true)
                .add_string_choice("ban", "ban")
                .add_string_choice("unban", "unban")
                .add_string_choice("list", "list")
        })
        .create_option(|option| {
            option
                .name("targets")
                .description("Space-separated IDs or names to (un)ban")
                .kind(CommandOptionType::String)
                .required(false)
                .max_length(2000)
        });
    command
}

fn create_reload_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("reload")
        .description("Rebuild the command registry and restore stored sessions")
        .default_member_permissions(Permissions::ADMINISTRATOR);
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_owner_commands() {
        let commands = create_commands();
        assert_eq!(commands.len(), 2);

        let names: Vec<&str> = commands
            .iter()
            .map(|cmd| cmd.0.get("name").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["botban", "reload"]);
    }

    #[test]
    fn test_botban_action_choices() {
        let commands = create_commands();
        let botban = &commands[0];
        let options = botban.0.get("options").unwrap().as_array().unwrap();
        assert_eq!(options.len(), 3);

        let action = options
            .iter()
            .find(|opt| opt.get("name").unwrap().as_str().unwrap() == "action")
            .unwrap();
        let choices = action.get("choices").unwrap().as_array().unwrap();
        assert_eq!(choices.len(), 3);
    }
}
