//! # Image Commands
//!
//! Definitions for the SFW reaction commands and the /nsfw fetcher.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.0: /nsfw category choices
//! - 1.0.0: Initial implementation

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

use crate::features::express::NSFW_ENDPOINTS;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_simple_command("neko", "Fetch a random neko picture"),
        create_simple_command("hug", "Send a hug"),
        create_simple_command("pat", "Send a headpat"),
        create_nsfw_command(),
    ]
}

fn create_simple_command(name: &str, description: &str) -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command.name(name).description(description);
    command
}

fn create_nsfw_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("nsfw")
        .description("Fetch a random NSFW image (age-restricted channels only)")
        .create_option(|option| {
            option
                .name("category")
                .description("The image category (random when omitted)")
                .kind(CommandOptionType::String)
                .required(false);
            for endpoint in NSFW_ENDPOINTS {
                option.add_string_choice(endpoint, endpoint);
            }
            option
        });
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_image_commands() {
        let commands = create_commands();
        assert_eq!(commands.len(), 4);

        let names: Vec<&str> = commands
            .iter()
            .map(|cmd| cmd.0.get("name").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["neko", "hug", "pat", "nsfw"]);
    }

    #[test]
    fn test_nsfw_command_has_category_choices() {
        let commands = create_commands();
        let nsfw = &commands[3];
        let options = nsfw.0.get("options").unwrap().as_array().unwrap();
        assert_eq!(options.len(), 1);

        let choices = options[0].get("choices").unwrap().as_array().unwrap();
        assert_eq!(choices.len(), NSFW_ENDPOINTS.len());
    }
}
