//! Reader input lines and the engine events they stand for.

use storyweave_navigation::domain::input::{ChoiceRef, InputEvent};
use thiserror::Error;

/// What a line of input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Forward to the engine.
    Event(InputEvent),
    /// Print the command list.
    Help,
    /// Leave the reader.
    Quit,
}

/// A line that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Choices are numbered from 1.
    #[error("choices are numbered from 1")]
    ZeroChoice,
    /// `download` needs a reward id.
    #[error("name the reward to download, e.g. `download letter`")]
    MissingRewardId,
}

/// Short help shown on request.
pub const HELP: &str = "\
Commands:
  <number>          pick a choice by its number
  <text>            pick the choice with that text
  start | s         begin reading
  continue | c      go on from a final scene
  restart | r       start over from the first scene
  home | h          return to the home page
  retry             try again after an error
  download <id>     download a reward after an ending
  help | ?          show this list
  quit | q          leave";

/// Parses one input line.
///
/// An empty line means "start" so that pressing Enter on the home page
/// begins the story.
///
/// # Errors
///
/// Returns `CommandError` for `0` or a `download` without an id.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_ascii_lowercase().as_str() {
        "" | "start" | "s" => Command::Event(InputEvent::Start),
        "continue" | "c" => Command::Event(InputEvent::Continue),
        "restart" | "r" => Command::Event(InputEvent::Restart),
        "home" | "h" => Command::Event(InputEvent::GoHome),
        "retry" => Command::Event(InputEvent::Retry),
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        "download" | "d" => {
            if rest.is_empty() {
                return Err(CommandError::MissingRewardId);
            }
            Command::Event(InputEvent::DownloadReward(rest.to_owned()))
        }
        _ => match line.parse::<usize>() {
            Ok(0) => return Err(CommandError::ZeroChoice),
            Ok(number) => Command::Event(InputEvent::SelectChoice(ChoiceRef::Index(number - 1))),
            Err(_) => Command::Event(InputEvent::SelectChoice(ChoiceRef::Text(line.to_owned()))),
        },
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_are_one_based() {
        assert_eq!(
            parse("2").unwrap(),
            Command::Event(InputEvent::SelectChoice(ChoiceRef::Index(1)))
        );
        assert_eq!(parse("0").unwrap_err(), CommandError::ZeroChoice);
    }

    #[test]
    fn test_free_text_selects_by_text() {
        assert_eq!(
            parse("  Open it ").unwrap(),
            Command::Event(InputEvent::SelectChoice(ChoiceRef::Text("Open it".into())))
        );
    }

    #[test]
    fn test_empty_line_starts() {
        assert_eq!(parse("").unwrap(), Command::Event(InputEvent::Start));
    }

    #[test]
    fn test_keywords_ignore_case() {
        assert_eq!(parse("HOME").unwrap(), Command::Event(InputEvent::GoHome));
        assert_eq!(parse("r").unwrap(), Command::Event(InputEvent::Restart));
        assert_eq!(parse("Quit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_download_needs_reward_id() {
        assert_eq!(
            parse("download letter").unwrap(),
            Command::Event(InputEvent::DownloadReward("letter".into()))
        );
        assert_eq!(
            parse("download").unwrap_err(),
            CommandError::MissingRewardId
        );
    }
}
