#![forbid(unsafe_code)]

use crate::error::TodosError;
use crate::task::model::Action;

/// Parses one line of the command grammar.
///
/// The first character selects the action and the argument is whatever
/// follows the first two characters, whatever the second one is.
/// Returns `Ok(None)` for an unrecognised leading character.
pub fn parse(cmd: &str) -> Result<Option<Action>, TodosError> {
    let first = cmd.chars().next().ok_or(TodosError::EmptyCommand)?;
    let argument = extract_argument(cmd);

    let action = match first {
        '+' => Action::Add {
            description: argument.to_owned(),
        },
        'o' => Action::Update {
            number: parse_number(argument)?,
            done: false,
        },
        'x' => Action::Update {
            number: parse_number(argument)?,
            done: true,
        },
        _ => return Ok(None),
    };
    Ok(Some(action))
}

fn extract_argument(cmd: &str) -> &str {
    match cmd.char_indices().nth(2) {
        Some((idx, _)) => &cmd[idx..],
        None => "",
    }
}

fn parse_number(argument: &str) -> Result<usize, TodosError> {
    argument
        .trim()
        .parse::<usize>()
        .map_err(|source| TodosError::InvalidNumber {
            input: argument.to_owned(),
            source,
        })
}
