use anyhow::Result;

#[derive(Debug, PartialEq)]
pub enum Command {
    Times,
    Lanes,
    SetTimeWindow(String),
    SetInitialLane(String),
    SetExitLane(String),
    List,
    /// 1-based positions in the current vehicle list
    Select(Vec<usize>),
    Plot,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  times                 list the time windows
  lanes                 list the lanes
  time <window>         pick a time window, like 0-60 or all
  initial <lane>        only vehicles starting in this lane (or all)
  exit <lane>           only vehicles ending in this lane (or all)
  list                  show the matching vehicles
  select <n> [<n> ...]  pick vehicles by their position in the list
  plot                  draw the selected vehicles
  help                  show this message
  quit                  exit";

/// None for a blank line
pub fn parse(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let cmd = match words.next() {
        Some(cmd) => cmd,
        None => return Ok(None),
    };
    let args: Vec<&str> = words.collect();

    let one_arg = |args: &[&str]| -> Result<String> {
        match args {
            [arg] => Ok(arg.to_string()),
            _ => bail!("{cmd} takes exactly one argument"),
        }
    };
    let no_args = |args: &[&str]| -> Result<()> {
        if !args.is_empty() {
            bail!("{cmd} doesn't take any arguments");
        }
        Ok(())
    };

    let command = match cmd {
        "times" => no_args(&args).map(|_| Command::Times)?,
        "lanes" => no_args(&args).map(|_| Command::Lanes)?,
        "time" => Command::SetTimeWindow(one_arg(&args)?),
        "initial" => Command::SetInitialLane(one_arg(&args)?),
        "exit" => Command::SetExitLane(one_arg(&args)?),
        "list" => no_args(&args).map(|_| Command::List)?,
        "select" => {
            if args.is_empty() {
                bail!("select needs at least one vehicle");
            }
            let mut positions = Vec::new();
            // Allow "1,2,3" as well as "1 2 3"
            for arg in args.iter().flat_map(|arg| arg.split(',')) {
                if arg.is_empty() {
                    continue;
                }
                match arg.parse::<usize>() {
                    Ok(n) if n > 0 => positions.push(n),
                    _ => bail!("{arg:?} isn't a position in the vehicle list"),
                }
            }
            Command::Select(positions)
        }
        "plot" => no_args(&args).map(|_| Command::Plot)?,
        "help" => Command::Help,
        "quit" | "q" => Command::Quit,
        _ => bail!("unknown command {cmd:?}, try help"),
    };
    Ok(Some(command))
}
