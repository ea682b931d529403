use std::fmt::Display;

use kestrel_lib::transposition_table::EvictionPolicy;
use shakmaty::Color;

pub const HASH_MIN_MB: usize = 1;
pub const HASH_MAX_MB: usize = 4096;
pub const QUIESCENCE_DEPTH_MAX: i32 = 32;

// kept back from the clock when the remaining time is split over movestogo
const MOVESTOGO_MARGIN_MS: u64 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UciOption {
    Hash(usize),
    QuiescenceDepth(i32),
    Eviction(EvictionPolicy),
}

impl UciOption {
    pub fn parse(name: &str, value: &str) -> Result<Self, UciParseError> {
        let invalid = || {
            UciParseError::Other(format!(
                "Invalid value for {name} in UCI setoption command: {value}"
            ))
        };

        match name.to_lowercase().as_str() {
            "hash" => value
                .parse::<usize>()
                .ok()
                .filter(|mb| (HASH_MIN_MB..=HASH_MAX_MB).contains(mb))
                .map(UciOption::Hash)
                .ok_or_else(invalid),
            "quiescencedepth" => value
                .parse::<i32>()
                .ok()
                .filter(|depth| (0..=QUIESCENCE_DEPTH_MAX).contains(depth))
                .map(UciOption::QuiescenceDepth)
                .ok_or_else(invalid),
            "eviction" => value
                .parse::<EvictionPolicy>()
                .map(UciOption::Eviction)
                .map_err(|_| invalid()),
            other => Err(UciParseError::Other(format!(
                "Unknown option in UCI setoption command: {other}"
            ))),
        }
    }
}

pub fn print_uci_options(hash_mb: usize, quiescence_depth: i32, eviction: EvictionPolicy) {
    println!("option name Hash type spin default {hash_mb} min {HASH_MIN_MB} max {HASH_MAX_MB}");
    println!(
        "option name QuiescenceDepth type spin default {quiescence_depth} min 0 max {QUIESCENCE_DEPTH_MAX}"
    );
    println!(
        "option name Eviction type combo default {eviction} var {} var {}",
        EvictionPolicy::Oldest,
        EvictionPolicy::ShallowestOfOldest
    );
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u64>,
    pub depth: Option<usize>,
    pub movetime: Option<u64>,
}

impl GoParams {
    /// Milliseconds to spend on this move, `None` when no clock was given
    pub fn time_budget_ms(&self, side: Color) -> Option<u64> {
        if let Some(movetime) = self.movetime {
            return Some(movetime);
        }

        let (time, inc) = match side {
            Color::White => (self.wtime, self.winc),
            Color::Black => (self.btime, self.binc),
        };

        match (self.movestogo, time) {
            (Some(n), Some(time)) if n > 0 => Some(time.saturating_sub(MOVESTOGO_MARGIN_MS) / n),
            _ => move_time(time, inc),
        }
    }
}

fn move_time(time_millis: Option<u64>, inc_millis: Option<u64>) -> Option<u64> {
    let (time, inc) = match (time_millis, inc_millis) {
        (None, None) => return None,
        (t, i) => (t.unwrap_or(0), i.unwrap_or(0)),
    };
    if time < inc {
        Some(time / 20)
    } else {
        Some(time / 20 + inc / 2)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    SetOption(UciOption),
    UciNewGame,
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    Go(GoParams),
    Eval,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum UciParseError {
    Empty,
    Other(String),
}

impl Display for UciParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                UciParseError::Empty => "",
                UciParseError::Other(reason) => reason,
            }
        )
    }
}
impl std::error::Error for UciParseError {}

macro_rules! parse_uci_go_value {
    ($words: ident, $name:ident, $type:ty) => {
        let $name = {
            if let Some(p) = $words.iter().position(|&w| w == stringify!($name)) {
                match $words.get(p + 1) {
                    Some(n) => Some(n.parse::<$type>().map_err(|_| {
                        UciParseError::Other(format!(
                            concat!(
                                "Invalid value for ",
                                stringify!($name),
                                " in UCI go command: {}"
                            ),
                            n
                        ))
                    })?),
                    None => {
                        return Err(UciParseError::Other(String::from(concat!(
                            "Missing token in UCI go command: no value specified for ",
                            stringify!($name)
                        ))))
                    }
                }
            } else {
                None
            }
        };
    };
}

pub fn parse_uci_command<T: AsRef<str>>(cmd: T) -> Result<UciCommand, UciParseError> {
    let words = cmd.as_ref().split_whitespace().collect::<Vec<&str>>();

    use UciCommand::*;

    let Some(word) = words.first() else {
        return Err(UciParseError::Empty);
    };

    match word.to_lowercase().as_str() {
        "uci" => Ok(Uci),
        "isready" => Ok(IsReady),
        "ucinewgame" => Ok(UciNewGame),
        "setoption" => {
            let name = match words.get(1).copied() {
                Some("name") => words.get(2).copied().ok_or_else(|| {
                    UciParseError::Other(String::from(
                        "Missing token in UCI setoption command: no name specified",
                    ))
                })?,
                Some(other) => {
                    return Err(UciParseError::Other(format!(
                        "Unexpected token in UCI setoption command: expected 'name', found {other}"
                    )))
                }
                None => {
                    return Err(UciParseError::Other(String::from(
                        "Missing token in UCI setoption command: 'name' not found",
                    )))
                }
            };
            let value = match words.get(3).copied() {
                Some("value") => words.get(4).copied().ok_or_else(|| {
                    UciParseError::Other(String::from(
                        "Missing token in UCI setoption command: no value specified",
                    ))
                })?,
                Some(other) => {
                    return Err(UciParseError::Other(format!(
                        "Unexpected token in UCI setoption command: expected 'value', found {other}"
                    )))
                }
                None => {
                    return Err(UciParseError::Other(String::from(
                        "Missing token in UCI setoption command: 'value' not found",
                    )))
                }
            };
            UciOption::parse(name, value).map(SetOption)
        }
        "position" => {
            let moves_at = words.iter().position(|&w| w == "moves");
            let fen = match words.get(1).copied() {
                Some("startpos") => None,
                Some("fen") => {
                    let fen = words[2..moves_at.unwrap_or(words.len())].join(" ");
                    if fen.is_empty() {
                        return Err(UciParseError::Other(String::from(
                            "Missing token in UCI position command: no FEN specified",
                        )));
                    }
                    Some(fen)
                }
                Some(other) => {
                    return Err(UciParseError::Other(format!(
                        "Expected 'startpos' or 'fen' in UCI position command, found {other}"
                    )))
                }
                None => {
                    return Err(UciParseError::Other(String::from(
                        "Missing token in UCI position command",
                    )))
                }
            };
            let moves = match moves_at {
                Some(p) => words[p + 1..].iter().map(|m| m.to_string()).collect(),
                None => Vec::new(),
            };
            Ok(Position { fen, moves })
        }
        "go" => {
            parse_uci_go_value!(words, wtime, u64);
            parse_uci_go_value!(words, btime, u64);
            parse_uci_go_value!(words, winc, u64);
            parse_uci_go_value!(words, binc, u64);
            parse_uci_go_value!(words, movestogo, u64);
            parse_uci_go_value!(words, depth, usize);
            parse_uci_go_value!(words, movetime, u64);

            Ok(Go(GoParams {
                wtime,
                btime,
                winc,
                binc,
                movestogo,
                depth,
                movetime,
            }))
        }
        "eval" => Ok(Eval),
        "quit" => Ok(Quit),
        other => Err(UciParseError::Other(format!("Unknown UCI command: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line() {
        assert_eq!(parse_uci_command("   "), Err(UciParseError::Empty));
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse_uci_command("uci"), Ok(UciCommand::Uci));
        assert_eq!(parse_uci_command("isready"), Ok(UciCommand::IsReady));
        assert_eq!(parse_uci_command("ucinewgame"), Ok(UciCommand::UciNewGame));
        assert_eq!(parse_uci_command("quit"), Ok(UciCommand::Quit));
        assert!(matches!(
            parse_uci_command("stop please"),
            Err(UciParseError::Other(_))
        ));
    }

    #[test]
    fn setoption() {
        assert_eq!(
            parse_uci_command("setoption name Hash value 128"),
            Ok(UciCommand::SetOption(UciOption::Hash(128)))
        );
        assert_eq!(
            parse_uci_command("setoption name QuiescenceDepth value 0"),
            Ok(UciCommand::SetOption(UciOption::QuiescenceDepth(0)))
        );
        assert_eq!(
            parse_uci_command("setoption name Eviction value Oldest"),
            Ok(UciCommand::SetOption(UciOption::Eviction(EvictionPolicy::Oldest)))
        );
        assert!(parse_uci_command("setoption name Eviction value Newest").is_err());
        assert!(parse_uci_command("setoption name Hash value 0").is_err());
        assert!(parse_uci_command("setoption name Hash").is_err());
        assert!(parse_uci_command("setoption name Threads value 4").is_err());
    }

    #[test]
    fn position() {
        assert_eq!(
            parse_uci_command("position startpos moves e2e4 e7e5"),
            Ok(UciCommand::Position {
                fen: None,
                moves: vec![String::from("e2e4"), String::from("e7e5")],
            })
        );
        assert_eq!(
            parse_uci_command("position fen 6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1"),
            Ok(UciCommand::Position {
                fen: Some(String::from("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1")),
                moves: Vec::new(),
            })
        );
        assert_eq!(
            parse_uci_command("position fen 6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1 moves a1a8"),
            Ok(UciCommand::Position {
                fen: Some(String::from("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1")),
                moves: vec![String::from("a1a8")],
            })
        );
        assert!(parse_uci_command("position fen").is_err());
        assert!(parse_uci_command("position somewhere").is_err());
    }

    #[test]
    fn go() {
        assert_eq!(
            parse_uci_command("go wtime 60000 btime 50000 winc 1000 binc 500"),
            Ok(UciCommand::Go(GoParams {
                wtime: Some(60_000),
                btime: Some(50_000),
                winc: Some(1000),
                binc: Some(500),
                ..Default::default()
            }))
        );
        assert_eq!(
            parse_uci_command("go depth 4"),
            Ok(UciCommand::Go(GoParams {
                depth: Some(4),
                ..Default::default()
            }))
        );
        assert!(parse_uci_command("go movetime").is_err());
        assert!(parse_uci_command("go depth deep").is_err());
    }

    #[test]
    fn time_allocation() {
        let go = GoParams {
            wtime: Some(60_000),
            btime: Some(30_000),
            winc: Some(1000),
            binc: Some(0),
            ..Default::default()
        };
        assert_eq!(go.time_budget_ms(Color::White), Some(3500));
        assert_eq!(go.time_budget_ms(Color::Black), Some(1500));

        let movestogo = GoParams {
            movestogo: Some(10),
            ..go
        };
        assert_eq!(movestogo.time_budget_ms(Color::White), Some(5995));

        let fixed = GoParams {
            movetime: Some(250),
            ..go
        };
        assert_eq!(fixed.time_budget_ms(Color::Black), Some(250));

        assert_eq!(GoParams::default().time_budget_ms(Color::White), None);

        // increment larger than the clock
        assert_eq!(move_time(Some(200), Some(1000)), Some(10));
    }
}
