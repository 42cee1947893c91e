//! An interactive duel between a human and a strategy.

use std::{
    io::{self, BufRead, Write},
    thread,
    time::Duration,
};

use rand::{rngs::StdRng, Rng, SeedableRng};

use bullcow_rs::{
    strategy::{Code, History, Secret},
    BullcowError, Strategy,
};

/// Configuration for one duel.
#[derive(Debug)]
pub struct DuelConfig {
    /// The strategy playing the other side.
    pub strategy: Box<dyn Strategy>,
    /// Seed for the opponent's randomness.
    pub seed: Option<u64>,
    /// Overrides the opponent's randomly drawn secret.
    pub engine_secret: Option<Code>,
    /// How long the opponent pretends to think before guessing.
    pub thinking_delay: Duration,
}

impl DuelConfig {
    /// Creates a duel against `strategy` with no seed and no delay.
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        DuelConfig {
            strategy,
            seed: None,
            engine_secret: None,
            thinking_delay: Duration::ZERO,
        }
    }
}

enum Entry {
    Code(Code),
    Quit,
}

fn read_code(
    prompt: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<Entry> {
    loop {
        write!(output, "{}", prompt)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Entry::Quit);
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return Ok(Entry::Quit);
        }
        if line.is_empty() {
            continue;
        }

        match Code::from_str(line) {
            Ok(code) => return Ok(Entry::Code(code)),
            Err(BullcowError::Code { kind }) => {
                writeln!(output, "That won't work: {}. Try again.", kind)?
            }
            Err(e) => writeln!(output, "That won't work: {}. Try again.", e)?,
        }
    }
}

/// Runs a duel to completion over the given input and output.
///
/// The human enters a secret, the opponent draws one, and the two take
/// alternating guesses at each other's codes. Entering `quit` (or closing
/// the input) concedes at any prompt.
pub fn run(config: DuelConfig, mut input: impl BufRead, mut output: impl Write) -> io::Result<()> {
    let mut rng: StdRng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    writeln!(
        output,
        "Bulls and Cows: pick a code of three distinct digits, then take turns\n\
         guessing. Bulls are right digits in the right spot, cows are right\n\
         digits in the wrong spot. Type quit at any prompt to concede."
    )?;

    let human_secret = match read_code("Pick your secret code: ", &mut input, &mut output)? {
        Entry::Code(code) => code,
        Entry::Quit => return Ok(()),
    };

    let engine_secret = config
        .engine_secret
        .unwrap_or_else(|| Code::random(&mut rng));

    let human_target = Secret::new(human_secret);
    let engine_target = Secret::new(engine_secret);

    let mut history = History::new();
    let mut humans_turn = rng.gen_bool(0.5);

    writeln!(
        output,
        "Secret codes locked. {}",
        if humans_turn {
            "You start."
        } else {
            "Opponent starts."
        }
    )?;

    loop {
        if humans_turn {
            let guess = match read_code("Your guess: ", &mut input, &mut output)? {
                Entry::Code(code) => code,
                Entry::Quit => {
                    writeln!(output, "You concede. The code was {}.", engine_secret)?;
                    return Ok(());
                }
            };

            let feedback = engine_target.check(&guess);
            writeln!(output, "{}", feedback)?;

            if feedback.is_win() {
                writeln!(output, "You cracked the code! You win.")?;
                return Ok(());
            }
        } else {
            writeln!(output, "Opponent is thinking...")?;
            output.flush()?;
            thread::sleep(config.thinking_delay);

            let mv = config.strategy.guess(&history, &mut rng);
            let feedback = human_target.check(&mv.code);
            history.record(mv.code, feedback);

            writeln!(output, "Opponent: {}", mv.banter)?;
            writeln!(output, "Opponent guesses {}. {}", mv.code, feedback)?;

            if feedback.is_win() {
                writeln!(
                    output,
                    "Opponent cracked your code ({}). You lose.",
                    human_target.reveal()
                )?;
                return Ok(());
            }
        }

        humans_turn = !humans_turn;
    }
}

#[cfg(test)]
mod test {
    use std::fmt::Display;
    use std::io::Cursor;

    use rand::RngCore;

    use bullcow_rs::strategy::Move;

    use super::*;

    /// Guesses the same code every turn, forever.
    #[derive(Debug)]
    struct Fixed(Code);

    impl Strategy for Fixed {
        fn guess(&self, _history: &History, _rng: &mut dyn RngCore) -> Move {
            Move::new(self.0, "Same as always.")
        }

        fn version(&self) -> &'static str {
            "0.0.1"
        }
    }

    impl Display for Fixed {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Fixed")
        }
    }

    fn fixed(code: &str) -> Box<dyn Strategy> {
        Box::new(Fixed(Code::from_str(code).unwrap()))
    }

    fn config(strategy: Box<dyn Strategy>, engine_secret: &str) -> DuelConfig {
        let mut config = DuelConfig::new(strategy);
        config.seed = Some(9);
        config.engine_secret = Some(Code::from_str(engine_secret).unwrap());
        config
    }

    fn play(config: DuelConfig, script: &str) -> String {
        let mut output = Vec::new();
        run(config, Cursor::new(script.as_bytes()), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn quitting_at_the_secret_prompt_ends_cleanly() {
        let transcript = play(config(fixed("012"), "147"), "quit\n");
        assert!(transcript.contains("Pick your secret code"));
        assert!(!transcript.contains("Secret codes locked"));
    }

    #[test]
    fn closed_input_counts_as_quitting() {
        let transcript = play(config(fixed("012"), "147"), "");
        assert!(transcript.contains("Pick your secret code"));
    }

    #[test]
    fn rejected_secrets_reprompt() {
        let transcript = play(config(fixed("012"), "147"), "33\n3a9\n339\nquit\n");
        assert_eq!(transcript.matches("That won't work").count(), 3);
    }

    #[test]
    fn cracking_the_opponents_code_wins() {
        // Fixed(012) never guesses the human's secret, so the human's 147
        // settles it no matter who starts.
        let transcript = play(config(fixed("012"), "147"), "398\n147\n");
        assert!(transcript.contains("code cracked"));
        assert!(transcript.contains("You cracked the code! You win."));
    }

    #[test]
    fn losing_reveals_your_code() {
        // The opponent guesses the human's secret on its first turn.
        let transcript = play(config(fixed("398"), "147"), "398\n012\n012\n012\n");
        assert!(transcript.contains("Same as always."));
        assert!(transcript.contains("Opponent cracked your code (398). You lose."));
    }

    #[test]
    fn conceding_mid_game_reveals_the_opponents_code() {
        let transcript = play(config(fixed("012"), "147"), "398\nquit\n");
        assert!(transcript.contains("You concede. The code was 147."));
    }
}
