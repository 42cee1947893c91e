//! Evaluating and comparing strategies.

use std::{fmt::Display, io::Write, ops::Deref};

#[cfg(feature = "fancy")]
use comfy_table::{Cell, Color, ColumnConstraint, Row, Table, Width};
#[cfg(feature = "stats")]
use fishers_exact::FishersExactPvalues;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "stats")]
use crate::stats::{Tails, WelchsT};
use crate::{
    strategy::{Code, History, Strategy},
    Result,
};
#[cfg(feature = "stats")]
use crate::BullcowError;

/// A record of one strategy's games after a run of the
/// [test harness](crate::Harness).
///
/// Each entry pairs the secret that was posed with the full [`History`]
/// the strategy produced against it. This struct can provide statistics
/// about the games on its own, but it is recommended to produce a
/// [`Summary`] first to cache the computations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Perf {
    pub(crate) games: Vec<(Code, History)>,
    strategy_name: String,
}

impl Perf {
    /// Creates a new empty performance record.
    pub(crate) fn new(strat: &dyn Strategy) -> Self {
        Perf {
            games: Vec::new(),
            strategy_name: format!("{} v{}", strat, strat.version()),
        }
    }

    /// Gets the name of the strategy that produced this performance record.
    pub fn strategy_name(&self) -> &str {
        &self.strategy_name
    }

    /// Gets the number of games the strategy played.
    pub fn num_played(&self) -> u32 {
        self.games.len() as u32
    }

    /// Gets the number of games in which the strategy cracked the code.
    ///
    /// This function always returns a number less than or equal to
    /// [`num_played()`](Self::num_played()).
    pub fn num_solved(&self) -> u32 {
        self.games
            .iter()
            .filter(|(_, history)| history.solved())
            .count() as u32
    }

    /// Gets the fraction of games in which the strategy cracked the code.
    pub fn frac_solved(&self) -> f32 {
        (self.num_solved() as f32) / (self.num_played() as f32)
    }

    /// Gets the number of guesses made across all games.
    pub fn cumulative_turns(&self) -> u32 {
        self.games.iter().map(|(_, h)| h.len() as u32).sum()
    }

    /// Gets the number of guesses made across all won games.
    pub fn cumulative_turns_solved(&self) -> u32 {
        self.games
            .iter()
            .filter(|(_, history)| history.solved())
            .map(|(_, h)| h.len() as u32)
            .sum()
    }

    /// Gets the average number of guesses needed to crack a code.
    ///
    /// This function does not include guesses made in games the strategy
    /// failed to win.
    pub fn turns_per_win(&self) -> f32 {
        (self.cumulative_turns_solved() as f32) / (self.num_solved() as f32)
    }

    /// Gets the number of games the strategy failed to win.
    ///
    /// This function always returns a number less than or equal to
    /// [`num_played()`](Self::num_played()).
    pub fn num_missed(&self) -> u32 {
        self.num_played() - self.num_solved()
    }

    /// Gets the fraction of games the strategy failed to win.
    pub fn frac_missed(&self) -> f32 {
        (self.num_missed() as f32) / (self.num_played() as f32)
    }

    /// Prints the strategy's summary and then a table showing the outcome
    /// of every game.
    #[cfg(feature = "fancy")]
    pub fn print(&self) {
        print!("{}", self);
        let mut table = Table::new();
        if !table.is_tty() {
            table.set_table_width(80);
        } else {
            table.load_preset(comfy_table::presets::UTF8_FULL);
        }
        let columns = (table.get_table_width().unwrap() / 9) as usize;
        for chunk in self.games.chunks(columns) {
            let mut row = Row::new();
            for (secret, history) in chunk {
                let mut cell = Cell::new(format!("{}\n-----\n{} turns", secret, history.len()));
                if !history.solved() {
                    cell = cell.bg(Color::Red).fg(Color::Black);
                }
                row.add_cell(cell);
            }
            table.add_row(row);
        }
        table.set_constraints(vec![
            ColumnConstraint::LowerBoundary(Width::Fixed(5));
            columns
        ]);
        println!("{}", table);
    }

    /// Converts this performance record to a pre-calculated summary.
    pub fn to_summary(&self) -> Summary {
        let longest_win = self
            .games
            .iter()
            .filter(|(_, history)| history.solved())
            .map(|(_, h)| h.len())
            .max()
            .unwrap_or(0);

        let mut bins = vec![0_u32; longest_win];
        self.games
            .iter()
            .filter(|(_, history)| history.solved())
            .for_each(|(_, h)| bins[h.len() - 1] += 1);

        assert_eq!(bins.iter().sum::<u32>(), self.num_solved());

        Summary {
            strategy_name: self.strategy_name.clone(),
            num_played: self.num_played(),
            num_solved: self.num_solved(),
            cumulative_turns: self.cumulative_turns(),
            histogram: bins.into(),
        }
    }
}

impl Display for Perf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let perf_summary = self.to_summary();
        write!(f, "{}", perf_summary)
    }
}

/// A summary of a strategy's performance generated by the
/// [test harness](crate::Harness).
///
/// It is recommended to convert the [`Perf`] struct to this via the
/// [`Perf::to_summary()`] method when you want to use the performance to
/// run statistics. Unlike [`Perf`], a summary owns no game transcripts, so
/// it is cheap to clone and (with the `serde` feature) to save as a
/// baseline for later runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Summary {
    strategy_name: String,
    num_played: u32,
    num_solved: u32,
    cumulative_turns: u32,
    histogram: Histogram,
}

impl Summary {
    /// Gets the name of the strategy that produced this performance record.
    pub fn strategy_name(&self) -> &str {
        &self.strategy_name
    }

    /// Gets the number of games the strategy played.
    pub fn num_played(&self) -> u32 {
        self.num_played
    }

    /// Gets the number of games in which the strategy cracked the code.
    ///
    /// This function always returns a number less than or equal to
    /// [`num_played()`](Self::num_played()).
    pub fn num_solved(&self) -> u32 {
        self.num_solved
    }

    /// Gets the fraction of games in which the strategy cracked the code.
    pub fn frac_solved(&self) -> f32 {
        (self.num_solved as f32) / (self.num_played as f32)
    }

    /// Gets the number of guesses made across all games.
    pub fn cumulative_turns(&self) -> u32 {
        self.cumulative_turns
    }

    /// Gets the number of guesses made across all won games.
    pub fn cumulative_turns_solved(&self) -> u32 {
        self.histogram
            .iter()
            .enumerate()
            .map(|(i, v)| (i as u32 + 1) * v)
            .sum::<u32>()
    }

    /// Gets the average number of guesses needed to crack a code.
    ///
    /// This function does not include guesses made in games the strategy
    /// failed to win.
    pub fn mean_turns(&self) -> f32 {
        (self.cumulative_turns_solved() as f32) / (self.num_solved as f32)
    }

    /// Gets the number of games the strategy failed to win.
    pub fn num_missed(&self) -> u32 {
        self.num_played - self.num_solved
    }

    /// Gets the fraction of games the strategy failed to win.
    pub fn frac_missed(&self) -> f32 {
        (self.num_missed() as f32) / (self.num_played as f32)
    }

    /// Gets the distribution of winning game lengths.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Compares this summary against a baseline.
    ///
    /// Returns [`SelfComparison`](crate::BullcowError::SelfComparison) when
    /// the two summaries are identical, since the tests are meaningless
    /// there.
    #[cfg(feature = "stats")]
    pub fn compare(&self, baseline: &Summary) -> Result<Comparison> {
        if self == baseline {
            return Err(BullcowError::SelfComparison);
        }

        Comparison::compare(self.clone(), baseline.clone(), 0.05)
    }

    /// Prints the summary to stdout according to `options`.
    pub fn print(&self, options: SummaryPrintOptions) -> Result<()> {
        let mut stdout = std::io::stdout();

        #[cfg(feature = "stats")]
        if let Some(baseline) = &options.compare {
            let comparison = self.compare(baseline)?;

            writeln!(stdout, "{:-^80}", self.strategy_name)?;
            writeln!(
                stdout,
                "Played {} games and comp. with {}, {} games",
                self.num_played(),
                baseline.strategy_name(),
                baseline.num_played()
            )?;

            writeln!(
                stdout,
                "Cracked {} codes, or {:.1}% ({}%), and missed {}, {}",
                self.num_solved(),
                self.frac_solved() * 100.,
                paint(
                    format!("{:+.1}", comparison.frac_solved_diff() * 100.),
                    comparison.frac_solved_diff().is_sign_positive()
                ),
                self.num_missed(),
                if comparison.solved_significant() {
                    emphasize("a sig. diff.")
                } else {
                    "not a sig. diff.".to_string()
                }
            )?;

            writeln!(
                stdout,
                "Wins took {:.2} ({}) turns on average, {}",
                self.mean_turns(),
                paint(
                    format!("{:+.2}", comparison.mean_turns_diff()),
                    comparison.mean_turns_diff().is_sign_negative()
                ),
                if comparison.turns_significant() {
                    emphasize("a sig. diff.")
                } else {
                    "not a sig. diff.".to_string()
                }
            )?;

            if options.histogram {
                write!(stdout, "{}", self.histogram)?;
            }

            return Ok(());
        }

        write!(stdout, "{}", self)?;

        if options.histogram {
            write!(stdout, "{}", self.histogram)?;
        }

        Ok(())
    }

    /// Creates a default set of print options to configure.
    pub fn print_options() -> SummaryPrintOptions {
        SummaryPrintOptions::default()
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:-^80}", self.strategy_name)?;
        writeln!(f, "Played {} games", self.num_played())?;

        writeln!(
            f,
            "Cracked {} codes, or {:.1}%, and missed {}",
            self.num_solved(),
            self.frac_solved() * 100.,
            self.num_missed()
        )?;

        writeln!(
            f,
            "Wins took {:.2} turns on average",
            self.mean_turns(),
        )?;

        Ok(())
    }
}

#[cfg(all(feature = "fancy", feature = "stats"))]
fn paint(text: String, good: bool) -> String {
    use owo_colors::{AnsiColors, OwoColorize, Stream};

    let color = if good {
        AnsiColors::Green
    } else {
        AnsiColors::Red
    };
    text.if_supports_color(Stream::Stdout, |t| t.color(color))
        .to_string()
}

#[cfg(all(not(feature = "fancy"), feature = "stats"))]
fn paint(text: String, _good: bool) -> String {
    text
}

#[cfg(all(feature = "fancy", feature = "stats"))]
fn emphasize(text: &str) -> String {
    use owo_colors::{OwoColorize, Stream};

    text.if_supports_color(Stream::Stdout, |t| t.bold())
        .to_string()
}

#[cfg(all(not(feature = "fancy"), feature = "stats"))]
fn emphasize(text: &str) -> String {
    text.to_string()
}

/// Options controlling [`Summary::print()`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SummaryPrintOptions {
    #[cfg(feature = "stats")]
    compare: Option<Summary>,
    histogram: bool,
}

impl SummaryPrintOptions {
    /// Creates the default options: no comparison, no histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares the printed summary against `baseline`, marking
    /// statistically significant differences.
    #[cfg(feature = "stats")]
    pub fn compare(self, baseline: &Summary) -> Self {
        Self {
            compare: Some(baseline.clone()),
            ..self
        }
    }

    /// Includes a histogram of winning game lengths.
    pub fn histogram(self, histogram: bool) -> Self {
        Self { histogram, ..self }
    }
}

/// The result of statistically comparing two [`Summary`]s.
///
/// Whether the solve rates differ is tested with Fisher's exact test on
/// the win/loss table; whether the winning game lengths differ is tested
/// with Welch's t-test on the histograms. The turn-count test is skipped
/// when either side has fewer than two wins, in which case it reports no
/// significance.
#[cfg(feature = "stats")]
#[derive(Debug, Clone)]
pub struct Comparison {
    this: Summary,
    baseline: Summary,
    solved: FishersExactPvalues,
    turns: Option<WelchsT<f64>>,
}

#[cfg(feature = "stats")]
impl Comparison {
    /// Runs the statistical tests comparing `this` against `baseline` at
    /// significance level `alpha`.
    pub fn compare(this: Summary, baseline: Summary, alpha: f64) -> Result<Self> {
        let solved = fishers_exact::fishers_exact(&[
            this.num_solved(),
            baseline.num_solved(),
            this.num_missed(),
            baseline.num_missed(),
        ])
        .map_err(|_| BullcowError::Stats)?;

        let turns = WelchsT::two_sample(
            this.turn_sample(),
            baseline.turn_sample(),
            alpha,
            Tails::Two,
        )
        .ok();

        Ok(Self {
            this,
            baseline,
            solved,
            turns,
        })
    }

    /// Returns true if the two strategies played the same number of games.
    pub fn plays_eq(&self) -> bool {
        self.this.num_played == self.baseline.num_played
    }

    /// The difference in solved games, when the play counts match.
    pub fn num_solved_diff(&self) -> Option<i64> {
        self.plays_eq()
            .then(|| self.this.num_solved() as i64 - self.baseline.num_solved() as i64)
    }

    /// The difference in missed games, when the play counts match.
    pub fn num_missed_diff(&self) -> Option<i64> {
        self.plays_eq()
            .then(|| self.this.num_missed() as i64 - self.baseline.num_missed() as i64)
    }

    /// The difference in solve rate.
    pub fn frac_solved_diff(&self) -> f32 {
        self.this.frac_solved() - self.baseline.frac_solved()
    }

    /// The difference in miss rate.
    pub fn frac_missed_diff(&self) -> f32 {
        self.this.frac_missed() - self.baseline.frac_missed()
    }

    /// The difference in mean turns per win.
    pub fn mean_turns_diff(&self) -> f32 {
        self.this.mean_turns() - self.baseline.mean_turns()
    }

    /// Returns true if the solve rates differ significantly.
    pub fn solved_significant(&self) -> bool {
        self.solved.two_tail_pvalue < 0.05
    }

    /// Returns true if the mean turns per win differ significantly.
    pub fn turns_significant(&self) -> bool {
        matches!(&self.turns, Some(t) if t.is_significant())
    }
}

#[cfg(feature = "stats")]
impl Summary {
    /// Expands the histogram back into one observation per win.
    fn turn_sample(&self) -> Vec<f64> {
        self.histogram
            .iter()
            .enumerate()
            .flat_map(|(i, &v)| std::iter::repeat((i + 1) as f64).take(v as usize))
            .collect()
    }
}

/// The distribution of winning game lengths.
///
/// Bin `i` counts the games won in exactly `i + 1` turns. Games that were
/// not won do not appear at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Histogram {
    bins: Vec<u32>,
}

impl From<Vec<u32>> for Histogram {
    fn from(other: Vec<u32>) -> Self {
        Self { bins: other }
    }
}

impl Deref for Histogram {
    type Target = [u32];

    fn deref(&self) -> &Self::Target {
        &self.bins
    }
}

impl Display for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let max = self.iter().max().copied().unwrap_or(0);
        if max == 0 {
            return Ok(());
        }

        let digits =
            std::iter::successors(Some(max), |&n| (n >= 10).then(|| n / 10)).count() as u32;
        let count_per_mark = (max as f32 / (80. - digits as f32 - 6.)).max(1.0);

        for (i, &bin) in self.bins.iter().enumerate() {
            write!(f, "{} |", i + 1)?;
            let marks = (bin as f32 / count_per_mark).floor() as usize;
            writeln!(f, "{:#>marks$} ({})", "", bin)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::strategy::{Random, Secret};

    fn played(perf: &mut Perf, secret: &str, guesses: &[&str]) {
        let secret = Secret::new(Code::from_str(secret).unwrap());
        let mut history = History::new();
        for guess in guesses {
            let guess = Code::from_str(guess).unwrap();
            history.record(guess, secret.check(&guess));
        }
        perf.games.push((secret.reveal(), history));
    }

    fn fixture() -> Perf {
        let mut perf = Perf::new(&Random);

        // Two wins, in one and three turns, and one missed game.
        played(&mut perf, "398", &["398"]);
        played(&mut perf, "172", &["045", "123", "172"]);
        played(&mut perf, "506", &["123", "456", "789"]);

        perf
    }

    #[test]
    fn counts_wins_and_misses() {
        let perf = fixture();

        assert_eq!(perf.num_played(), 3);
        assert_eq!(perf.num_solved(), 2);
        assert_eq!(perf.num_missed(), 1);
        assert_eq!(perf.cumulative_turns(), 7);
        assert_eq!(perf.cumulative_turns_solved(), 4);
        assert!((perf.turns_per_win() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn summary_histogram_matches_game_lengths() {
        let summary = fixture().to_summary();

        assert_eq!(summary.num_played(), 3);
        assert_eq!(summary.num_solved(), 2);
        assert_eq!(summary.histogram().deref(), &[1, 0, 1][..]);
        assert_eq!(summary.cumulative_turns_solved(), 4);
        assert!((summary.mean_turns() - 2.0).abs() < f32::EPSILON);
    }

    #[cfg(feature = "stats")]
    #[test]
    fn comparing_a_summary_with_itself_fails() {
        let summary = fixture().to_summary();

        assert!(matches!(
            summary.compare(&summary.clone()),
            Err(BullcowError::SelfComparison)
        ));
    }

    #[cfg(feature = "stats")]
    #[test]
    fn comparison_reports_differences() {
        let strong = fixture().to_summary();

        let mut weak_perf = Perf::new(&Random);
        played(&mut weak_perf, "398", &["012", "345", "678"]);
        played(&mut weak_perf, "172", &["012", "345", "678"]);
        played(&mut weak_perf, "506", &["012", "345", "506"]);
        let weak = weak_perf.to_summary();

        let comparison = strong.compare(&weak).unwrap();

        assert!(comparison.plays_eq());
        assert_eq!(comparison.num_solved_diff(), Some(1));
        assert_eq!(comparison.num_missed_diff(), Some(-1));
        assert!(comparison.frac_solved_diff() > 0.0);
        // Three games each is far too small a sample for significance.
        assert!(!comparison.solved_significant());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn summaries_round_trip_through_json() {
        let summary = fixture().to_summary();

        let json = serde_json::to_string(&summary).unwrap();
        let back: Summary = serde_json::from_str(&json).unwrap();

        assert_eq!(summary, back);
    }
}
