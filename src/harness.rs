//! The test harness for running Bulls and Cows strategies.

use std::{
    ops::Deref,
    sync::{Arc, Mutex},
};

#[cfg(feature = "serde")]
use std::{
    fs,
    path::{Path, PathBuf},
};

use either::Either;
#[cfg(feature = "parallel")]
use indicatif::ParallelProgressIterator;
use rand::{rngs::StdRng, seq::index::sample, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "stats")]
use crate::BullcowError;
use crate::{
    perf::Perf,
    strategy::{Code, History, Secret, Strategy},
    HarnessError, Result, Summary,
};

/// A test harness that can run many strategies against many secrets.
///
/// When you want to test your strategies, create a new test harness with
/// [`new()`](Harness::new()). You can then configure it using various
/// methods. Note that these configuration methods consume the existing
/// [`Harness`] and return a new one.
///
/// Each game hands the strategy an empty [`History`], scores every guess
/// against the secret, and records the scored guess back into the history
/// until the strategy cracks the code or the turn limit passes.
///
/// # Examples
///
/// ```rust
/// # use bullcow_rs::harness::Harness;
/// use bullcow_rs::strategy::Random;
///
/// let harness = Harness::new()
///     .quiet()
///     .add_strategy(Box::new(Random))
///     .test_num(50);
///
/// let results = harness.run();
/// ```
#[derive(Debug)]
pub struct Harness {
    strategies: Vec<Box<dyn Strategy>>,
    verbose: bool,
    num_secrets: Option<usize>,
    turn_limit: usize,
    seed: Option<u64>,
    baseline: Option<usize>,
    #[cfg(feature = "serde")]
    baseline_file: Option<PathBuf>,
}

impl Default for Harness {
    fn default() -> Self {
        Harness {
            strategies: Vec::new(),
            verbose: false,
            num_secrets: Some(100),
            turn_limit: 100,
            seed: None,
            baseline: None,
            #[cfg(feature = "serde")]
            baseline_file: None,
        }
    }
}

impl Harness {
    /// Creates a new test harness with default configuration.
    ///
    /// Defaults:
    /// 1. tests no strategies
    /// 2. quiet mode
    /// 3. runs each strategy against 100 secrets chosen at random
    /// 4. allows 100 guesses per game
    /// 5. does not compare against a baseline
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the harness verbose while testing.
    ///
    /// As of right now, this consists of a progress bar and nothing else.
    pub fn verbose(self) -> Self {
        Harness {
            verbose: true,
            ..self
        }
    }

    /// Makes the harness silent while testing.
    pub fn quiet(self) -> Self {
        Harness {
            verbose: false,
            ..self
        }
    }

    /// Adds a strategy to the harness for testing.
    pub fn add_strategy(self, strat: Box<dyn Strategy>) -> Self {
        let mut strategies = self.strategies;
        strategies.push(strat);
        Harness { strategies, ..self }
    }

    /// Adds a [`Vec`] of strategies to the harness for testing.
    pub fn add_strategies(self, strats: Vec<Box<dyn Strategy>>) -> Self {
        let mut strategies = self.strategies;
        strategies.extend(strats);
        Harness { strategies, ..self }
    }

    /// Adds a strategy to the harness for testing and sets it as the
    /// baseline for comparison.
    pub fn add_baseline(self, strat: Box<dyn Strategy>) -> Self {
        self.add_strategy(strat).and_baseline()
    }

    /// Sets the most recently added strategy as the baseline for
    /// comparisons.
    ///
    /// Calling this before any strategy has been added leaves the baseline
    /// unset.
    pub fn and_baseline(self) -> Self {
        Self {
            baseline: self.strategies.len().checked_sub(1),
            ..self
        }
    }

    /// Compares every strategy against a summary saved earlier with
    /// [`Record::save_baseline()`] instead of a freshly run baseline.
    #[cfg(feature = "serde")]
    pub fn baseline_file(self, path: impl Into<PathBuf>) -> Self {
        Harness {
            baseline_file: Some(path.into()),
            ..self
        }
    }

    /// Sets the harness to test each strategy against every possible
    /// secret.
    pub fn test_all(self) -> Self {
        Harness {
            num_secrets: None,
            ..self
        }
    }

    /// Sets the harness to test each strategy against `n` random secrets.
    pub fn test_num(self, n: usize) -> Self {
        Harness {
            num_secrets: Some(n.clamp(0, Code::COUNT)),
            ..self
        }
    }

    /// Sets how many guesses a strategy may make in one game before the
    /// game is scored as missed.
    pub fn turn_limit(self, turns: usize) -> Self {
        Harness {
            turn_limit: turns,
            ..self
        }
    }

    /// Seeds the harness so that a run repeats exactly.
    ///
    /// With the same seed and the same configuration, every game plays out
    /// identically, including under the `parallel` feature: each
    /// (secret, strategy) pair derives its own generator, so scheduling
    /// order cannot change the outcomes.
    pub fn seed(self, seed: u64) -> Self {
        Harness {
            seed: Some(seed),
            ..self
        }
    }

    /// Runs the harness and produces performances for each strategy.
    ///
    /// The [`Perf`]s will be in the same order as the strategies were
    /// added to the harness.
    pub fn run(&self) -> Result<Record> {
        if self.strategies.is_empty() {
            return Err(HarnessError::NoStrategiesAdded.into());
        }

        #[cfg(feature = "serde")]
        if self.baseline.is_some() && self.baseline_file.is_some() {
            return Err(HarnessError::BaselineAlreadySet.into());
        }

        #[cfg(feature = "serde")]
        let loaded = match &self.baseline_file {
            Some(path) => Some(Record::load_baseline(path)?),
            None => None,
        };

        let perfs = Arc::new(Mutex::new(Vec::new()));
        {
            let mut perfs = perfs.lock().unwrap();
            for strat in &self.strategies {
                perfs.push(Perf::new(strat.as_ref()))
            }
        }

        let base_seed = self.seed.unwrap_or_else(rand::random);

        let secrets = match self.num_secrets {
            Some(n) => {
                let mut rng = StdRng::seed_from_u64(base_seed);
                Either::Left(
                    sample(&mut rng, Code::COUNT, n)
                        .into_iter()
                        .map(|i| Code::from_index(i).unwrap()),
                )
            }
            None => Either::Right(Code::all()),
        };
        let indexed = secrets.enumerate();

        #[cfg(feature = "parallel")]
        {
            let total = self.num_secrets.unwrap_or(Code::COUNT) as u64;

            if self.verbose {
                indexed
                    .par_bridge()
                    .progress_count(total)
                    .map(|(nth, secret)| self.run_inner(nth, secret, base_seed, perfs.clone()))
                    .collect::<Result<()>>()?;
            } else {
                indexed
                    .par_bridge()
                    .map(|(nth, secret)| self.run_inner(nth, secret, base_seed, perfs.clone()))
                    .collect::<Result<()>>()?;
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            #[cfg(feature = "fancy")]
            let bar = if self.verbose {
                indicatif::ProgressBar::new(self.num_secrets.unwrap_or(Code::COUNT) as u64)
            } else {
                indicatif::ProgressBar::hidden()
            };

            for (nth, secret) in indexed {
                self.run_inner(nth, secret, base_seed, perfs.clone())?;
                #[cfg(feature = "fancy")]
                bar.inc(1);
            }

            #[cfg(feature = "fancy")]
            bar.finish_and_clear();
        }

        Ok(Record {
            perfs: Arc::try_unwrap(perfs).unwrap().into_inner().unwrap(),
            baseline: self.baseline,
            #[cfg(feature = "serde")]
            loaded_baseline: loaded,
        })
    }

    fn run_inner(
        &self,
        nth: usize,
        secret: Code,
        base_seed: u64,
        perfs: Arc<Mutex<Vec<Perf>>>,
    ) -> Result<()> {
        let target = Secret::new(secret);

        for (i, strategy) in self.strategies.iter().enumerate() {
            // Every (secret, strategy) pair derives its own generator so
            // outcomes do not depend on scheduling order.
            let mut rng = StdRng::seed_from_u64(
                base_seed
                    .wrapping_add((nth as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15))
                    .wrapping_add(i as u64),
            );

            let mut history = History::new();
            for _ in 0..self.turn_limit {
                let mv = strategy.guess(&history, &mut rng);
                let feedback = target.check(&mv.code);
                history.record(mv.code, feedback);
                if feedback.is_win() {
                    break;
                }
            }

            {
                let mut perfs = perfs.lock().unwrap();
                perfs[i].games.push((secret, history));
            }
        }

        Ok(())
    }

    /// Runs the harness (see [`run()`](Harness::run())) and prints
    /// performance summaries of each strategy.
    pub fn run_and_summarize(&self) -> Result<Record> {
        let perfs = self.run()?;
        for perf in perfs.iter() {
            println!("{}", perf);
        }
        Ok(perfs)
    }
}

/// The outcome of one harness run, one [`Perf`] per strategy.
#[derive(Debug, Clone, Default)]
pub struct Record {
    perfs: Vec<Perf>,
    baseline: Option<usize>,
    #[cfg(feature = "serde")]
    loaded_baseline: Option<Summary>,
}

impl Deref for Record {
    type Target = [Perf];

    fn deref(&self) -> &Self::Target {
        &self.perfs
    }
}

impl Record {
    /// Prints a report of the whole run to stdout.
    ///
    /// When a baseline was configured, every strategy is compared against
    /// it and significant differences are marked; the baseline's
    /// comparison against itself is printed plain.
    pub fn print_report(&self) -> Result<()> {
        #[cfg(feature = "stats")]
        {
            if let Some(n) = self.baseline {
                let baseline_summary = self.perfs[n].to_summary();
                return self.print_against(&baseline_summary);
            }

            #[cfg(feature = "serde")]
            if let Some(summary) = &self.loaded_baseline {
                return self.print_against(summary);
            }
        }

        for perf in self.perfs.iter() {
            let summary = perf.to_summary();
            summary.print(Summary::print_options().histogram(true))?;
        }

        Ok(())
    }

    #[cfg(feature = "stats")]
    fn print_against(&self, baseline: &Summary) -> Result<()> {
        for perf in self.perfs.iter() {
            let summary = perf.to_summary();
            match summary.print(Summary::print_options().compare(baseline).histogram(true)) {
                Ok(()) => {}
                Err(BullcowError::SelfComparison) => {
                    summary.print(Summary::print_options().histogram(true))?
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Saves the baseline strategy's summary as JSON at `path`.
    ///
    /// Fails with [`BaselineNotRun`](HarnessError::BaselineNotRun) when the
    /// run had no baseline strategy.
    #[cfg(feature = "serde")]
    pub fn save_baseline(&self, path: impl AsRef<Path>) -> Result<()> {
        let n = match self.baseline {
            Some(n) => n,
            None => return Err(HarnessError::BaselineNotRun.into()),
        };

        let json =
            serde_json::to_string(&self.perfs[n].to_summary()).map_err(HarnessError::Serde)?;
        fs::write(path, json).map_err(HarnessError::BaselineIo)?;

        Ok(())
    }

    /// Loads a summary previously saved with
    /// [`save_baseline()`](Record::save_baseline()).
    #[cfg(feature = "serde")]
    pub fn load_baseline(path: impl AsRef<Path>) -> Result<Summary> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HarnessError::BaselineDoesntExist.into());
        }

        let json = fs::read_to_string(path).map_err(HarnessError::BaselineIo)?;
        let summary = serde_json::from_str(&json).map_err(HarnessError::Serde)?;

        Ok(summary)
    }
}
