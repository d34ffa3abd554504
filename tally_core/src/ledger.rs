//! The day ledger state machine.
//!
//! Exactly one daily record is open at a time. Opening a brand-new day
//! runs the once-per-day recomputation (birthday age refresh, weight
//! carry-forward, BMR, goal resolution) and locks the calorie goal onto
//! the record; mutations while the day is open only re-derive totals.
//! Closing stamps the pass/fail outcome, folds the day into the streak
//! counters, and is idempotent so near-simultaneous advance triggers
//! cannot double-close a transition.

use crate::{
    aggregate, goal, metabolic, streak, Clock, DailyRecord, DataQuality, DiaryEntry, Error,
    Profile, RecordStore, Result, WaterUnit, WeighIn,
};
use crate::aggregate::MacroSplit;
use chrono::{Days, NaiveDate};
use uuid::Uuid;

/// Tunables the ledger carries across days
#[derive(Clone, Copy, Debug)]
pub struct LedgerOptions {
    /// Display unit for water totals on newly opened records
    pub water_unit: WaterUnit,
    /// Lower bound for resolved calorie goals
    pub safety_floor_kcal: u32,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            water_unit: WaterUnit::FluidOunces,
            safety_floor_kcal: 1200,
        }
    }
}

/// The open day's live state, published for display surfaces
#[derive(Clone, Debug)]
pub struct LedgerSnapshot {
    pub date: NaiveDate,
    /// Days since the profile's start date, 1-based
    pub day_number: i64,
    pub closed: bool,
    pub calorie_goal: u32,
    pub calorie_intake: i32,
    pub macros: MacroSplit,
    pub water_intake: f64,
    pub water_goal: f64,
    pub water_unit: WaterUnit,
    pub weigh_in_kg: f64,
    pub pass_fail: bool,
    pub current_streak: u32,
    pub current_activity_streak: u32,
    pub highest_streak: u32,
    pub highest_activity_streak: u32,
    pub flags: Vec<DataQuality>,
}

/// Orchestrator for one user's daily ledger
pub struct DayLedger<S: RecordStore, C: Clock> {
    store: S,
    clock: C,
    profile: Profile,
    open: DailyRecord,
    options: LedgerOptions,
    flags: Vec<DataQuality>,
}

impl<S: RecordStore, C: Clock> DayLedger<S, C> {
    /// Set up a fresh ledger: persist the profile and open today
    pub fn initialize(
        mut store: S,
        clock: C,
        mut profile: Profile,
        options: LedgerOptions,
    ) -> Result<Self> {
        persist(store.save_profile(&profile))?;

        let today = clock.today();
        let mut flags = Vec::new();
        let open = Self::open_record(&mut store, &mut profile, today, options, &mut flags)?;

        Ok(Self {
            store,
            clock,
            profile,
            open,
            options,
            flags,
        })
    }

    /// Resume from persisted state, rolling forward if the date moved
    ///
    /// Picks up an unclosed record wherever the ledger left off (it may
    /// sit ahead of the wall clock after an explicit advance), then
    /// closes/reopens as needed to land on the current date.
    pub fn resume(mut store: S, clock: C, options: LedgerOptions) -> Result<Self> {
        let mut profile = store.load_profile()?.ok_or_else(|| {
            Error::State("no profile found; set up a profile first".into())
        })?;

        let today = clock.today();
        let latest = store.load_latest_before(NaiveDate::MAX)?;

        let mut flags = Vec::new();
        let open = match latest {
            Some(record) if !record.closed => {
                tracing::debug!("Resuming open day {}", record.date);
                record
            }
            _ => Self::open_record(&mut store, &mut profile, today, options, &mut flags)?,
        };

        let mut ledger = Self {
            store,
            clock,
            profile,
            open,
            options,
            flags,
        };
        ledger.roll_to_current()?;
        Ok(ledger)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn current_day(&self) -> &DailyRecord {
        &self.open
    }

    pub fn flags(&self) -> &[DataQuality] {
        &self.flags
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Open a record for `date`, reusing any persisted one
    ///
    /// Duplicate opens of the already-open date are rejected, as is
    /// opening a second date while one is still open.
    pub fn open_day(&mut self, date: NaiveDate) -> Result<()> {
        if !self.open.closed {
            if self.open.date == date {
                return Err(Error::State(format!("day {} is already open", date)));
            }
            return Err(Error::State(format!(
                "day {} is still open; close it before opening {}",
                self.open.date, date
            )));
        }

        self.flags.clear();
        self.open = Self::open_record(
            &mut self.store,
            &mut self.profile,
            date,
            self.options,
            &mut self.flags,
        )?;
        Ok(())
    }

    /// Close the open day and open the next calendar date
    pub fn advance_day(&mut self) -> Result<NaiveDate> {
        self.close_day()?;

        let next = self.open.date + Days::new(1);
        self.flags.clear();
        self.open = Self::open_record(
            &mut self.store,
            &mut self.profile,
            next,
            self.options,
            &mut self.flags,
        )?;
        Ok(next)
    }

    /// Close/reopen if the clock crossed a day boundary
    ///
    /// Returns whether a transition happened; calling again without the
    /// clock moving is a no-op, so double triggers are harmless. Dates
    /// skipped while the app was not running get no records and read as
    /// streak gaps.
    pub fn roll_to_current(&mut self) -> Result<bool> {
        let today = self.clock.today();
        if today <= self.open.date {
            tracing::debug!("Ledger already at {}; no boundary crossed", self.open.date);
            return Ok(false);
        }

        self.close_day()?;
        self.flags.clear();
        self.open = Self::open_record(
            &mut self.store,
            &mut self.profile,
            today,
            self.options,
            &mut self.flags,
        )?;
        Ok(true)
    }

    /// Close the open day: stamp pass/fail, update streak high-water
    /// marks, persist. Closing an already-closed day is a no-op.
    pub fn close_day(&mut self) -> Result<()> {
        if self.open.closed {
            tracing::debug!("Day {} already closed; nothing to do", self.open.date);
            return Ok(());
        }

        let mut staged = self.refreshed(self.open.clone());
        staged.closed = true;

        let mut history = persist(
            self.store
                .load_daily_records(self.profile.start_date, staged.date),
        )?;
        history.retain(|r| r.date != staged.date);
        history.push(staged.clone());

        let mut profile = self.profile.clone();
        let best = streak::highest_streak(&history);
        if best > profile.highest_streak {
            tracing::info!("New highest streak: {}", best);
            profile.highest_streak = best;
        }
        let best_activity = streak::highest_activity_streak(&history);
        if best_activity > profile.highest_activity_streak {
            profile.highest_activity_streak = best_activity;
        }

        persist(self.store.save_daily_record(&staged))?;
        persist(self.store.save_profile(&profile))?;

        tracing::info!(
            "Closed {}: {} kcal against goal {} -> {}",
            staged.date,
            staged.calorie_intake,
            staged.calorie_goal,
            if staged.pass_fail { "pass" } else { "fail" }
        );

        self.open = staged;
        self.profile = profile;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutations (open day only)
    // ------------------------------------------------------------------

    /// Add a diary entry to the open day
    pub fn add_entry(&mut self, entry: DiaryEntry) -> Result<()> {
        self.ensure_open()?;
        let mut staged = self.open.clone();
        staged.entries.push(entry);
        self.commit_open(staged)
    }

    /// Remove a diary entry by id
    pub fn remove_entry(&mut self, id: Uuid) -> Result<()> {
        self.ensure_open()?;
        let mut staged = self.open.clone();
        let before = staged.entries.len();
        staged.entries.retain(|e| e.id != id);
        if staged.entries.len() == before {
            return Err(Error::Input(format!("no diary entry with id {}", id)));
        }
        self.commit_open(staged)
    }

    /// Record a weigh-in; the day's samples re-average into the record
    /// and the profile's current weight
    pub fn add_weigh_in(&mut self, weight_kg: f64) -> Result<()> {
        self.ensure_open()?;
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(Error::Input(format!("invalid weight: {}", weight_kg)));
        }
        let mut staged = self.open.clone();
        staged.weigh_ins.push(WeighIn::new(weight_kg));
        self.commit_open(staged)
    }

    /// Remove a weigh-in by id
    pub fn remove_weigh_in(&mut self, id: Uuid) -> Result<()> {
        self.ensure_open()?;
        let mut staged = self.open.clone();
        let before = staged.weigh_ins.len();
        staged.weigh_ins.retain(|w| w.id != id);
        if staged.weigh_ins.len() == before {
            return Err(Error::Input(format!("no weigh-in with id {}", id)));
        }
        self.commit_open(staged)
    }

    /// Adjust the open day's water goal
    pub fn set_water_goal(&mut self, water_goal: f64) -> Result<()> {
        self.ensure_open()?;
        if !water_goal.is_finite() || water_goal < 0.0 {
            return Err(Error::Input(format!("invalid water goal: {}", water_goal)));
        }
        let mut staged = self.open.clone();
        staged.water_goal = water_goal;
        self.commit_open(staged)
    }

    /// Apply a profile edit; takes effect from the next day-open, the
    /// open day's locked goal is never touched
    pub fn edit_profile(&mut self, edit: impl FnOnce(&mut Profile)) -> Result<()> {
        let mut staged = self.profile.clone();
        edit(&mut staged);
        persist(self.store.save_profile(&staged))?;
        self.profile = staged;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Published state
    // ------------------------------------------------------------------

    /// Live totals, locked goal, and streaks for display
    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        let history = persist(
            self.store
                .load_daily_records(self.profile.start_date, self.open.date),
        )?;
        let totals = aggregate::aggregate(&self.open.entries, self.open.water_unit);

        Ok(LedgerSnapshot {
            date: self.open.date,
            day_number: (self.open.date - self.profile.start_date).num_days() + 1,
            closed: self.open.closed,
            calorie_goal: self.open.calorie_goal,
            calorie_intake: totals.intake,
            macros: totals.macros,
            water_intake: totals.water_total,
            water_goal: self.open.water_goal,
            water_unit: self.open.water_unit,
            weigh_in_kg: self.open.average_weigh_in(),
            pass_fail: totals.intake <= self.open.calorie_goal as i32,
            current_streak: streak::current_streak(&history, self.open.date),
            current_activity_streak: streak::current_activity_streak(&history, self.open.date),
            highest_streak: self.profile.highest_streak,
            highest_activity_streak: self.profile.highest_activity_streak,
            flags: self.flags.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_open(&self) -> Result<()> {
        if self.open.closed {
            return Err(Error::State(format!(
                "day {} is closed and read-only",
                self.open.date
            )));
        }
        Ok(())
    }

    /// Re-derive a record's totals from its entries and weigh-ins
    fn refreshed(&self, mut record: DailyRecord) -> DailyRecord {
        let totals = aggregate::aggregate(&record.entries, record.water_unit);
        record.calorie_intake = totals.intake;
        record.water_intake = totals.water_total;
        record.weigh_in_kg = record.average_weigh_in();
        record.pass_fail = record.calorie_intake <= record.calorie_goal as i32;
        record
    }

    /// Persist a staged open record, then commit it (and any weigh-in
    /// driven profile weight change) to memory. A failed save leaves
    /// in-memory state at the last durable value so the caller can retry
    /// the identical operation.
    fn commit_open(&mut self, staged: DailyRecord) -> Result<()> {
        let staged = self.refreshed(staged);
        persist(self.store.save_daily_record(&staged))?;

        if !staged.weigh_ins.is_empty() && staged.weigh_in_kg != self.profile.current_weight_kg {
            let mut profile = self.profile.clone();
            profile.current_weight_kg = staged.weigh_in_kg;
            persist(self.store.save_profile(&profile))?;
            self.profile = profile;
            tracing::debug!("Updated profile weight to {:.1} kg", staged.weigh_in_kg);
        }

        self.open = staged;
        Ok(())
    }

    /// Load or create the record for `date`
    ///
    /// An existing record is reused as-is: its goal was locked when it
    /// first opened and is never recomputed. Only a brand-new record
    /// runs the once-per-day sequence: birthday age refresh, weight
    /// carry-forward from the previous closed day, BMR, goal resolution.
    fn open_record(
        store: &mut S,
        profile: &mut Profile,
        date: NaiveDate,
        options: LedgerOptions,
        flags: &mut Vec<DataQuality>,
    ) -> Result<DailyRecord> {
        if let Some(existing) = persist(store.load_daily_record(date))? {
            tracing::info!(
                "Reopening {} with locked goal {} kcal",
                date,
                existing.calorie_goal
            );
            return Ok(existing);
        }

        let prior = persist(store.load_latest_before(date))?;
        let water_goal = prior.as_ref().map(|r| r.water_goal).unwrap_or(0.0);

        let mut staged = profile.clone();

        let age = metabolic::age_on(staged.birth_date, date);
        if age != staged.age {
            tracing::info!("Birthday passed: age {} -> {}", staged.age, age);
            staged.age = age;
        }

        if let Some(prev) = prior.as_ref().filter(|r| r.closed && r.weigh_in_kg > 0.0) {
            tracing::debug!(
                "Carrying weight {:.1} kg forward from {}",
                prev.weigh_in_kg,
                prev.date
            );
            staged.current_weight_kg = prev.weigh_in_kg;
        }

        let tdee = if staged.current_weight_kg > 0.0 && staged.height_cm > 0.0 {
            staged.bmr = metabolic::compute_bmr(
                staged.current_weight_kg,
                staged.height_cm,
                staged.age,
                staged.sex,
            );
            metabolic::apply_activity(staged.bmr, staged.activity)
        } else {
            tracing::warn!("Missing body data; falling back to last known BMR");
            flags.push(DataQuality::MissingBodyData);
            if staged.bmr > 0.0 {
                metabolic::apply_activity(staged.bmr, staged.activity)
            } else {
                f64::from(options.safety_floor_kcal)
            }
        };

        let resolution = goal::resolve_daily_goal(
            tdee,
            &staged.strategy,
            &staged,
            date,
            options.safety_floor_kcal,
        );
        if let Some(flag) = resolution.flag {
            flags.push(flag);
        }
        staged.daily_calorie_goal = resolution.kcal;

        let record = DailyRecord::new(date, resolution.kcal, water_goal, options.water_unit);

        persist(store.save_daily_record(&record))?;
        persist(store.save_profile(&staged))?;
        *profile = staged;

        tracing::info!("Opened {} with locked goal {} kcal", date, record.calorie_goal);
        Ok(record)
    }
}

/// Map a store round-trip failure onto the single persistence outcome
fn persist<T>(result: Result<T>) -> Result<T> {
    result.map_err(|e| match e {
        already @ Error::Persistence(_) => already,
        other => Error::Persistence(other.to_string()),
    })
}
