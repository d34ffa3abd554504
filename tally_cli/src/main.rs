use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally_core::*;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Daily calorie and weight ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the user profile and open the first day
    Setup {
        #[arg(long)]
        name: String,

        /// male or female
        #[arg(long)]
        sex: String,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: NaiveDate,

        /// Current weight in display units (kg when --metric, lbs otherwise)
        #[arg(long)]
        weight: f64,

        /// Height in centimeters
        #[arg(long)]
        height_cm: f64,

        /// sedentary, light, moderate, very, or extra (or an index 0-4)
        #[arg(long, default_value = "sedentary")]
        activity: String,

        /// Use metric display units
        #[arg(long)]
        metric: bool,

        /// Weekly weight change in display units, negative to lose
        #[arg(long, conflicts_with_all = ["fixed_calories", "tdee_only"], allow_hyphen_values = true)]
        rate: Option<f64>,

        /// Target weight in display units (requires --target-date)
        #[arg(long, requires = "target_date")]
        target_weight: Option<f64>,

        /// Target date (YYYY-MM-DD)
        #[arg(long, requires = "target_weight")]
        target_date: Option<NaiveDate>,

        /// Fixed daily calorie target, ignoring TDEE
        #[arg(long, conflicts_with = "tdee_only")]
        fixed_calories: Option<u32>,

        /// Track against TDEE with no deficit or surplus
        #[arg(long)]
        tdee_only: bool,
    },

    /// Show the open day's totals (default)
    Status,

    /// Log a food entry
    Food {
        description: String,
        calories: i32,

        #[arg(long, default_value_t = 0.0)]
        fat: f64,

        #[arg(long, default_value_t = 0.0)]
        carbs: f64,

        #[arg(long, default_value_t = 0.0)]
        protein: f64,
    },

    /// Log a workout and the calories it burned
    Workout {
        description: String,
        calories: i32,
    },

    /// Log water, e.g. `tally water 1/2 gal` or `tally water 16 fl oz`
    Water {
        #[arg(required = true)]
        amount: Vec<String>,
    },

    /// Record a weigh-in in display units
    Weigh { weight: f64 },

    /// Set the open day's water goal, in the display water unit
    WaterGoal { amount: f64 },

    /// Remove a diary entry or weigh-in by id
    Remove { id: Uuid },

    /// Close the open day and advance to the next
    Advance {
        /// Number of day transitions to run
        #[arg(long, default_value_t = 1)]
        days: u32,
    },

    /// Review recent closed days
    History {
        #[arg(long, default_value_t = 14)]
        days: u64,
    },

    /// Export closed history to CSV
    Export {
        /// Output path (defaults to history.csv in the data directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tally_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Setup {
            name,
            sex,
            birth_date,
            weight,
            height_cm,
            activity,
            metric,
            rate,
            target_weight,
            target_date,
            fixed_calories,
            tdee_only,
        }) => cmd_setup(
            data_dir,
            &config,
            SetupArgs {
                name,
                sex,
                birth_date,
                weight,
                height_cm,
                activity,
                metric,
                rate,
                target_weight,
                target_date,
                fixed_calories,
                tdee_only,
            },
        ),
        Some(Commands::Status) | None => cmd_status(data_dir, &config),
        Some(Commands::Food {
            description,
            calories,
            fat,
            carbs,
            protein,
        }) => cmd_food(data_dir, &config, description, calories, fat, carbs, protein),
        Some(Commands::Workout {
            description,
            calories,
        }) => cmd_workout(data_dir, &config, description, calories),
        Some(Commands::Water { amount }) => cmd_water(data_dir, &config, amount.join(" ")),
        Some(Commands::Weigh { weight }) => cmd_weigh(data_dir, &config, weight),
        Some(Commands::WaterGoal { amount }) => cmd_water_goal(data_dir, &config, amount),
        Some(Commands::Remove { id }) => cmd_remove(data_dir, &config, id),
        Some(Commands::Advance { days }) => cmd_advance(data_dir, &config, days),
        Some(Commands::History { days }) => cmd_history(data_dir, &config, days),
        Some(Commands::Export { out }) => cmd_export(data_dir, &config, out),
    }
}

struct SetupArgs {
    name: String,
    sex: String,
    birth_date: NaiveDate,
    weight: f64,
    height_cm: f64,
    activity: String,
    metric: bool,
    rate: Option<f64>,
    target_weight: Option<f64>,
    target_date: Option<NaiveDate>,
    fixed_calories: Option<u32>,
    tdee_only: bool,
}

fn ledger_options(config: &Config) -> LedgerOptions {
    let water_unit = match units::parse_water_unit(&config.display.water_unit) {
        Ok(unit) => unit,
        Err(e) => {
            eprintln!("{}; using fl oz", e);
            WaterUnit::FluidOunces
        }
    };
    LedgerOptions {
        water_unit,
        safety_floor_kcal: config.goal.safety_floor_kcal,
    }
}

fn open_ledger(
    data_dir: PathBuf,
    config: &Config,
) -> Result<DayLedger<JsonStore, SystemClock>> {
    let store = JsonStore::new(data_dir);
    DayLedger::resume(store, SystemClock, ledger_options(config))
}

fn mass_unit_label(use_metric: bool) -> &'static str {
    if use_metric {
        "kg"
    } else {
        "lbs"
    }
}

fn display_to_kg(value: f64, use_metric: bool) -> Result<f64> {
    units::mass_to_kg(value, if use_metric { "kg" } else { "lbs" })
}

fn parse_sex(s: &str) -> Result<Sex> {
    match s.to_lowercase().as_str() {
        "male" | "m" => Ok(Sex::Male),
        "female" | "f" => Ok(Sex::Female),
        other => Err(Error::Input(format!("unknown sex: {}", other))),
    }
}

fn parse_activity(s: &str) -> Result<ActivityLevel> {
    if let Ok(index) = s.parse::<i32>() {
        return Ok(ActivityLevel::from_index(index));
    }
    match s.to_lowercase().as_str() {
        "sedentary" => Ok(ActivityLevel::Sedentary),
        "light" => Ok(ActivityLevel::Light),
        "moderate" => Ok(ActivityLevel::Moderate),
        "very" => Ok(ActivityLevel::Very),
        "extra" => Ok(ActivityLevel::Extra),
        other => Err(Error::Input(format!("unknown activity level: {}", other))),
    }
}

fn cmd_setup(data_dir: PathBuf, config: &Config, args: SetupArgs) -> Result<()> {
    let sex = parse_sex(&args.sex)?;
    let activity = parse_activity(&args.activity)?;
    let weight_kg = display_to_kg(args.weight, args.metric)?;

    let strategy = if let Some(kcal) = args.fixed_calories {
        GoalStrategy::FixedCalories { kcal }
    } else if let (Some(target_weight), Some(target_date)) =
        (args.target_weight, args.target_date)
    {
        GoalStrategy::RateToTargetByDate {
            target_weight_kg: display_to_kg(target_weight, args.metric)?,
            target_date,
        }
    } else if let Some(rate_per_week) = args.rate {
        GoalStrategy::RatePerWeek { rate_per_week }
    } else if args.tdee_only {
        GoalStrategy::TdeeOnly
    } else {
        GoalStrategy::Maintain
    };

    let today = SystemClock.today();
    let profile = Profile::new(
        args.name,
        sex,
        args.birth_date,
        weight_kg,
        args.height_cm,
        activity,
        args.metric,
        strategy,
        today,
    );

    let store = JsonStore::new(data_dir);
    let ledger = DayLedger::initialize(store, SystemClock, profile, ledger_options(config))?;

    let profile = ledger.profile();
    println!("✓ Profile saved for {}", profile.name);
    println!("  {}", goal::describe(&profile.strategy, profile));
    println!("  BMR: {:.0} kcal", profile.bmr);
    println!(
        "  Daily calorie goal: {} kcal (locked for today)",
        ledger.current_day().calorie_goal
    );
    report_flags(ledger.flags());
    Ok(())
}

fn cmd_status(data_dir: PathBuf, config: &Config) -> Result<()> {
    let ledger = open_ledger(data_dir, config)?;
    let snapshot = ledger.snapshot()?;
    let profile = ledger.profile();

    println!("╭─────────────────────────────────────────╮");
    println!("│  DAY {} ({})", snapshot.day_number, snapshot.date);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  Calories: {}/{} ({})",
        snapshot.calorie_intake,
        snapshot.calorie_goal,
        if snapshot.pass_fail { "UNDER" } else { "OVER" }
    );

    let macros = &snapshot.macros;
    if macros.classified_total() > 0.0 || macros.unclassified_kcal > 0.0 {
        println!(
            "    Fat {:.0} / Carbs {:.0} / Protein {:.0} / Unclassified {:.0} kcal",
            macros.fat_kcal, macros.carb_kcal, macros.protein_kcal, macros.unclassified_kcal
        );
    }

    println!(
        "  Water: {:.1}/{:.1} {}",
        snapshot.water_intake,
        snapshot.water_goal,
        snapshot.water_unit.label()
    );

    if snapshot.weigh_in_kg > 0.0 {
        println!(
            "  Weigh-in: {:.1} {}",
            units::kg_to_display(snapshot.weigh_in_kg, profile.use_metric),
            mass_unit_label(profile.use_metric)
        );
    }

    println!(
        "  Streak: {} (best {})  Activity streak: {} (best {})",
        snapshot.current_streak,
        snapshot.highest_streak,
        snapshot.current_activity_streak,
        snapshot.highest_activity_streak
    );

    report_flags(&snapshot.flags);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_food(
    data_dir: PathBuf,
    config: &Config,
    description: String,
    calories: i32,
    fat: f64,
    carbs: f64,
    protein: f64,
) -> Result<()> {
    let mut ledger = open_ledger(data_dir, config)?;
    let entry = DiaryEntry::food(description, calories, fat, carbs, protein);
    let id = entry.id;
    ledger.add_entry(entry)?;

    let snapshot = ledger.snapshot()?;
    println!("✓ Logged food ({})", id);
    println!(
        "  Calories: {}/{}",
        snapshot.calorie_intake, snapshot.calorie_goal
    );
    Ok(())
}

fn cmd_workout(
    data_dir: PathBuf,
    config: &Config,
    description: String,
    calories: i32,
) -> Result<()> {
    let mut ledger = open_ledger(data_dir, config)?;
    let entry = DiaryEntry::workout(description, calories);
    let id = entry.id;
    ledger.add_entry(entry)?;

    let snapshot = ledger.snapshot()?;
    println!("✓ Logged workout ({})", id);
    println!(
        "  Calories: {}/{}",
        snapshot.calorie_intake, snapshot.calorie_goal
    );
    Ok(())
}

fn cmd_water(data_dir: PathBuf, config: &Config, amount: String) -> Result<()> {
    let mut ledger = open_ledger(data_dir, config)?;
    let entry = DiaryEntry::water(amount);
    let id = entry.id;
    ledger.add_entry(entry)?;

    let snapshot = ledger.snapshot()?;
    println!("✓ Logged water ({})", id);
    println!(
        "  Water: {:.1}/{:.1} {}",
        snapshot.water_intake,
        snapshot.water_goal,
        snapshot.water_unit.label()
    );
    Ok(())
}

fn cmd_weigh(data_dir: PathBuf, config: &Config, weight: f64) -> Result<()> {
    let mut ledger = open_ledger(data_dir, config)?;
    let use_metric = ledger.profile().use_metric;
    ledger.add_weigh_in(display_to_kg(weight, use_metric)?)?;

    let snapshot = ledger.snapshot()?;
    println!(
        "✓ Weighed in. Today's average: {:.1} {}",
        units::kg_to_display(snapshot.weigh_in_kg, use_metric),
        mass_unit_label(use_metric)
    );
    Ok(())
}

fn cmd_water_goal(data_dir: PathBuf, config: &Config, amount: f64) -> Result<()> {
    let mut ledger = open_ledger(data_dir, config)?;
    ledger.set_water_goal(amount)?;
    println!(
        "✓ Water goal set to {:.1} {}",
        amount,
        ledger.current_day().water_unit.label()
    );
    Ok(())
}

fn cmd_remove(data_dir: PathBuf, config: &Config, id: Uuid) -> Result<()> {
    let mut ledger = open_ledger(data_dir, config)?;
    match ledger.remove_entry(id) {
        Ok(()) => {
            println!("✓ Removed diary entry {}", id);
            Ok(())
        }
        Err(Error::Input(_)) => {
            ledger.remove_weigh_in(id)?;
            println!("✓ Removed weigh-in {}", id);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn cmd_advance(data_dir: PathBuf, config: &Config, days: u32) -> Result<()> {
    let mut ledger = open_ledger(data_dir, config)?;

    for _ in 0..days.max(1) {
        let closed = ledger.current_day().clone();
        let next = ledger.advance_day()?;
        let outcome = if ledger
            .store()
            .load_daily_record(closed.date)?
            .map(|r| r.pass_fail)
            .unwrap_or(false)
        {
            "UNDER"
        } else {
            "OVER"
        };
        println!("✓ Closed {} ({}), opened {}", closed.date, outcome, next);
    }

    println!(
        "  New daily goal: {} kcal",
        ledger.current_day().calorie_goal
    );
    report_flags(ledger.flags());
    Ok(())
}

fn cmd_history(data_dir: PathBuf, config: &Config, days: u64) -> Result<()> {
    let ledger = open_ledger(data_dir, config)?;
    let profile = ledger.profile();
    let today = ledger.current_day().date;
    let from = today - chrono::Days::new(days);

    let records = ledger.store().load_daily_records(from, today)?;
    let closed: Vec<_> = records.iter().filter(|r| r.closed).collect();

    if closed.is_empty() {
        println!("No closed days in the last {} days.", days);
        return Ok(());
    }

    println!("─────────────────────────────────────────");
    for record in closed {
        let day_number = (record.date - profile.start_date).num_days() + 1;
        println!(
            "Day {:>3}  {}  {:>5}/{:<5} kcal  {}  {:.1} {} water",
            day_number,
            record.date,
            record.calorie_intake,
            record.calorie_goal,
            if record.pass_fail { "UNDER" } else { "OVER " },
            record.water_intake,
            record.water_unit.label()
        );
    }
    println!("─────────────────────────────────────────");
    Ok(())
}

fn cmd_export(data_dir: PathBuf, config: &Config, out: Option<PathBuf>) -> Result<()> {
    let ledger = open_ledger(data_dir.clone(), config)?;
    let out = out.unwrap_or_else(|| data_dir.join("history.csv"));

    let count = export_history(
        ledger.store(),
        ledger.profile().start_date,
        ledger.current_day().date,
        &out,
    )?;

    println!("✓ Exported {} closed days", count);
    println!("  CSV: {}", out.display());
    Ok(())
}

fn report_flags(flags: &[DataQuality]) {
    for flag in flags {
        match flag {
            DataQuality::GoalClamped => {
                eprintln!("⚠ Goal was clamped to the safety floor; check your goal settings.");
            }
            DataQuality::MissingBodyData => {
                eprintln!("⚠ Weight or height is missing; update your profile for accurate goals.");
            }
        }
    }
}
