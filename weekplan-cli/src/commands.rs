use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use weekplan::{
    backup_file_name, parse_duration, Backup, Category, Day, DayLoad, DropOutcome, DropTarget,
    EditOutcome, Planner, Todo,
};

use crate::cli::Commands;
use crate::config::PlannerConfig;

const LOAD_BAR_WIDTH: usize = 10;

/// Print the config path, writing a default file first if there is none.
pub fn config_path() -> Result<()> {
    let path = PlannerConfig::config_path()?;
    if !path.exists() {
        PlannerConfig::default().save()?;
        println!("Created default config at {}", path.display());
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

pub fn run(planner: &mut Planner, command: Commands, config: &PlannerConfig) -> Result<()> {
    match command {
        Commands::Week => print!("{}", render_week(planner)),
        Commands::Pool => print!("{}", render_pool(planner)),
        Commands::Add {
            text,
            duration,
            habit,
        } => {
            let duration = duration_or_default(duration.as_deref(), config);
            let Some(id) = planner.add_to_pool(&text, duration, habit) else {
                bail!("Task text cannot be empty");
            };
            println!("Added #{id} to the pool");
        }
        Commands::QuickAdd {
            day,
            category,
            text,
            duration,
        } => {
            let duration = duration_or_default(duration.as_deref(), config);
            match planner.add_to_day(day, category, &text, duration) {
                Some(id) => println!("Added #{id} to {day} {category}"),
                None if text.trim().is_empty() => bail!("Task text cannot be empty"),
                None => bail!("{day} already has a goal"),
            }
        }
        Commands::Schedule { id, day, category } => {
            if !planner.begin_drag_from_pool(id) {
                bail!("No pool task with id {id}");
            }
            drop_on(planner, day, category)?;
        }
        Commands::Move {
            from_day,
            from_category,
            id,
            day,
            category,
        } => {
            if !planner.begin_drag_from_week(from_day, from_category, id) {
                bail!("No task #{id} in {from_day} {from_category}");
            }
            drop_on(planner, day, category)?;
        }
        Commands::Unschedule { day, category, id } => {
            if !planner.begin_drag_from_week(day, category, id) {
                bail!("No task #{id} in {day} {category}");
            }
            planner.hover(DropTarget::Pool);
            println!("{}", describe(planner.drop_on_pool()));
        }
        Commands::Toggle { day, category, id } => {
            match planner.toggle_completed(day, category, id) {
                Some(true) => println!("Completed #{id}"),
                Some(false) => println!("Reopened #{id}"),
                None => bail!("No task #{id} in {day} {category}"),
            }
        }
        Commands::Edit { id, text, duration } => {
            if !planner.begin_edit_by_id(id) {
                bail!("No task with id {id} in this week or the pool");
            }
            if let Some(draft) = planner.edit_draft_mut() {
                if let Some(text) = text {
                    draft.text = text;
                }
                if let Some(duration) = duration {
                    draft.duration_input = duration;
                }
            }
            match planner.commit_edit() {
                EditOutcome::UpdatedInWeek | EditOutcome::UpdatedInPool => {
                    println!("Updated #{id}")
                }
                EditOutcome::NoDraft | EditOutcome::NotFound => {
                    bail!("Task #{id} disappeared before the edit was saved")
                }
            }
        }
        Commands::Export { out } => {
            let path = out.unwrap_or_else(|| PathBuf::from(backup_file_name(planner.today())));
            let json = planner.snapshot().to_json()?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write backup to {}", path.display()))?;
            println!("Exported backup to {}", path.display());
        }
        Commands::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read backup at {}", file.display()))?;
            let backup = Backup::parse(&raw)
                .with_context(|| format!("Import failed for {}", file.display()))?;
            planner.import_backup(backup);
            println!("Import successful!");
        }
        Commands::ConfigPath => config_path()?,
    }
    Ok(())
}

fn duration_or_default(input: Option<&str>, config: &PlannerConfig) -> u32 {
    match input {
        Some(input) => parse_duration(input, config.default_duration_minutes),
        None => config.default_duration_minutes,
    }
}

fn drop_on(planner: &mut Planner, day: Day, category: Category) -> Result<()> {
    planner.hover(DropTarget::Day { day, category });
    match planner.drop_on_grid(day, category) {
        DropOutcome::GoalOccupied => bail!("{day} already has a goal"),
        outcome => println!("{}", describe(outcome)),
    }
    Ok(())
}

fn describe(outcome: DropOutcome) -> String {
    match outcome {
        DropOutcome::NoDragSource => "Nothing to drop".to_string(),
        DropOutcome::GoalOccupied => "Goal slot already taken".to_string(),
        DropOutcome::Ignored => "Nothing changed".to_string(),
        DropOutcome::HabitInstantiated {
            template_id,
            instance_id,
        } => format!("Scheduled habit #{template_id} as #{instance_id}"),
        DropOutcome::Moved { id } => format!("Moved #{id}"),
        DropOutcome::ReturnedToPool { id } => format!("Returned #{id} to the pool"),
        DropOutcome::InstanceDiscarded { id } => format!("Removed habit instance #{id}"),
    }
}

pub fn render_week(planner: &Planner) -> String {
    let info = planner.active_week_info();
    let week = planner.active_week();
    let mut out = String::new();
    let _ = writeln!(out, "Week {} ({})", info.key, info.range_label());

    for (load, date) in planner.daily_load().into_iter().zip(info.dates()) {
        let _ = writeln!(
            out,
            "\n{} {:02}.{:02}  {}",
            load.day,
            date.day(),
            u8::from(date.month()),
            render_load(&load)
        );
        for (category, todos) in week.day(load.day).slots() {
            for todo in todos {
                let _ = writeln!(out, "  {:<8} {}", category.to_string(), render_todo(todo));
            }
        }
    }
    out
}

fn render_load(load: &DayLoad) -> String {
    let filled = ((load.percentage / 100.0) * LOAD_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(LOAD_BAR_WIDTH);
    format!(
        "[{}{}] {:>3.0}% {} ({} min)",
        "#".repeat(filled),
        "-".repeat(LOAD_BAR_WIDTH - filled),
        load.percentage,
        load.tier,
        load.total_minutes
    )
}

fn render_todo(todo: &Todo) -> String {
    let check = if todo.completed { "x" } else { " " };
    let mut line = format!("#{:<4} [{check}] {} ({}m)", todo.id, todo.text, todo.duration);
    if todo.urgent {
        line.push_str(" !");
    }
    if todo.is_instance() {
        line.push_str(" (habit)");
    }
    line
}

pub fn render_pool(planner: &Planner) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Backlog");
    let backlog = planner.backlog();
    if backlog.is_empty() {
        let _ = writeln!(out, "  (empty)");
    }
    for todo in backlog {
        let _ = writeln!(out, "  {}", render_todo(todo));
    }

    let _ = writeln!(out, "\nBasics templates for {}", planner.active_key());
    for todo in planner.basics_templates() {
        let _ = writeln!(out, "  {}", render_todo(todo));
    }
    out
}
