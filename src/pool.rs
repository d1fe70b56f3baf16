use std::io::Write as _;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel;
use indicatif::{ProgressBar, ProgressStyle};

use crate::context::{Context, Settings};
use crate::errors::{ColdError, IoContextError};
use crate::instruction::Instruction;
use crate::{combiner, emitter, search};

/// A message a worker sends back to the driver. No field here is written by
/// more than one thread, so the channel alone supplies the happens-before
/// edge the spec calls for — no lock needed (SPEC_FULL.md §5/§4.6).
enum WorkerEvent {
    Progress,
    Solution { combination_index: u64, instructions: Vec<Instruction> },
    Done { completed: u64, solved: bool },
}

#[derive(Debug, Default)]
pub struct SolveSummary {
    pub total_completed: u64,
    pub solved: bool,
}

/// Drive the whole search: spawn `settings.threads` OS-thread workers, each
/// pulling combinations off a shared atomic cursor, and aggregate their
/// progress/solutions on the calling thread. Cancellation is cooperative —
/// once a solution is found and `find_all` is false, no new combination is
/// handed out, but in-flight workers finish the one they're on.
pub fn solve(ctx: Context, settings: Settings) -> Result<SolveSummary, ColdError> {
    std::fs::create_dir_all(&settings.output_dir)
        .map_err(|e| IoContextError::new(settings.output_dir.display().to_string(), e))?;

    let total = ctx.combination_count();
    let start = settings.combination_start.min(total);
    let count = settings.combination_count.unwrap_or(total.saturating_sub(start));
    let end = start.saturating_add(count).min(total);

    let ctx = Arc::new(ctx);
    let settings = Arc::new(settings);
    let next_index = Arc::new(AtomicU64::new(start));
    let stop = Arc::new(AtomicBool::new(false));

    let (tx, rx) = channel::unbounded::<WorkerEvent>();

    let mut handles = Vec::with_capacity(settings.threads);
    for _ in 0..settings.threads {
        let ctx = Arc::clone(&ctx);
        let next_index = Arc::clone(&next_index);
        let stop = Arc::clone(&stop);
        let settings = Arc::clone(&settings);
        let tx = tx.clone();
        let handle = std::thread::Builder::new()
            .name("cold-worker".into())
            .spawn(move || worker_loop(&ctx, &settings, &next_index, end, &stop, &tx))
            .map_err(ColdError::ThreadSpawn)?;
        handles.push(handle);
    }
    drop(tx);

    let progress = build_progress_bar(settings.interactive);
    let program_start = Instant::now();
    let mut total_completed = 0u64;
    let mut solved = false;
    let mut last_print = Instant::now();

    for event in rx.iter() {
        match event {
            WorkerEvent::Progress => {
                total_completed += 1;
                if last_print.elapsed() >= Duration::from_secs(1) {
                    report_progress(&progress, settings.interactive, total_completed, program_start.elapsed().as_secs_f64());
                    last_print = Instant::now();
                }
            }
            WorkerEvent::Solution { combination_index, instructions } => {
                write_solution(&settings, &ctx, combination_index, &instructions)?;
                if settings.print_solutions {
                    let text = emitter::emit_program(&ctx.input_names, &instructions);
                    println!("{}", emitter::colorize(&text));
                }
                solved = true;
                if !settings.find_all {
                    stop.store(true, Ordering::SeqCst);
                }
            }
            WorkerEvent::Done { .. } => {}
        }
    }

    for handle in handles {
        let _ = handle.join();
    }

    report_progress(&progress, settings.interactive, total_completed, program_start.elapsed().as_secs_f64());
    progress.finish_and_clear();

    Ok(SolveSummary { total_completed, solved })
}

fn worker_loop(
    ctx: &Context,
    settings: &Settings,
    next_index: &AtomicU64,
    end: u64,
    stop: &AtomicBool,
    tx: &channel::Sender<WorkerEvent>,
) {
    loop {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        let index = next_index.fetch_add(1, Ordering::SeqCst);
        if index >= end {
            return;
        }

        let combination = combiner::combine(ctx, index);
        let root = combiner::load_combination(&ctx.input_names, &ctx.cases[0].inputs, &combination);

        let mut local_solved = false;
        let completed = search::search(
            ctx,
            root,
            settings.find_all,
            |_| {
                let _ = tx.send(WorkerEvent::Progress);
            },
            |solution| {
                local_solved = true;
                let _ = tx.send(WorkerEvent::Solution {
                    combination_index: index,
                    instructions: solution.to_vec(),
                });
            },
        );

        let _ = tx.send(WorkerEvent::Done { completed, solved: local_solved });
    }
}

fn write_solution(
    settings: &Settings,
    ctx: &Context,
    combination_index: u64,
    instructions: &[Instruction],
) -> Result<(), ColdError> {
    let dir = settings.output_dir.join(combination_index.to_string());
    std::fs::create_dir_all(&dir).map_err(|e| IoContextError::new(dir.display().to_string(), e))?;

    let path = dir.join("solution.cold");
    let already_exists = path.exists();

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| IoContextError::new(path.display().to_string(), e))?;

    if already_exists {
        file.write_all(b"---\n").map_err(|e| IoContextError::new(path.display().to_string(), e))?;
    }
    let text = emitter::emit_program(&ctx.input_names, instructions);
    file.write_all(text.as_bytes())
        .map_err(|e| IoContextError::new(path.display().to_string(), e))
        .map_err(ColdError::from)
}

fn build_progress_bar(interactive: bool) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if interactive {
        bar.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
        bar.enable_steady_tick(Duration::from_millis(120));
    } else {
        bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    bar
}

fn report_progress(bar: &ProgressBar, interactive: bool, completed: u64, elapsed_secs: f64) {
    let rate = if elapsed_secs > 0.0 { completed as f64 / elapsed_secs } else { 0.0 };
    let message = format!("total: {completed}, running {rate:.0}/sec");
    if interactive {
        bar.set_message(message);
    } else {
        println!("{message}");
    }
}
