mod clipboard;
mod config;
mod render;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flow_core::{
    drive_for, view, AnalyticsSink, DashboardController, FlowTimings, Pace, PaymentFlow,
    TracingAnalyticsSink,
};
use shared::{
    domain::{PaymentMethod, StudentId, UpiApp},
    format::format_inr,
    sample,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    clipboard::SystemClipboard,
    config::{load_settings, Settings},
    render::{print_events, Output},
};

#[derive(Parser, Debug)]
#[command(name = "ether", about = "Run the school fee-payment flows from a terminal")]
struct Args {
    /// Settings file; defaults to ./ether.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Jump straight to each timer deadline instead of waiting in real time.
    #[arg(long, global = true)]
    instant: bool,
    /// Print UI events as JSON lines.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parent flow: review fees, pick a method and pay.
    Parent {
        #[arg(long, default_value = "upi")]
        method: PaymentMethod,
        #[arg(long, default_value = "gpay")]
        app: UpiApp,
        /// Copy the school's UPI ID to the system clipboard on the way.
        #[arg(long)]
        copy_upi_id: bool,
    },
    /// Admin dashboard: select defaulters and send reminders.
    Admin {
        /// Student IDs to select; every defaulter when omitted.
        #[arg(long = "select")]
        select: Vec<String>,
        /// Also send a single-row reminder to this student.
        #[arg(long)]
        remind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref()).context("failed to load settings")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let pace = if args.instant {
        Pace::Instant
    } else {
        Pace::Realtime
    };
    let output = if args.json { Output::Json } else { Output::Text };
    let analytics: Arc<dyn AnalyticsSink> = Arc::new(TracingAnalyticsSink);

    match args.command {
        Command::Parent {
            method,
            app,
            copy_upi_id,
        } => run_parent(&settings, analytics, pace, output, method, app, copy_upi_id).await,
        Command::Admin { select, remind } => {
            run_admin(&settings, analytics, pace, output, select, remind).await
        }
    }
}

async fn run_parent(
    settings: &Settings,
    analytics: Arc<dyn AnalyticsSink>,
    pace: Pace,
    output: Output,
    method: PaymentMethod,
    app: UpiApp,
    copy_upi_id: bool,
) -> Result<()> {
    let timings = settings.timings.clone();
    let profile = sample::student_profile();
    print_bill(&profile);

    let mut flow = PaymentFlow::new(profile, timings.clone(), analytics)
        .with_clipboard(Box::new(SystemClipboard));
    let renderer = tokio::spawn(print_events(flow.subscribe_events(), output));

    flow.select_method(method);
    flow.advance_step().context("could not leave the review step")?;

    if method != PaymentMethod::Upi {
        info!(method = method.key(), "only the UPI hand-off is simulated");
    } else {
        flow.show_upi_id();
        if copy_upi_id {
            if let Err(err) = flow.copy_upi_id() {
                warn!(error = %err, "continuing without the clipboard");
            }
        }

        flow.initiate_payment(app);
        drive_for(&mut flow, timings.payment_round_trip(), pace).await;
        flow.complete_payment();
        drive_for(&mut flow, settle_time(&timings), pace).await;
    }

    drop(flow);
    renderer.await.context("event renderer crashed")?;
    Ok(())
}

async fn run_admin(
    settings: &Settings,
    analytics: Arc<dyn AnalyticsSink>,
    pace: Pace,
    output: Output,
    select: Vec<String>,
    remind: Option<String>,
) -> Result<()> {
    let timings = settings.timings.clone();
    let mut dashboard = DashboardController::new(sample::defaulters(), timings.clone(), analytics);
    let renderer = tokio::spawn(print_events(dashboard.subscribe_events(), output));

    dashboard.initialize();
    dashboard.start_realtime_updates();
    drive_for(
        &mut dashboard,
        Duration::from_millis(timings.dashboard_load_ms),
        pace,
    )
    .await;

    dashboard.show_defaulters();
    if select.is_empty() {
        dashboard.toggle_select_all(true);
    } else {
        for id in &select {
            dashboard.toggle_student(&StudentId::from(id.as_str()), true);
        }
    }

    if let Some(id) = remind {
        dashboard
            .send_reminder(&StudentId::from(id.as_str()))
            .with_context(|| format!("could not remind student '{id}'"))?;
    }

    dashboard
        .send_bulk_reminders()
        .context("no students selected")?;
    dashboard
        .submit_reminder_form()
        .context("reminder form has no recipients")?;
    drive_for(&mut dashboard, settle_time(&timings), pace).await;

    for entry in dashboard.session().activity().iter() {
        info!(title = %entry.title, description = %entry.description, "activity");
    }

    drop(dashboard);
    renderer.await.context("event renderer crashed")?;
    Ok(())
}

fn print_bill(profile: &shared::protocol::StudentProfile) {
    let header = view::student_header(profile);
    println!("{} {}", header.initials, header.name);
    println!("{}", header.details);
    for row in view::fee_rows(profile) {
        let marker = if row.late { " (late)" } else { "" };
        println!("  {:<14} {:<16} {:>10}{marker}", row.name, row.period, row.amount);
    }
    println!("  Total: {}", format_inr(profile.total_amount));
}

/// Long enough for every pending toast, animation and reminder to play out.
fn settle_time(timings: &FlowTimings) -> Duration {
    let longest = [
        timings.completion_ms,
        timings.success_animation_ms,
        timings
            .reminder_send_ms
            .saturating_add(timings.success_toast_ms),
        timings
            .row_reminder_ms
            .saturating_add(timings.row_reminder_reset_ms),
        timings
            .parent_toast_ms
            .max(timings.admin_toast_ms)
            .saturating_add(timings.toast_fade_out_ms),
    ]
    .into_iter()
    .max()
    .unwrap_or_default();
    Duration::from_millis(longest)
}
