use clap::{Parser, Subcommand};
use pulse_core::{EnvValues, FeedbackRecord, FeedbackService};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Pulse survey feedback CLI")]
struct Cli {
    /// Data directory (overrides PULSE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List survey templates and their questions
    Templates,
    /// List stored feedback
    List,
    /// Submit one survey response
    Submit {
        /// Survey template id
        template: String,
        /// Answers as key=value pairs, e.g. rating=4 recommend=yes "feedback=Great service"
        #[arg(value_parser = parse_answer)]
        answers: Vec<(String, String)>,
    },
    /// Show dashboard aggregates
    Dashboard,
    /// Show current alerts
    Alerts,
}

fn parse_answer(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got {arg:?}")),
    }
}

fn print_record(record: &FeedbackRecord) {
    let sentiment = record
        .text_sentiment
        .map(|p| format!("{:.2}", p.value()))
        .unwrap_or_else(|| "-".into());
    println!(
        "ID: {}, Template: {}, Submitted: {}, Sentiment: {}",
        record.id,
        record.template_id,
        record.submitted_at.to_rfc3339(),
        sentiment
    );
    for line in record.raw_text.lines() {
        println!("    {}", line);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pulse_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use --help to see available commands");
        return Ok(());
    };

    let mut env = EnvValues::from_process_env();
    if let Some(dir) = cli.data_dir {
        env.data_dir = Some(dir.display().to_string());
    }
    let cfg = env.resolve()?;
    let service = FeedbackService::from_config(&cfg)?;

    match command {
        Commands::Templates => {
            for template in service.templates().list() {
                println!("{} ({})", template.id, template.name);
                for q in &template.questions {
                    println!("    {} [{}]: {}", q.key, q.kind.as_str(), q.prompt);
                }
            }
        }
        Commands::List => {
            let records = service.records()?;
            if records.is_empty() {
                println!("No feedback found.");
            } else {
                for record in &records {
                    print_record(record);
                }
            }
        }
        Commands::Submit { template, answers } => {
            let answers: HashMap<String, String> = answers.into_iter().collect();
            match service.submit_survey(&template, &answers).await {
                Ok(record) => {
                    println!("Stored feedback with ID: {}", record.id);
                    if let Some(p) = record.text_sentiment {
                        println!("Text sentiment: {:.2}", p.value());
                    }
                }
                Err(e) => {
                    eprintln!("Error submitting feedback: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Dashboard => {
            let data = service.get_dashboard_data()?;
            let s = data.snapshot;
            println!("Records: {}", s.total_records);
            println!(
                "Ratings:   {} positive, {} neutral, {} negative",
                s.rating.positive, s.rating.neutral, s.rating.negative
            );
            println!(
                "Yes/No:    {} positive, {} negative",
                s.yes_no.positive, s.yes_no.negative
            );
            println!(
                "Sentiment: {} positive, {} neutral, {} negative",
                s.text.positive, s.text.neutral, s.text.negative
            );
            if let Some(forecast) = data.forecast {
                println!("Forecast:  {:.2}", forecast);
            }
        }
        Commands::Alerts => {
            let alerts = service.get_alerts()?;
            if alerts.is_empty() {
                println!("No alerts.");
            } else {
                for alert in alerts {
                    println!("ALERT: {}", alert);
                }
            }
        }
    }

    Ok(())
}
