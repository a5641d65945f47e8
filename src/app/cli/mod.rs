//! CLI Adapter.

use std::io::ErrorKind;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Error as DialoguerError, Input};

use crate::app::api::{self, AcceptPrompter};
use crate::domain::{AppError, CollaborationRequest, Contract, WorkflowEvent};

#[derive(Parser)]
#[command(name = "collabflow")]
#[command(version)]
#[command(about = "Review and answer merchant/influencer collaboration requests", long_about = None)]
struct Cli {
    /// Path to collabflow.toml (overrides COLLABFLOW_CONFIG)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a collaboration request and the responses available for it
    Show {
        /// Collaboration request id
        id: String,
    },
    /// List collaboration requests
    #[clap(visible_alias = "ls")]
    List {
        /// Only show requests in this status (e.g. pending)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Print the current contract terms
    Terms,
    /// Propose a different commission
    Counter {
        /// Collaboration request id
        id: String,
        /// Counter commission in percent (5-50)
        #[arg(long)]
        commission: f64,
        /// Justification for the counter-offer
        #[arg(short, long)]
        message: String,
    },
    /// Reject a request
    Reject {
        /// Collaboration request id
        id: String,
        /// Reason shown to the other party
        #[arg(short, long)]
        reason: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Accept a request by signing the collaboration contract
    Accept {
        /// Collaboration request id
        id: String,
        /// Acknowledge every contract clause without prompting
        #[arg(long)]
        acknowledge: bool,
        /// Name to sign with
        #[arg(long)]
        signature: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result: Result<(), AppError> = match cli.command {
        Commands::Show { id } => run_show(config, &id),
        Commands::List { status } => run_list(config, status.as_deref()),
        Commands::Terms => api::terms(config).map(|contract| print_contract(&contract)),
        Commands::Counter { id, commission, message } => {
            api::counter_offer(config, &id, commission, &message).map(|event| print_event(&event))
        }
        Commands::Reject { id, reason, yes } => run_reject(config, &id, &reason, yes),
        Commands::Accept { id, acknowledge, signature, yes } => {
            let mut prompter = CliAcceptPrompter { yes, acknowledge, signature };
            api::accept(config, &id, &mut prompter).map(|event| print_event(&event))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_show(config: Option<&std::path::Path>, id: &str) -> Result<(), AppError> {
    let outcome = api::show(config, id)?;
    print!("{}", outcome.rendered);
    if outcome.actions.is_empty() {
        println!("No responses available ({}).", outcome.request.status);
    } else {
        let labels: Vec<&str> = outcome.actions.iter().map(|action| action.label()).collect();
        println!("Available: {}", labels.join(", "));
    }
    Ok(())
}

fn run_list(config: Option<&std::path::Path>, status: Option<&str>) -> Result<(), AppError> {
    let outcome = api::list(config, status)?;
    if outcome.requests.is_empty() {
        println!("No collaboration requests found");
    }
    for request in &outcome.requests {
        println!(
            "{}  {:<13} {:>5}%  {} -> {}",
            request.id,
            request.status.as_str(),
            request.proposed_commission,
            request.merchant.label(),
            request.influencer.label()
        );
    }
    for id in &outcome.incomplete {
        eprintln!("⚠️  Skipped incomplete request {}", id);
    }
    Ok(())
}

fn run_reject(
    config: Option<&std::path::Path>,
    id: &str,
    reason: &str,
    yes: bool,
) -> Result<(), AppError> {
    if !yes && !confirm(&format!("Reject collaboration {}?", id))? {
        println!("{}: cancelled", id);
        return Ok(());
    }
    api::reject(config, id, reason).map(|event| print_event(&event))
}

fn print_event(event: &WorkflowEvent) {
    println!("{}: {}", event.request_id, event.outcome);
}

fn print_contract(contract: &Contract) {
    println!("Contract {}", contract.version);
    for (index, clause) in contract.terms.iter().enumerate() {
        println!();
        println!("{}. {}", index + 1, clause.title);
        println!("   {}", clause.body);
    }
}

struct CliAcceptPrompter {
    yes: bool,
    acknowledge: bool,
    signature: Option<String>,
}

impl AcceptPrompter for CliAcceptPrompter {
    fn confirm_accept(&mut self, request: &CollaborationRequest) -> Result<bool, AppError> {
        if self.yes {
            return Ok(true);
        }
        confirm(&format!(
            "Accept collaboration {} at {}% commission?",
            request.id, request.proposed_commission
        ))
    }

    fn acknowledge(&mut self, contract: &Contract) -> Result<bool, AppError> {
        print_contract(contract);
        println!();
        if self.acknowledge {
            return Ok(true);
        }
        confirm("I have read and agree to all of the terms above")
    }

    fn signature(&mut self) -> Result<Option<String>, AppError> {
        if let Some(name) = self.signature.take() {
            return Ok(Some(name));
        }
        match Input::<String>::new().with_prompt("Type your full name to sign").interact_text() {
            Ok(value) => Ok(Some(value)),
            Err(DialoguerError::IO(err)) if err.kind() == ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(AppError::Prompt(format!("Failed to read signature: {}", err))),
        }
    }
}

fn confirm(prompt: &str) -> Result<bool, AppError> {
    let answer = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact_opt()
        .map_err(|err| AppError::Prompt(err.to_string()))?;
    Ok(answer.unwrap_or(false))
}
