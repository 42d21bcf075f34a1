//! netting-ledger CLI
//!
//! Replay payment streams through the debt ledger from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Replay payments from a JSON file and print the balance report
//! netting-ledger settle --input payments.json
//!
//! # Output as JSON
//! netting-ledger settle --input payments.json --format json
//!
//! # Generate a random payment stream for testing
//! netting-ledger generate --participants 10 --payments 30
//! ```

use netting_ledger::ledger::{Balance, DebtLedger};
use netting_ledger::simulation::stress_test::{generate_payment_stream, StreamConfig};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"netting-ledger — incremental debt netting over a minimal balance graph

USAGE:
    netting-ledger <COMMAND> [OPTIONS]

COMMANDS:
    settle      Replay a payment stream and report the netted balances
    generate    Generate a random payment stream (for testing)
    help        Show this message

OPTIONS (settle):
    --input <FILE>      Path to JSON payments file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --participants <N>  Number of participants (default: 10)
    --payments <N>      Number of payments (default: 30)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    netting-ledger settle --input payments.json
    netting-ledger settle --input payments.json --format json
    netting-ledger generate --participants 5 --payments 20 --output test.json"#
    );
}

/// JSON schema for input payments.
#[derive(serde::Deserialize)]
struct PaymentInput {
    from: String,
    to: String,
    amount: i64,
    #[serde(default)]
    description: String,
}

#[derive(serde::Deserialize)]
struct PaymentsFile {
    payments: Vec<PaymentInput>,
}

/// JSON output schema for settle results.
#[derive(serde::Serialize)]
struct SettleOutput {
    payments: usize,
    participants: Vec<ParticipantOutput>,
    open_balances: usize,
    total_outstanding: i64,
}

#[derive(serde::Serialize)]
struct ParticipantOutput {
    name: String,
    balances: Vec<Balance>,
}

fn load_payments(path: &str) -> Vec<PaymentInput> {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: PaymentsFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "payments": [
    {{ "from": "alice", "to": "bob", "amount": 12, "description": "lunch" }}
  ]
}}"#
        );
        process::exit(1);
    });

    file.payments
}

fn cmd_settle(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let payments = load_payments(&path);
    let mut ledger = DebtLedger::new();
    for payment in &payments {
        if let Err(e) = ledger.record_payment(
            &payment.from,
            &payment.to,
            payment.amount,
            payment.description.clone(),
        ) {
            eprintln!(
                "Error applying payment {} -> {} ({}): {}",
                payment.from, payment.to, payment.amount, e
            );
            process::exit(1);
        }
    }

    if format == "json" {
        let participants = ledger
            .participants()
            .iter()
            .map(|p| ParticipantOutput {
                name: p.to_string(),
                balances: ledger.balances_of(p.as_str()),
            })
            .collect();

        let output = SettleOutput {
            payments: ledger.payment_count(),
            participants,
            open_balances: ledger.edge_count(),
            total_outstanding: ledger.total_outstanding(),
        };

        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("Payments replayed: {}", ledger.payment_count());
        println!("{}", ledger);
    }
}

fn cmd_generate(args: &[String]) {
    let mut participants = 10usize;
    let mut payments_count = 30usize;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--participants" => {
                i += 1;
                participants = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--participants requires a number");
                    process::exit(1);
                });
            }
            "--payments" => {
                i += 1;
                payments_count = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--payments requires a number");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = StreamConfig {
        participant_count: participants,
        payments_per_participant: payments_count / participants.max(1),
        ..Default::default()
    };

    let stream = generate_payment_stream(&config);

    #[derive(serde::Serialize)]
    struct OutputPayment {
        from: String,
        to: String,
        amount: i64,
        description: String,
    }

    #[derive(serde::Serialize)]
    struct OutputFile {
        payments: Vec<OutputPayment>,
    }

    let output = OutputFile {
        payments: stream
            .iter()
            .map(|(payer, payee, amount)| OutputPayment {
                from: payer.to_string(),
                to: payee.to_string(),
                amount: *amount,
                description: "generated".to_string(),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} payments across {} participants → {}",
            output.payments.len(),
            participants,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "settle" => cmd_settle(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
