//! Interactive driver for the mail relay simulation.
//!
//! Owns the menu loop, console formatting, and tick pacing; the routing
//! core is consumed only through the public `MailSystem` and policy API.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::Context;

use mail_relay::config::{DispatchPolicy, SimulationConfig};
use mail_relay::core::routing::{advance_global, advance_local};
use mail_relay::core::{AppResult, FileJournal, LetterCategory, MailSystem};
use mail_relay::infra::{write_json_report, write_text_report};
use mail_relay::util::init_tracing;

fn print_menu(auto_dispatch: bool) {
    println!("1. Add a post office");
    println!("2. Remove post office");
    println!("3. Add a letter");
    println!("4. Export all letters");
    println!("5. Show office connections");
    println!("6. System status");
    println!("7. {} delivery", if auto_dispatch { "Stop" } else { "Start" });
    println!("8. Exit");
    print!("Select an option: ");
    let _ = io::stdout().flush();
}

fn read_line(input: &mut impl BufRead, prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_owned())
}

fn read_number<T: std::str::FromStr>(input: &mut impl BufRead, prompt: &str) -> io::Result<Option<T>> {
    Ok(read_line(input, prompt)?.parse().ok())
}

fn add_office_dialog(system: &mut MailSystem, input: &mut impl BufRead) -> io::Result<()> {
    let Some(id) = read_number(input, "Enter office ID: ")? else {
        println!("Invalid input. Please enter a number.");
        return Ok(());
    };
    let Some(capacity) = read_number(input, "Enter capacity: ")? else {
        println!("Invalid input. Please enter a number.");
        return Ok(());
    };
    match system.add_office(id, capacity, &[]) {
        Ok(_) => println!("The office was added successfully."),
        Err(e) => println!("Error adding office: {e}"),
    }
    Ok(())
}

fn add_letter_dialog(system: &mut MailSystem, input: &mut impl BufRead) -> io::Result<()> {
    let category = match read_number::<u8>(input, "Enter the letter type (0-Ordinary, 1-Urgent): ")? {
        Some(0) => LetterCategory::Ordinary,
        Some(1) => LetterCategory::Urgent,
        _ => {
            println!("Invalid letter type.");
            return Ok(());
        }
    };
    let (Some(priority), Some(from), Some(to)) = (
        read_number(input, "Enter priority: ")?,
        read_number(input, "Enter the sender's office ID: ")?,
        read_number(input, "Enter the recipient's office ID: ")?,
    ) else {
        println!("Invalid input. Please enter a number.");
        return Ok(());
    };
    let payload = read_line(input, "Enter payload: ")?;
    match system.add_letter(category, priority, from, to, &payload) {
        Ok(id) => println!("The letter was added successfully (id {id})."),
        Err(e) => println!("Error adding letter: {e}"),
    }
    Ok(())
}

fn export_dialog(system: &MailSystem, input: &mut impl BufRead) -> io::Result<()> {
    let filename = read_line(input, "Enter the output file name: ")?;
    if filename.is_empty() {
        println!("No file name given.");
        return Ok(());
    }
    let result = if filename.ends_with(".json") {
        write_json_report(system, &filename)
    } else {
        write_text_report(system, &filename)
    };
    match result {
        Ok(()) => println!("The list of letters has been saved."),
        Err(e) => println!("Error saving letter list: {e:#}"),
    }
    Ok(())
}

fn show_connections(system: &MailSystem, input: &mut impl BufRead) -> io::Result<()> {
    let Some(id) = read_number(input, "Enter office ID: ")? else {
        println!("Invalid input. Please enter a number.");
        return Ok(());
    };
    match system.find_office(id) {
        Some(office) => {
            if office.neighbors().is_empty() {
                println!("Office {id} has no connections.");
            } else {
                let list: Vec<String> = office.neighbors().iter().map(ToString::to_string).collect();
                println!("Office {id} is connected to: {}", list.join(", "));
            }
        }
        None => println!("Office {id} not found."),
    }
    Ok(())
}

fn show_status(system: &MailSystem, auto_dispatch: bool) {
    let status = system.status();
    println!(
        "Letters: {} total, {} in transit, {} delivered, {} undeliverable",
        status.letters_total, status.in_transit, status.delivered, status.undeliverable
    );
    println!("Auto delivery: {}", if auto_dispatch { "on" } else { "off" });
    for office in &status.offices {
        println!(
            "Office {}: {}/{} letters, neighbors: {:?}",
            office.id, office.occupancy, office.capacity, office.neighbors
        );
    }
}

fn run_tick(system: &mut MailSystem, policy: DispatchPolicy) {
    let result = match policy {
        DispatchPolicy::Local => advance_local(system).map(|moves| moves > 0),
        DispatchPolicy::Global => advance_global(system),
    };
    if let Err(e) = result {
        println!("Dispatch error: {e}");
    }
}

fn main() -> AppResult<()> {
    init_tracing();
    let mut config = SimulationConfig::from_env();
    if let Some(path) = std::env::args().nth(1) {
        config.journal_path = Some(path.into());
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let mut system = MailSystem::new();
    if let Some(path) = &config.journal_path {
        let journal = FileJournal::open(path)
            .with_context(|| format!("opening journal {}", path.display()))?;
        system = system.with_journal(Box::new(journal));
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut auto_dispatch = false;

    loop {
        if auto_dispatch {
            run_tick(&mut system, config.policy);
            thread::sleep(Duration::from_millis(config.tick_interval_ms));
        }

        print_menu(auto_dispatch);
        let choice = read_line(&mut input, "")?;
        match choice.as_str() {
            "1" => add_office_dialog(&mut system, &mut input)?,
            "2" => {
                let Some(id) = read_number(&mut input, "Enter the office ID to delete: ")? else {
                    println!("Invalid input. Please enter a number.");
                    continue;
                };
                match system.remove_office(id) {
                    Ok(()) => println!("The office was removed successfully."),
                    Err(e) => println!("Error removing office: {e}"),
                }
            }
            "3" => add_letter_dialog(&mut system, &mut input)?,
            "4" => export_dialog(&system, &mut input)?,
            "5" => show_connections(&system, &mut input)?,
            "6" => show_status(&system, auto_dispatch),
            "7" => {
                auto_dispatch = !auto_dispatch;
                println!("delivery {}", if auto_dispatch { "on" } else { "off" });
            }
            "8" => {
                println!("Exit");
                break;
            }
            "" => break, // EOF
            _ => println!("Invalid option. Please try again."),
        }
    }
    Ok(())
}
