use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use screen_core::persistence::load_effective_config;
use screen_core::session::PhaseUpdate;
use screen_core::{
    Classification, ClockScore, Phase, ScoringEngine, ScreeningSession, SpokenToken, TranscriptEvent,
};
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> screen_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // An optional first argument names the vocabulary config.
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_effective_config(config_path.as_deref())?;
    let engine = ScoringEngine::from_config(&config)?;
    info!(
        targets = engine.vocabulary().targets().len(),
        animals = engine.vocabulary().animals().len(),
        "Vocabulary loaded"
    );
    let mut session = ScreeningSession::new();
    let mut last_line = String::from("Start a phase with ':phase naming'.");

    loop {
        print_ui(&session, &last_line)?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim();

        last_line = match cmd {
            "exit" => break,
            "" => continue,
            ":end" => match session.end_phase() {
                Some(phase) => format!("Ended {phase}."),
                None => "No phase is active.".to_string(),
            },
            ":restart" => {
                session.restart();
                "Session cleared.".to_string()
            }
            ":summary" => serde_json::to_string_pretty(&session.summary())?,
            s if s.starts_with(":phase") => {
                let name = s.trim_start_matches(":phase").trim();
                match Phase::from_name(name) {
                    Some(phase) => {
                        session.begin_phase(phase);
                        format!("Started {phase}.")
                    }
                    None => format!("Unknown phase '{name}'."),
                }
            }
            s if s.starts_with(":clock") => {
                let rest = s.trim_start_matches(":clock").trim();
                let (score, reasoning) = rest.split_once(' ').unwrap_or((rest, ""));
                match score.parse::<u8>() {
                    Ok(score) => match ClockScore::new(score, reasoning).and_then(|c| session.record_clock(c)) {
                        Ok(()) => format!("Clock drawing scored {score}."),
                        Err(e) => e.to_string(),
                    },
                    Err(_) => "Usage: :clock <0-5> <reasoning>".to_string(),
                }
            }
            // Interim transcripts are echoed but never scored.
            s if s.starts_with('~') => {
                let event = TranscriptEvent::interim(&s[1..]);
                session.handle_transcript(&engine, &event)?;
                format!("(listening) {}", event.text)
            }
            s => match session.handle_transcript(&engine, &TranscriptEvent::final_text(s)) {
                Ok(Some(update)) => describe(&update),
                Ok(None) => String::new(),
                Err(e) => e.to_string(),
            },
        };
    }

    println!("\nFinal summary:");
    println!("{}", serde_json::to_string_pretty(&session.summary())?);
    Ok(())
}

fn paint(token: &SpokenToken) -> String {
    let text = token.raw_text.clone();
    match token.classification {
        Classification::Target => text.green().to_string(),
        Classification::Repeat => text.yellow().to_string(),
        Classification::Distractor => text.magenta().to_string(),
        Classification::Intrusion => text.red().to_string(),
    }
}

fn describe(update: &PhaseUpdate) -> String {
    let (tokens, score) = match update {
        PhaseUpdate::Recall { result, score, .. } => (&result.tokens, score),
        PhaseUpdate::Recognition { result, score, .. } => (&result.tokens, score),
        PhaseUpdate::Fluency { result, score, .. } => (&result.tokens, score),
    };
    let painted: Vec<String> = tokens.iter().map(paint).collect();
    format!("Heard: {}  (phase score: {})", painted.join(" "), score)
}

fn print_ui(session: &ScreeningSession, last_line: &str) -> std::io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("Brief Screening Battery - scoring console");
    println!("---------------------------------------------------------------");
    println!("Type what the subject said and press [Enter] to score it.");
    println!("'~text' = interim transcript, ':phase <name>', ':end', ':clock <0-5> <why>',");
    println!("':summary', ':restart', 'exit'.\n");

    match session.active_phase() {
        Some(phase) => {
            let found = session.tally(phase).map(|t| t.found.join(", ")).unwrap_or_default();
            println!("Phase: {}", phase.to_string().bold());
            println!("Found: [{}]", found);
        }
        None => println!("Phase: {}", "none".dim()),
    }
    println!("\n{}", last_line);
    print!("\n> ");
    out.flush()
}
