// Line protocol between an external speech-to-text process and the scorer.
//
//   PHASE <name>            start (or restart) a phase
//   END                     end the live phase
//   INTERIM <text>          partial transcript, never scored
//   FINAL <text>            final transcript, scored against the live phase
//   CLOCK <0-5> <reasoning> clock drawing result
//   SUMMARY                 per-phase scores
//   EXIT
//
// Replies are single lines: `OK ...`, `UPDATE <json>`, `SUMMARY <json>` or `ERROR <message>`.
use screen_core::persistence::load_effective_config;
use screen_core::{ClockScore, Phase, ScoringEngine, ScreeningSession, TranscriptEvent};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> screen_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    info!("Transcript bridge starting");

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

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let input = line?;
        debug!(line = %input, "Received");
        let (command, rest) = input.split_once(' ').unwrap_or((input.as_str(), ""));

        let reply = match command {
            "PHASE" => match Phase::from_name(rest) {
                Some(phase) => {
                    session.begin_phase(phase);
                    Some(format!("OK PHASE {phase}"))
                }
                None => Some(format!("ERROR unknown phase '{rest}'")),
            },
            "END" => Some(match session.end_phase() {
                Some(phase) => format!("OK END {phase}"),
                None => "ERROR no active phase".to_string(),
            }),
            "INTERIM" => {
                session.handle_transcript(&engine, &TranscriptEvent::interim(rest))?;
                None
            }
            "FINAL" => Some(match session.handle_transcript(&engine, &TranscriptEvent::final_text(rest)) {
                Ok(Some(update)) => format!("UPDATE {}", serde_json::to_string(&update)?),
                Ok(None) => "OK".to_string(),
                Err(e) => format!("ERROR {e}"),
            }),
            "CLOCK" => {
                let (score, reasoning) = rest.split_once(' ').unwrap_or((rest, ""));
                let recorded = score
                    .parse::<u8>()
                    .map_err(|_| screen_core::Error::Config(format!("bad clock score '{score}'")))
                    .and_then(|score| ClockScore::new(score, reasoning))
                    .and_then(|clock| session.record_clock(clock));
                Some(match recorded {
                    Ok(()) => format!("OK CLOCK {score}"),
                    Err(e) => format!("ERROR {e}"),
                })
            }
            "SUMMARY" => Some(format!("SUMMARY {}", serde_json::to_string(&session.summary())?)),
            "EXIT" => {
                info!("Received EXIT");
                break;
            }
            other => {
                warn!(command = other, "Unknown command");
                Some(format!("ERROR unknown command '{other}'"))
            }
        };

        if let Some(reply) = reply {
            writeln!(stdout, "{}", reply)?;
            stdout.flush()?;
        }
    }

    info!("Transcript bridge shutting down");
    Ok(())
}
