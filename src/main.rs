use anyhow::{Result, anyhow};
use chrono::{DateTime, Local};
use evtrack::actions::{self, Feedback};
use evtrack::keypad::{Key, Keypad};
use evtrack::logging::{get_logger, init_logging};
use evtrack::session::ChargeView;
use evtrack::{Config, FileStore, SessionEngine};
use std::future::Future;
use std::io;
use std::task::Poll;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type Input = Lines<BufReader<Stdin>>;

const GAUGE_WIDTH: usize = 20;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| anyhow!("Failed to load configuration: {}", e))?;
    config.validate()?;
    init_logging(&config.logging)?;

    let logger = get_logger("frontend");
    logger.info(&format!(
        "evtrack {} starting, data in {}",
        env!("CARGO_PKG_VERSION"),
        config.storage.dir
    ));

    let store = FileStore::open(&config.storage.dir)?;
    let mut engine = SessionEngine::open(store, &config)?;
    let keypad = Keypad::new();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    render(&engine.current_view());
    print_help();

    while let Some(line) = input.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        let result = match command {
            "" => continue,
            "start" => actions::start_session(&mut engine),
            "soc" => drive_keypad(&keypad, &mut input, actions::set_soc(&mut engine, &keypad)).await?,
            "kwh" => {
                drive_keypad(&keypad, &mut input, actions::add_energy(&mut engine, &keypad)).await?
            }
            "tap" => {
                drive_keypad(&keypad, &mut input, actions::card_tap(&mut engine, &keypad)).await?
            }
            "end" => actions::end_session(&mut engine),
            "car" => {
                let (model, reg) = rest.split_once('|').unwrap_or((rest, ""));
                actions::edit_car(&mut engine, model, reg)
            }
            "history" => {
                print_history(&engine);
                continue;
            }
            "help" => {
                print_help();
                continue;
            }
            "quit" | "exit" => break,
            other => {
                println!("Unknown command '{other}', type 'help'");
                continue;
            }
        };

        let feedback = actions::settle(result);
        if feedback != Feedback::Cancelled {
            println!(">> {feedback}");
        }
        render(&engine.current_view());
    }

    logger.info("evtrack shutting down");
    Ok(())
}

/// Run a flow to completion, feeding stdin lines to the keypad while it waits.
///
/// The outer error is a stdin failure; the flow's own result is passed through.
async fn drive_keypad<F>(
    keypad: &Keypad,
    input: &mut Input,
    flow: F,
) -> io::Result<evtrack::Result<Feedback>>
where
    F: Future<Output = evtrack::Result<Feedback>>,
{
    tokio::pin!(flow);

    // Poll once so the flow gets to open the keypad before we draw it
    let first = std::future::poll_fn(|cx| Poll::Ready(flow.as_mut().poll(cx))).await;
    if let Poll::Ready(result) = first {
        return Ok(result);
    }
    show_keypad(keypad);

    let mut input_open = true;
    loop {
        tokio::select! {
            biased;
            result = &mut flow => return Ok(result),
            line = input.next_line(), if input_open => {
                match line? {
                    Some(line) => feed_keypad(keypad, &line),
                    None => {
                        input_open = false;
                        keypad.cancel();
                    }
                }
                if keypad.is_open() {
                    show_keypad(keypad);
                }
            }
        }
    }
}

fn feed_keypad(keypad: &Keypad, line: &str) {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "done" | "ok" => {
            keypad.confirm();
        }
        "cancel" | "esc" => {
            keypad.cancel();
        }
        _ => {
            if let Some(key) = Key::from_label(line) {
                keypad.press(key);
                return;
            }
            for key in line.chars().filter_map(Key::from_char) {
                keypad.press(key);
            }
        }
    }
}

fn show_keypad(keypad: &Keypad) {
    let title = keypad.title().unwrap_or_default();
    let display = keypad.display().unwrap_or_default();
    println!("[{title}] {display}");
    if let Some(grid) = keypad.layout() {
        for row in grid.chunks(3) {
            let caps: Vec<String> = row
                .iter()
                .map(|key| key.map_or_else(|| " ".to_string(), |k| k.symbol().to_string()))
                .collect();
            println!("   {}", caps.join("  "));
        }
    }
    println!("   (digits, '.', 'del', 'done', 'cancel')");
}

fn render(view: &ChargeView) {
    let filled = usize::from(view.gauge_percent()) * GAUGE_WIDTH / 100;
    println!();
    println!("{}{}", view.car, if view.is_active() { "  [charging]" } else { "" });
    println!(
        "  {:>4}  [{}{}]",
        view.soc_label(),
        "#".repeat(filled),
        "-".repeat(GAUGE_WIDTH - filled)
    );
    println!("  {}", view.subtitle());
    if let Some(ts) = view.timestamp {
        println!("  {} {}", ts.label(), format_time(ts.millis(), "%H:%M:%S"));
    }
}

fn print_history(engine: &SessionEngine<FileStore>) {
    let history = engine.history();
    if history.is_empty() {
        println!("No history yet.");
        return;
    }
    for entry in history {
        println!("  {entry}  {}", format_time(entry.ts, "%Y-%m-%d %H:%M"));
    }
}

fn format_time(millis: i64, pattern: &str) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.with_timezone(&Local).format(pattern).to_string())
        .unwrap_or_default()
}

fn print_help() {
    println!("Commands:");
    println!("  start              start a charging session");
    println!("  soc                enter the current SOC");
    println!("  kwh                enter total kWh added this session");
    println!("  tap                tap the card (kWh while charging, SOC otherwise)");
    println!("  end                end the session");
    println!("  history            list finished sessions");
    println!("  car <model> | <reg>  edit the vehicle");
    println!("  quit");
}
