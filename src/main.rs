use std::io::BufRead;
use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt, stream};
use tokio::sync::broadcast::error::RecvError;

use lead_widget::ConversationController;
use lead_widget::config::WidgetConfig;
use lead_widget::conversation::{ConversationView, Message, Origin, WidgetEvent};
use lead_widget::navigate::Navigator;
use lead_widget::recording::{FileAudioSource, format_elapsed};

/// WAV file captured by `/record` … `/stop`.
const VOICE_FILE_ENV: &str = "LEAD_WIDGET_VOICE_FILE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = WidgetConfig::from_env()?;
    let voice_path =
        std::env::var(VOICE_FILE_ENV).unwrap_or_else(|_| "./recording.wav".to_string());

    let audio = Arc::new(FileAudioSource::new(voice_path));
    let voice_file = audio.path().display().to_string();
    let navigator: Arc<dyn Navigator> =
        Arc::new(|url: &str| println!("\n🌐 Navigating to {url}\n"));
    let controller = ConversationController::over_http(&config, audio, navigator)?;
    let appearance = controller.appearance();

    eprintln!("💬 Lead Widget v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_base_url);
    eprintln!("   Voice file: {voice_file}");
    eprintln!(
        "   Theme: {} on {}, {}",
        appearance.accent_color, appearance.secondary_color, appearance.position
    );
    eprintln!("   /pick <n|label>  /record  /stop  /open  /quit\n");

    controller.toggle_open().await;
    let mut events = controller.subscribe();
    let mut lines = stdin_lines();
    let mut printed = render_new(&controller, 0).await;
    eprint!("> ");

    loop {
        tokio::select! {
            line = lines.next() => {
                let Some(line) = line else { break };
                if !handle_line(&controller, &line).await {
                    break;
                }
            }
            event = events.recv() => match event {
                Ok(WidgetEvent::TranscriptChanged) => {}
                Ok(WidgetEvent::InputChanged(text)) if !text.is_empty() => {
                    eprintln!("🎙  {text}");
                    continue;
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
        printed = render_new(&controller, printed).await;
        eprint!("> ");
    }

    controller.dispose().await;
    Ok(())
}

/// Lines from stdin. Read on a plain thread so a blocked read never holds up
/// runtime shutdown.
fn stdin_lines() -> Pin<Box<dyn Stream<Item = String> + Send>> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    }))
}

/// Handle one line of input. Returns `false` to quit.
async fn handle_line(controller: &ConversationController, line: &str) -> bool {
    let line = line.trim();
    let open = controller.is_open().await;
    match line {
        "" => {}
        "/quit" | "/exit" => return false,
        "/open" => {
            let open = controller.toggle_open().await;
            eprintln!("{}", if open { "Panel opened" } else { "Panel closed" });
        }
        _ if !open => {
            eprintln!("Panel is closed. /open to show it.");
        }
        "/record" => {
            if controller.start_recording().await {
                eprintln!("🔴 Recording… /stop to send");
            } else if controller.is_recording().await {
                eprintln!("Already recording");
            } else if !controller.snapshot().await.accepts_input() {
                eprintln!("⏳ Still waiting on the last reply");
            }
        }
        "/stop" => {
            if let Some(elapsed) = controller.recording_elapsed().await {
                eprintln!("⏹  {}", format_elapsed(elapsed));
            }
            if !controller.stop_recording().await {
                eprintln!("Not recording");
            }
        }
        cmd if cmd.starts_with("/pick") => {
            let arg = cmd.trim_start_matches("/pick").trim();
            let view = controller.snapshot().await;
            match resolve_option(&view, arg) {
                Some(label) => {
                    if !controller.select_option(&label).await {
                        eprintln!("⏳ Still waiting on the last reply");
                    }
                }
                None => eprintln!("No option matching '{arg}'"),
            }
        }
        text => {
            if !controller.submit_free_text(text).await {
                if controller.is_recording().await {
                    eprintln!("🔴 Recording in progress. /stop first");
                } else {
                    eprintln!("⏳ Still waiting on the last reply");
                }
            }
        }
    }
    true
}

/// Find the option `arg` names, by 1-based index or label, among those the
/// most recent option-bearing bot message offers.
fn resolve_option(view: &ConversationView, arg: &str) -> Option<String> {
    let options = &view
        .messages
        .iter()
        .rev()
        .find(|m| m.is_bot() && !m.options.is_empty())?
        .options;

    if let Ok(n) = arg.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).cloned();
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(arg))
        .cloned()
}

/// Print settled bot messages not shown yet. Returns the new settled count.
async fn render_new(controller: &ConversationController, printed: usize) -> usize {
    let view = controller.snapshot().await;
    let settled: Vec<&Message> = view.messages.iter().filter(|m| !m.pending).collect();
    for message in settled.iter().skip(printed) {
        if message.origin == Origin::Bot {
            print_bot(message);
        }
    }
    settled.len()
}

fn print_bot(message: &Message) {
    println!("\n🤖 {}", message.body);
    for (i, option) in message.options.iter().enumerate() {
        println!("   [{}] {}", i + 1, option);
    }
    if let Some(leads) = &message.lead_result {
        for line in leads.to_clipboard_text().lines() {
            println!("   {line}");
        }
    }
}
